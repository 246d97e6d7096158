//! De-duplicating working set of discovered markets.

use std::collections::{HashMap, HashSet};

use woltm_core::Market;

/// Markets keyed by id, kept in first-discovery order.
///
/// Re-discovering a known id replaces the stored record (the later
/// observation wins on every field) without moving it. The set also
/// remembers which markets already reached the output sink, so a run that
/// stops early can still emit the rest.
#[derive(Debug, Default)]
pub struct MarketSet {
    markets: Vec<Market>,
    index: HashMap<String, usize>,
    written: HashSet<String>,
}

impl MarketSet {
    /// Inserts or replaces `market`. Returns `true` if the id was new.
    pub fn merge(&mut self, market: Market) -> bool {
        if let Some(&slot) = self.index.get(&market.id) {
            self.markets[slot] = market;
            false
        } else {
            self.index.insert(market.id.clone(), self.markets.len());
            self.markets.push(market);
            true
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Market> {
        self.index.get(id).map(|&slot| &self.markets[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Market> {
        self.markets.iter()
    }

    /// Records that the market with `id` has been handed to the sink.
    pub fn mark_written(&mut self, id: &str) {
        if self.index.contains_key(id) {
            self.written.insert(id.to_owned());
        }
    }

    /// Markets not yet handed to the sink, in first-discovery order.
    pub fn unwritten(&self) -> impl Iterator<Item = &Market> {
        self.markets
            .iter()
            .filter(|market| !self.written.contains(&market.id))
    }
}

impl Extend<Market> for MarketSet {
    fn extend<I: IntoIterator<Item = Market>>(&mut self, iter: I) {
        for market in iter {
            self.merge(market);
        }
    }
}
