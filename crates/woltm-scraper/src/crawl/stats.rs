//! Run statistics for the summary.

use woltm_core::{Item, Market};

use crate::client::Listing;
use crate::error::FailureKind;

/// Failure counts per [`FailureKind`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureCounts {
    pub network: usize,
    pub http: usize,
    pub parse: usize,
    pub missing_field: usize,
}

impl FailureCounts {
    pub fn record(&mut self, kind: FailureKind) {
        self.add(kind, 1);
    }

    pub fn add(&mut self, kind: FailureKind, count: usize) {
        let slot = match kind {
            FailureKind::Network => &mut self.network,
            FailureKind::Http => &mut self.http,
            FailureKind::Parse => &mut self.parse,
            FailureKind::MissingField => &mut self.missing_field,
        };
        *slot += count;
    }

    #[must_use]
    pub fn get(&self, kind: FailureKind) -> usize {
        match kind {
            FailureKind::Network => self.network,
            FailureKind::Http => self.http,
            FailureKind::Parse => self.parse,
            FailureKind::MissingField => self.missing_field,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.network + self.http + self.parse + self.missing_field
    }
}

/// Counters accumulated over one crawl run.
///
/// Created by the caller and threaded through [`super::Crawler::run`] so the
/// counts survive an interrupted run. Only the orchestrator writes to it.
#[derive(Debug, Clone, Default)]
pub struct CrawlStats {
    pub cities_enumerated: usize,
    /// Cities whose market discovery request succeeded.
    pub cities_processed: usize,
    pub cities_failed: usize,
    /// Unique markets after merging by id.
    pub markets_discovered: usize,
    /// Discovery hits for a market id that was already known.
    pub markets_rediscovered: usize,
    /// Markets handed to the output sink.
    pub markets_written: usize,
    /// Markets written with discovery fields only because the run stopped
    /// before their catalog was requested.
    pub markets_unfetched: usize,
    pub venues_fetched: usize,
    pub venues_failed: usize,
    pub items_written: usize,
    /// Items whose id had already been emitted under another venue.
    pub duplicate_items: usize,
    /// Catalog entries dropped for lack of an id.
    pub items_skipped: usize,
    pub unresolved_item_refs: usize,
    pub failures: FailureCounts,

    markets_delivering: usize,
    rated_markets: usize,
    rating_sum: f64,
    discounted_items: usize,
    discount_percentage_sum: f64,
    available_items: usize,
}

impl CrawlStats {
    pub fn record_failure(&mut self, kind: FailureKind) {
        self.failures.record(kind);
    }

    /// Counts the records a listing call skipped for missing identifiers and
    /// the request failure, if any.
    pub fn record_listing<T>(&mut self, listing: &Listing<T>) {
        self.failures.add(FailureKind::MissingField, listing.skipped);
        if let Some(error) = &listing.error {
            self.record_failure(error.kind());
        }
    }

    /// Accounts for a market row handed to the output sink.
    pub fn observe_market(&mut self, market: &Market) {
        self.markets_written += 1;
        if market.delivers {
            self.markets_delivering += 1;
        }
        if let Some(score) = market.rating_score.filter(|_| market.is_rated()) {
            self.rated_markets += 1;
            self.rating_sum += score;
        }
    }

    /// Accounts for an item row handed to the output sink.
    pub fn observe_item(&mut self, item: &Item) {
        self.items_written += 1;
        if item.is_discounted() {
            self.discounted_items += 1;
            self.discount_percentage_sum += item.discount_percentage;
        }
        if item.is_available {
            self.available_items += 1;
        }
    }

    #[must_use]
    pub fn markets_delivering(&self) -> usize {
        self.markets_delivering
    }

    #[must_use]
    pub fn discounted_items(&self) -> usize {
        self.discounted_items
    }

    /// Mean rating over markets that have one.
    #[must_use]
    pub fn average_rating(&self) -> Option<f64> {
        mean(self.rating_sum, self.rated_markets)
    }

    /// Mean discount percentage over discounted items.
    #[must_use]
    pub fn average_discount_percentage(&self) -> Option<f64> {
        mean(self.discount_percentage_sum, self.discounted_items)
    }

    /// Share of written items that are available, as a percentage.
    #[must_use]
    pub fn availability_rate(&self) -> Option<f64> {
        #[allow(clippy::cast_precision_loss)]
        mean(self.available_items as f64 * 100.0, self.items_written)
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(sum: f64, count: usize) -> Option<f64> {
    (count > 0).then(|| sum / count as f64)
}
