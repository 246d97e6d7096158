//! Crawl orchestration: cities → markets → venue catalogs → items.
//!
//! A [`Crawler`] drives one run through the [`CrawlStage`] progression on a
//! single logical flow. Every failure below the sink is recovered at the
//! entity it concerns (one city, one market) and counted in
//! [`CrawlStats`]; only output I/O errors end a run early.
//!
//! The discovered markets live in a caller-owned [`MarketSet`]. If the run
//! future is dropped mid-crawl, [`Crawler::write_unfetched`] emits the
//! markets whose catalog was never requested, so every discovered market
//! still reaches the output.

mod market_set;
mod sink;
mod state;
mod stats;

use std::collections::HashSet;

use chrono::Utc;
use thiserror::Error;
use woltm_core::{City, Item, Market};

use crate::client::WoltClient;
use crate::error::FailureKind;
use crate::extract::extract_items;
use crate::normalize::apply_venue_info;

pub use market_set::MarketSet;
pub use sink::{CrawlSink, MemorySink};
pub use state::{CrawlStage, MarketState};
pub use stats::{CrawlStats, FailureCounts};

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("failed to write crawl output: {0}")]
    Sink(#[from] std::io::Error),
}

/// Restrictions on which cities a run covers.
#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    /// Cities to crawl instead of enumerating them from the platform.
    pub seed_cities: Option<Vec<City>>,
    /// Only crawl cities whose slug matches (case-insensitive).
    pub city_filter: Option<String>,
}

pub struct Crawler {
    client: WoltClient,
    options: CrawlOptions,
}

impl Crawler {
    #[must_use]
    pub fn new(client: WoltClient, options: CrawlOptions) -> Self {
        Self { client, options }
    }

    #[must_use]
    pub fn client(&self) -> &WoltClient {
        &self.client
    }

    /// Runs a full crawl, streaming each finished market and its items to
    /// `sink` and accumulating counters into `stats`.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Sink`] if the sink fails to write or flush.
    /// Request, parse, and missing-field failures are counted, never
    /// returned.
    pub async fn run<S: CrawlSink>(
        &self,
        sink: &mut S,
        stats: &mut CrawlStats,
    ) -> Result<(), CrawlError> {
        self.run_with(sink, stats, &mut MarketSet::default()).await
    }

    /// Like [`Crawler::run`], but keeps the discovered markets in `markets`
    /// so a caller that cancels the run can hand the rest to
    /// [`Crawler::write_unfetched`].
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Sink`] if the sink fails to write or flush.
    pub async fn run_with<S: CrawlSink>(
        &self,
        sink: &mut S,
        stats: &mut CrawlStats,
        markets: &mut MarketSet,
    ) -> Result<(), CrawlError> {
        let mut stage = CrawlStage::EnumCities;
        let mut cities: Vec<City> = Vec::new();

        while !stage.is_terminal() {
            tracing::debug!(%stage, "entering crawl stage");
            stage = match stage {
                CrawlStage::EnumCities => {
                    cities = self.enumerate_cities(stats).await;
                    if cities.is_empty() {
                        tracing::warn!("no cities to crawl");
                    }
                    stage.next(cities.len())
                }
                CrawlStage::DiscoverMarkets => {
                    for city in &cities {
                        self.discover_city(city, markets, stats).await;
                    }
                    tracing::info!(
                        markets = markets.len(),
                        rediscovered = stats.markets_rediscovered,
                        "market discovery complete"
                    );
                    stage.next(markets.len())
                }
                CrawlStage::FetchVenues => {
                    let pending: Vec<Market> = markets.unwritten().cloned().collect();
                    let total = pending.len();
                    let mut seen_items: HashSet<String> = HashSet::new();
                    for (index, market) in pending.into_iter().enumerate() {
                        tracing::info!(
                            venue = %market.slug,
                            position = index + 1,
                            total,
                            "processing market"
                        );
                        let id = market.id.clone();
                        self.process_market(market, &mut seen_items, sink, stats)
                            .await?;
                        markets.mark_written(&id);
                    }
                    stage.next(total)
                }
                CrawlStage::Done => CrawlStage::Done,
            };
        }

        sink.flush()?;
        tracing::info!(
            cities = stats.cities_processed,
            markets = stats.markets_written,
            items = stats.items_written,
            failures = stats.failures.total(),
            "crawl complete"
        );
        Ok(())
    }

    /// Writes every market in `markets` that has not reached the sink yet,
    /// keeping its discovery fields and `pending` detail status, then
    /// flushes. Returns how many markets were written.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Sink`] if the sink fails to write or flush.
    pub fn write_unfetched<S: CrawlSink>(
        markets: &mut MarketSet,
        sink: &mut S,
        stats: &mut CrawlStats,
    ) -> Result<usize, CrawlError> {
        let pending: Vec<Market> = markets.unwritten().cloned().collect();
        for market in &pending {
            sink.write_market(market)?;
            stats.observe_market(market);
            stats.markets_unfetched += 1;
            markets.mark_written(&market.id);
        }
        sink.flush()?;
        if !pending.is_empty() {
            tracing::warn!(
                markets = pending.len(),
                "wrote markets whose catalog was never fetched"
            );
        }
        Ok(pending.len())
    }

    async fn enumerate_cities(&self, stats: &mut CrawlStats) -> Vec<City> {
        let cities = if let Some(seeds) = &self.options.seed_cities {
            tracing::info!(count = seeds.len(), "using seed cities");
            seeds.clone()
        } else {
            let listing = self.client.list_cities().await;
            stats.record_listing(&listing);
            listing.records
        };

        let cities = match self.options.city_filter.as_deref() {
            Some(filter) => {
                let selected: Vec<City> = cities
                    .into_iter()
                    .filter(|c| c.slug.eq_ignore_ascii_case(filter))
                    .collect();
                if selected.is_empty() {
                    tracing::warn!(city = filter, "no enumerated city matches filter");
                }
                selected
            }
            None => cities,
        };

        stats.cities_enumerated = cities.len();
        cities
    }

    async fn discover_city(&self, city: &City, markets: &mut MarketSet, stats: &mut CrawlStats) {
        let listing = self.client.discover(city).await;
        stats.record_listing(&listing);
        if listing.error.is_some() {
            stats.cities_failed += 1;
            return;
        }
        stats.cities_processed += 1;

        for market in listing.records {
            if markets.merge(market) {
                stats.markets_discovered += 1;
            } else {
                stats.markets_rediscovered += 1;
            }
        }
    }

    async fn process_market<S: CrawlSink>(
        &self,
        mut market: Market,
        seen_items: &mut HashSet<String>,
        sink: &mut S,
        stats: &mut CrawlStats,
    ) -> Result<(), CrawlError> {
        let detail = self.client.fetch_detail(&market).await;
        let mut state = MarketState::Pending.on_detail(&detail);
        let mut items: Vec<Item> = Vec::new();

        match detail {
            Ok(catalog) => {
                stats.venues_fetched += 1;
                if let Some(info) = &catalog.venue {
                    apply_venue_info(&mut market, info);
                }

                let extraction = extract_items(&market, &catalog, Utc::now());
                stats.items_skipped += extraction.skipped;
                stats.unresolved_item_refs += extraction.unresolved_refs;
                stats
                    .failures
                    .add(FailureKind::MissingField, extraction.skipped);

                for item in extraction.items {
                    if seen_items.insert(item.id.clone()) {
                        items.push(item);
                    } else {
                        tracing::warn!(
                            venue = %market.slug,
                            item_id = %item.id,
                            "item already emitted under another venue; keeping first"
                        );
                        stats.duplicate_items += 1;
                    }
                }
                state = state.on_extracted(items.len());
            }
            Err(e) => {
                tracing::warn!(
                    venue = %market.slug,
                    market_id = %market.id,
                    error = %e,
                    "venue detail failed; keeping discovery fields"
                );
                stats.venues_failed += 1;
                stats.record_failure(e.kind());
                state = state.on_skip();
            }
        }

        market.detail_status = state.detail_status();
        sink.write_market(&market)?;
        stats.observe_market(&market);
        sink.write_items(&items)?;
        for item in &items {
            stats.observe_item(item);
        }
        sink.flush()?;

        tracing::debug!(venue = %market.slug, state = ?state, "market done");
        Ok(())
    }
}
