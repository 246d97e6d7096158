//! Crawl stages and per-market sub-states.

use std::fmt;

use woltm_core::DetailStatus;

use crate::error::{FailureKind, FetchError};

/// Top-level progression of a crawl run.
///
/// `EnumCities → DiscoverMarkets → FetchVenues → Done`. A stage that
/// produces nothing for the next one to work on skips straight to `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStage {
    EnumCities,
    DiscoverMarkets,
    FetchVenues,
    Done,
}

impl CrawlStage {
    /// Stage that follows `self` given how many entities it produced
    /// (cities for `EnumCities`, unique markets for `DiscoverMarkets`).
    #[must_use]
    pub fn next(self, produced: usize) -> Self {
        match self {
            CrawlStage::EnumCities if produced == 0 => CrawlStage::Done,
            CrawlStage::EnumCities => CrawlStage::DiscoverMarkets,
            CrawlStage::DiscoverMarkets if produced == 0 => CrawlStage::Done,
            CrawlStage::DiscoverMarkets => CrawlStage::FetchVenues,
            CrawlStage::FetchVenues | CrawlStage::Done => CrawlStage::Done,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == CrawlStage::Done
    }
}

impl fmt::Display for CrawlStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CrawlStage::EnumCities => "enum_cities",
            CrawlStage::DiscoverMarkets => "discover_markets",
            CrawlStage::FetchVenues => "fetch_venues",
            CrawlStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Progress of one market through the venue stage.
///
/// `Pending → DetailFetched | DetailFailed → Extracted | ExtractSkipped`.
/// Transitions that do not apply to the current state leave it unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketState {
    Pending,
    DetailFetched,
    DetailFailed(FailureKind),
    Extracted { items: usize },
    ExtractSkipped,
}

impl MarketState {
    /// Applies the outcome of the venue-content fetch.
    #[must_use]
    pub fn on_detail<T>(self, outcome: &Result<T, FetchError>) -> Self {
        match (self, outcome) {
            (MarketState::Pending, Ok(_)) => MarketState::DetailFetched,
            (MarketState::Pending, Err(e)) => MarketState::DetailFailed(e.kind()),
            (other, _) => other,
        }
    }

    /// Records a completed extraction that contributed `items` new items.
    #[must_use]
    pub fn on_extracted(self, items: usize) -> Self {
        match self {
            MarketState::DetailFetched => MarketState::Extracted { items },
            other => other,
        }
    }

    /// Extraction is skipped for markets whose detail fetch failed.
    #[must_use]
    pub fn on_skip(self) -> Self {
        match self {
            MarketState::DetailFailed(_) => MarketState::ExtractSkipped,
            other => other,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MarketState::Extracted { .. } | MarketState::ExtractSkipped
        )
    }

    /// Status written to the output row.
    #[must_use]
    pub fn detail_status(self) -> DetailStatus {
        match self {
            MarketState::Extracted { .. } => DetailStatus::Extracted,
            MarketState::DetailFailed(_) | MarketState::ExtractSkipped => DetailStatus::Failed,
            MarketState::Pending | MarketState::DetailFetched => DetailStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_500() -> FetchError {
        FetchError::Http {
            status: 500,
            url: "https://consumer-api.test/venue".to_owned(),
        }
    }

    #[test]
    fn empty_city_set_ends_the_run() {
        assert_eq!(CrawlStage::EnumCities.next(0), CrawlStage::Done);
        assert_eq!(CrawlStage::EnumCities.next(3), CrawlStage::DiscoverMarkets);
    }

    #[test]
    fn stages_progress_in_order() {
        let mut stage = CrawlStage::EnumCities;
        let mut visited = vec![stage];
        while !stage.is_terminal() {
            stage = stage.next(1);
            visited.push(stage);
        }
        assert_eq!(
            visited,
            vec![
                CrawlStage::EnumCities,
                CrawlStage::DiscoverMarkets,
                CrawlStage::FetchVenues,
                CrawlStage::Done
            ]
        );
        assert_eq!(CrawlStage::Done.next(5), CrawlStage::Done);
    }

    #[test]
    fn no_markets_skips_venue_stage() {
        assert_eq!(CrawlStage::DiscoverMarkets.next(0), CrawlStage::Done);
    }

    #[test]
    fn successful_market_reaches_extracted() {
        let state = MarketState::Pending
            .on_detail::<()>(&Ok(()))
            .on_extracted(4);
        assert_eq!(state, MarketState::Extracted { items: 4 });
        assert!(state.is_terminal());
        assert_eq!(state.detail_status(), DetailStatus::Extracted);
    }

    #[test]
    fn failed_detail_skips_extraction() {
        let state = MarketState::Pending.on_detail::<()>(&Err(http_500()));
        assert_eq!(state, MarketState::DetailFailed(FailureKind::Http));
        assert_eq!(state.detail_status(), DetailStatus::Failed);

        let state = state.on_extracted(10);
        assert_eq!(state, MarketState::DetailFailed(FailureKind::Http));

        let state = state.on_skip();
        assert_eq!(state, MarketState::ExtractSkipped);
        assert!(state.is_terminal());
        assert_eq!(state.detail_status(), DetailStatus::Failed);
    }

    #[test]
    fn skip_does_not_apply_after_successful_fetch() {
        let state = MarketState::Pending.on_detail::<()>(&Ok(())).on_skip();
        assert_eq!(state, MarketState::DetailFetched);
        assert_eq!(state.detail_status(), DetailStatus::Pending);
    }

    #[test]
    fn stage_names_are_snake_case() {
        assert_eq!(CrawlStage::FetchVenues.to_string(), "fetch_venues");
    }
}
