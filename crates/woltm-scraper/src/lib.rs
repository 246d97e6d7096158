pub mod cities;
pub mod client;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod markets;
pub mod normalize;
mod parse_helpers;
mod rate_limit;
pub mod throttle;
pub mod types;
pub mod venue;

pub use client::{ClientConfig, Listing, WoltClient};
pub use crawl::{
    CrawlError, CrawlOptions, CrawlSink, CrawlStage, CrawlStats, Crawler, FailureCounts,
    MarketSet, MarketState, MemorySink,
};
pub use error::{FailureKind, FetchError};
pub use extract::{extract_items, Extraction};
pub use throttle::Throttle;
pub use types::VenueContent;
