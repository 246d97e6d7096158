//! Output side of a crawl.

use std::io;

use woltm_core::{Item, Market};

/// Destination for crawl output.
///
/// The orchestrator writes each market once it has finished processing it,
/// immediately followed by that market's items, then flushes. Every item
/// therefore references a market already written to the same sink.
pub trait CrawlSink {
    /// Writes one market row.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the underlying writer.
    fn write_market(&mut self, market: &Market) -> io::Result<()>;

    /// Writes the items extracted from the most recently written market.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the underlying writer.
    fn write_items(&mut self, items: &[Item]) -> io::Result<()>;

    /// # Errors
    ///
    /// Returns any I/O error from the underlying writer.
    fn flush(&mut self) -> io::Result<()>;
}

/// In-memory sink, used by tests and by callers that post-process output.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub markets: Vec<Market>,
    pub items: Vec<Item>,
    pub flushes: usize,
}

impl CrawlSink for MemorySink {
    fn write_market(&mut self, market: &Market) -> io::Result<()> {
        self.markets.push(market.clone());
        Ok(())
    }

    fn write_items(&mut self, items: &[Item]) -> io::Result<()> {
        self.items.extend_from_slice(items);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
