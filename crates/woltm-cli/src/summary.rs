//! Plain-text run summary.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use woltm_scraper::{CrawlStats, FailureKind};

const FAILURE_KINDS: [FailureKind; 4] = [
    FailureKind::Network,
    FailureKind::Http,
    FailureKind::Parse,
    FailureKind::MissingField,
];

/// Run metadata that is not a counter.
#[derive(Debug, Clone)]
pub(crate) struct RunInfo {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub interrupted: bool,
    pub markets_path: PathBuf,
    pub items_path: PathBuf,
}

/// Borrowed view of one run that formats as the plain-text summary.
pub(crate) struct Summary<'a> {
    pub stats: &'a CrawlStats,
    pub info: &'a RunInfo,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Summary { stats, info } = self;
        let status = if info.interrupted {
            "interrupted (partial output)"
        } else {
            "completed"
        };
        let elapsed = info.finished_at - info.started_at;

        writeln!(f, "Wolt market crawl summary")?;
        writeln!(f, "=========================")?;
        writeln!(f, "Started:   {}", info.started_at.to_rfc3339())?;
        writeln!(f, "Finished:  {}", info.finished_at.to_rfc3339())?;
        writeln!(f, "Duration:  {}s", elapsed.num_seconds())?;
        writeln!(f, "Status:    {status}")?;
        writeln!(f)?;

        writeln!(f, "Cities enumerated:     {}", stats.cities_enumerated)?;
        writeln!(f, "Cities processed:      {}", stats.cities_processed)?;
        writeln!(f, "Cities failed:         {}", stats.cities_failed)?;
        writeln!(f, "Markets discovered:    {}", stats.markets_discovered)?;
        writeln!(f, "Markets rediscovered:  {}", stats.markets_rediscovered)?;
        writeln!(f, "Markets written:       {}", stats.markets_written)?;
        writeln!(f, "Markets not fetched:   {}", stats.markets_unfetched)?;
        writeln!(f, "Venue details fetched: {}", stats.venues_fetched)?;
        writeln!(f, "Venue details failed:  {}", stats.venues_failed)?;
        writeln!(f, "Items written:         {}", stats.items_written)?;
        writeln!(f, "Duplicate items:       {}", stats.duplicate_items)?;
        writeln!(f, "Items without id:      {}", stats.items_skipped)?;
        writeln!(f, "Unresolved item refs:  {}", stats.unresolved_item_refs)?;
        writeln!(f)?;

        writeln!(f, "Failures by category:")?;
        for kind in FAILURE_KINDS {
            writeln!(f, "  {:<14} {}", kind.to_string(), stats.failures.get(kind))?;
        }
        writeln!(f, "  {:<14} {}", "total", stats.failures.total())?;
        writeln!(f)?;

        writeln!(f, "Markets offering delivery: {}", stats.markets_delivering())?;
        writeln!(
            f,
            "Average market rating:     {}",
            format_metric(stats.average_rating(), "")
        )?;
        writeln!(f, "Items on discount:         {}", stats.discounted_items())?;
        writeln!(
            f,
            "Average discount:          {}",
            format_metric(stats.average_discount_percentage(), "%")
        )?;
        writeln!(
            f,
            "Item availability:         {}",
            format_metric(stats.availability_rate(), "%")
        )?;
        writeln!(f)?;

        writeln!(f, "Markets table: {}", info.markets_path.display())?;
        writeln!(f, "Items table:   {}", info.items_path.display())
    }
}

pub(crate) fn render_summary(stats: &CrawlStats, info: &RunInfo) -> String {
    Summary { stats, info }.to_string()
}

/// Writes `scrape_summary{suffix}.txt` into `dir` and returns its path.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub(crate) fn write_summary(
    dir: &Path,
    suffix: &str,
    stats: &CrawlStats,
    info: &RunInfo,
) -> anyhow::Result<PathBuf> {
    let path = dir.join(format!("scrape_summary{suffix}.txt"));
    std::fs::write(&path, render_summary(stats, info))
        .with_context(|| format!("failed to write summary {}", path.display()))?;
    Ok(path)
}

fn format_metric(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "n/a".to_owned(), |v| format!("{v:.2}{unit}"))
}
