//! Command handlers for `woltm crawl` and `woltm cities`.

use anyhow::Context;
use chrono::Utc;
use woltm_core::{AppConfig, City};
use woltm_scraper::{ClientConfig, CrawlOptions, CrawlStats, Crawler, MarketSet, WoltClient};

use crate::output::CsvSink;
use crate::summary::{self, RunInfo};
use crate::CrawlArgs;

/// Slug given to a seed coordinate passed without `--city`.
const SEED_CITY_SLUG: &str = "custom";

/// Runs a crawl, writing the market and item tables and the run summary
/// into the output directory.
///
/// Ctrl-C stops the crawl. Markets discovered but not yet fetched are
/// written with their discovery fields, everything is flushed, and the
/// summary is still produced, marked as interrupted.
///
/// # Errors
///
/// Returns an error if the seed coordinate is out of range, the output
/// directory or files cannot be created, the HTTP client cannot be built,
/// or writing output fails. Request failures are counted in the summary,
/// not returned.
pub(crate) async fn run_crawl(mut config: AppConfig, args: &CrawlArgs) -> anyhow::Result<()> {
    apply_overrides(&mut config, args);
    let options = crawl_options(args)?;
    let suffix = output_suffix(args);

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let client = WoltClient::new(&ClientConfig::from_app_config(&config))
        .context("failed to build HTTP client")?;
    let crawler = Crawler::new(client, options);
    let mut sink = CsvSink::create(&config.output_dir, &suffix)?;
    let mut stats = CrawlStats::default();
    let mut markets = MarketSet::default();

    let started_at = Utc::now();
    tracing::info!(
        output_dir = %config.output_dir.display(),
        min_interval_ms = config.min_request_interval_ms,
        "starting crawl"
    );

    let (result, interrupted) = tokio::select! {
        result = crawler.run_with(&mut sink, &mut stats, &mut markets) => (result, false),
        () = interrupt_signal() => {
            tracing::warn!("interrupted; flushing partial output");
            (Ok(()), true)
        }
    };
    let result = if interrupted {
        Crawler::write_unfetched(&mut markets, &mut sink, &mut stats).map(|_| ())
    } else {
        result
    };

    let finish = sink.finish();
    let info = RunInfo {
        started_at,
        finished_at: Utc::now(),
        interrupted,
        markets_path: sink.markets_path().to_path_buf(),
        items_path: sink.items_path().to_path_buf(),
    };
    let summary_path = summary::write_summary(&config.output_dir, &suffix, &stats, &info)?;

    result.context("crawl aborted while writing output")?;
    finish.context("failed to flush output files")?;

    println!("{}", summary::render_summary(&stats, &info));
    tracing::info!(summary = %summary_path.display(), "summary written");
    Ok(())
}

/// Lists the cities the platform serves, one per line.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the listing
/// request fails.
pub(crate) async fn run_cities(config: &AppConfig) -> anyhow::Result<()> {
    let client = WoltClient::new(&ClientConfig::from_app_config(config))
        .context("failed to build HTTP client")?;
    let listing = client.list_cities().await;
    if let Some(error) = listing.error {
        return Err(anyhow::Error::new(error).context("failed to list cities"));
    }
    if listing.skipped > 0 {
        tracing::warn!(skipped = listing.skipped, "some city records were unusable");
    }
    for city in &listing.records {
        println!("{}", city_line(city));
    }
    Ok(())
}

fn city_line(city: &City) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{:.4},{:.4}",
        city.id,
        city.slug,
        city.name,
        city.country.as_deref().unwrap_or("-"),
        city.latitude,
        city.longitude
    )
}

fn apply_overrides(config: &mut AppConfig, args: &CrawlArgs) {
    if let Some(dir) = &args.output_dir {
        config.output_dir.clone_from(dir);
    }
    if let Some(ms) = args.min_interval_ms {
        config.min_request_interval_ms = ms;
    }
    if let Some(secs) = args.timeout_secs {
        config.request_timeout_secs = secs;
    }
}

/// A seed coordinate replaces enumeration; otherwise `--city` filters the
/// enumerated cities.
fn crawl_options(args: &CrawlArgs) -> anyhow::Result<CrawlOptions> {
    let (Some(lat), Some(lon)) = (args.lat, args.lon) else {
        return Ok(CrawlOptions {
            seed_cities: None,
            city_filter: args.city.clone(),
        });
    };
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        anyhow::bail!("coordinate ({lat}, {lon}) is out of range");
    }
    let name = args.city.clone().unwrap_or_else(|| SEED_CITY_SLUG.to_owned());
    let seed = City {
        id: name.clone(),
        slug: name.to_lowercase(),
        name,
        country: None,
        latitude: lat,
        longitude: lon,
    };
    Ok(CrawlOptions {
        seed_cities: Some(vec![seed]),
        city_filter: None,
    })
}

/// `_<city>` when the run is restricted to one city or coordinate.
fn output_suffix(args: &CrawlArgs) -> String {
    let city = match (&args.city, args.lat) {
        (Some(city), _) => city.as_str(),
        (None, Some(_)) => SEED_CITY_SLUG,
        (None, None) => return String::new(),
    };
    let cleaned: String = city
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("_{cleaned}")
}

/// Resolves on Ctrl-C. If the handler cannot be installed the crawl simply
/// runs to completion.
async fn interrupt_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
#[path = "crawl_test.rs"]
mod tests;
