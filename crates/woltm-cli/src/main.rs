mod crawl;
mod output;
mod summary;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "woltm")]
#[command(about = "Crawl retail markets and their catalogs from the Wolt platform")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl cities, markets, and catalogs into CSV files plus a summary
    Crawl(CrawlArgs),
    /// List the cities the platform serves
    Cities,
}

#[derive(Debug, Clone, Default, Args)]
struct CrawlArgs {
    /// Directory for the output tables and summary (overrides `WOLTM_OUTPUT_DIR`)
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Only crawl the city with this slug
    #[arg(long)]
    city: Option<String>,
    /// Latitude of a seed coordinate; skips city enumeration
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Longitude of a seed coordinate; skips city enumeration
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,
    /// Minimum spacing between requests in milliseconds
    #[arg(long)]
    min_interval_ms: Option<u64>,
    /// Per-request timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Arguments first: `--help` and usage errors must not depend on the
    // environment being configured.
    let cli = Cli::parse();

    let config = woltm_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Crawl(args) => crawl::run_crawl(config, &args).await,
        Commands::Cities => crawl::run_cities(&config).await,
    }
}
