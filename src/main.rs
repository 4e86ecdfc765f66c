//! # nur_crawler
//!
//! Deep-crawls [nur.cn](https://www.nur.cn/) and saves its news articles
//! locally.
//!
//! ## Usage
//!
//! ```sh
//! nur_crawler --pages 1000 --depth 2 -o ./nur_articles -a ./nur_articles.zip
//! ```
//!
//! ## Architecture
//!
//! A run is a single linear pass:
//! 1. **Configure**: defaults, optional YAML file, command-line flags
//! 2. **Crawl**: breadth-first from the seed page, same site only
//! 3. **Extract**: headline and body of every `/news/*.shtml` page
//! 4. **Output**: one text file per article, one JSON dataset, optional zip

use clap::Parser;
use std::error::Error;
use tracing::{error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod crawler;
mod error;
mod extract;
mod fetcher;
mod models;
mod outputs;
mod pipeline;
#[cfg(test)]
mod testing;
mod utils;

use cli::Cli;
use config::CrawlConfig;
use fetcher::HttpFetcher;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("nur_crawler starting up");

    let args = Cli::parse();
    let config = match CrawlConfig::from_cli(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        seed = %config.seed_url,
        targets = config.target_urls.len(),
        max_pages = config.max_pages,
        max_depth = config.effective_depth(),
        output_dir = %config.output_dir.display(),
        "Configuration loaded"
    );

    let fetcher = HttpFetcher::new(&config)?;
    let result = match pipeline::run(&config, &fetcher).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Crawl aborted");
            return Err(e.into());
        }
    };

    if let Some(dataset) = &result.dataset_file {
        info!(path = %dataset.display(), "Dataset saved");
    }
    if let Some(archive) = &result.archive {
        info!(path = %archive.display(), "Archive saved");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        pages = result.stats.pages,
        extracted = result.stats.extracted,
        skipped_duplicates = result.stats.skipped_duplicates,
        failed = result.stats.failed,
        text_files = result.text_files.len(),
        "Execution complete"
    );

    Ok(())
}
