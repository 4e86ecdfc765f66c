//! Command-line interface definitions for the nur.cn crawler.
//!
//! Every flag is optional. Unset flags fall back to the config file given
//! with `--config`, then to the built-in defaults in [`crate::config::CrawlConfig`].

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the nur.cn crawler.
///
/// # Examples
///
/// ```sh
/// # Deep-crawl the whole site with the defaults
/// nur_crawler
///
/// # Shallow crawl, bundle the result
/// nur_crawler --pages 200 --depth 1 -a nur_articles.zip
///
/// # Fetch two known articles only
/// nur_crawler -u https://www.nur.cn/news/2024/05/1.shtml -u https://www.nur.cn/news/2024/05/2.shtml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Maximum number of pages to fetch (default 50000)
    #[arg(long)]
    pub pages: Option<usize>,

    /// Maximum link depth from the seed page (default 3)
    #[arg(long)]
    pub depth: Option<usize>,

    /// Directory the article files and dataset are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Start page of the deep crawl
    #[arg(long)]
    pub seed: Option<String>,

    /// Explicit article URL to fetch; disables link discovery (repeatable)
    #[arg(short, long = "url")]
    pub urls: Vec<String>,

    /// Bundle the files written by this run into a zip archive at this path
    #[arg(short, long)]
    pub archive: Option<PathBuf>,

    /// Maximum number of in-flight requests per crawl level
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Ignore datasets left by previous runs instead of skipping their URLs
    #[arg(long)]
    pub fresh: bool,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
