//! Run configuration.
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! command-line flags.
//!
//! ```yaml
//! # nur_crawler.yaml
//! max_pages: 1000
//! max_depth: 2
//! output_dir: ./nur_articles
//! archive: ./nur_articles.zip
//! ```

use crate::cli::Cli;
use crate::error::{CrawlError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use url::Url;

pub const DEFAULT_SEED: &str = "https://www.nur.cn/";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Start page of the deep crawl.
    pub seed_url: String,
    /// Explicit targets. When non-empty, only these are fetched and no links are followed.
    pub target_urls: Vec<String>,
    pub max_pages: usize,
    pub max_depth: usize,
    /// Follow links outside the seed's site domain.
    pub include_external: bool,
    /// Maximum in-flight requests per crawl level.
    pub concurrency: usize,
    pub output_dir: PathBuf,
    pub archive: Option<PathBuf>,
    /// Do not skip URLs found in datasets from earlier runs.
    pub fresh: bool,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_url: DEFAULT_SEED.to_string(),
            target_urls: Vec::new(),
            max_pages: 50_000,
            max_depth: 3,
            include_external: false,
            concurrency: 8,
            output_dir: PathBuf::from("nur_articles"),
            archive: None,
            fresh: false,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl CrawlConfig {
    /// Load a config from a YAML file; missing keys keep their defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| CrawlError::io(path, e))?;
        let config = serde_yaml::from_str(&raw).map_err(|source| CrawlError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded configuration file");
        Ok(config)
    }

    /// Build the effective config for a run from the parsed command line.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        debug!(?config, "Effective configuration");
        Ok(config)
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(pages) = cli.pages {
            self.max_pages = pages;
        }
        if let Some(depth) = cli.depth {
            self.max_depth = depth;
        }
        if let Some(dir) = &cli.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(seed) = &cli.seed {
            self.seed_url = seed.clone();
        }
        if !cli.urls.is_empty() {
            self.target_urls = cli.urls.clone();
        }
        if let Some(archive) = &cli.archive {
            self.archive = Some(archive.clone());
        }
        if let Some(concurrency) = cli.concurrency {
            self.concurrency = concurrency;
        }
        self.fresh |= cli.fresh;
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_pages == 0 {
            return Err(CrawlError::InvalidConfig("max_pages must be at least 1".into()));
        }
        if self.concurrency == 0 {
            return Err(CrawlError::InvalidConfig("concurrency must be at least 1".into()));
        }
        self.start_urls()?;
        Ok(())
    }

    /// Whether the run fetches explicit targets instead of deep-crawling.
    pub fn explicit_targets(&self) -> bool {
        !self.target_urls.is_empty()
    }

    /// The URLs the crawl starts from: the explicit targets, or the seed.
    pub fn start_urls(&self) -> Result<Vec<Url>> {
        let raw: Vec<&String> = if self.explicit_targets() {
            self.target_urls.iter().collect()
        } else {
            vec![&self.seed_url]
        };
        raw.into_iter().map(|s| parse_http_url(s)).collect()
    }

    /// Depth limit actually applied; explicit targets never follow links.
    pub fn effective_depth(&self) -> usize {
        if self.explicit_targets() { 0 } else { self.max_depth }
    }
}

fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(CrawlError::InvalidUrl(format!("{raw}: unsupported scheme {other}"))),
    }
}
