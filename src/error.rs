//! Error taxonomy for a crawl run.
//!
//! Errors fall into three groups:
//! - **Per-page** ([`CrawlError::Fetch`], [`CrawlError::Status`], [`CrawlError::NotHtml`]):
//!   the page is logged and skipped, the run continues.
//! - **Input** ([`CrawlError::InvalidUrl`], [`CrawlError::Config`]): reported before any fetch.
//! - **Output** ([`CrawlError::Io`], [`CrawlError::Json`], [`CrawlError::Archive`]): fatal.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} is not an HTML page (content-type: {content_type})")]
    NotHtml { url: String, content_type: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("failed to load config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl CrawlError {
    /// Wrap an [`std::io::Error`] with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CrawlError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error concerns a single page and the run may go on.
    pub fn is_page_error(&self) -> bool {
        matches!(
            self,
            CrawlError::Fetch { .. } | CrawlError::Status { .. } | CrawlError::NotHtml { .. }
        )
    }
}

impl From<url::ParseError> for CrawlError {
    fn from(e: url::ParseError) -> Self {
        CrawlError::InvalidUrl(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CrawlError>;
