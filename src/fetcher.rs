//! Page fetching.
//!
//! [`PageFetcher`] is the seam between the crawler and the network. The
//! crawler only ever asks "give me the markup behind this URL"; HTTP-level
//! concerns (redirects, compression, TLS, timeouts) stay with the
//! implementation. [`HttpFetcher`] is the reqwest-backed implementation used
//! by the binary; tests substitute an in-memory one.

use crate::config::CrawlConfig;
use crate::error::{CrawlError, Result};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// A page as returned by a fetcher.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub url: Url,
    pub status: u16,
    pub html: String,
}

/// Anything that can turn a URL into page markup.
pub trait PageFetcher {
    /// Fetch one page.
    ///
    /// # Errors
    ///
    /// Returns a per-page error ([`CrawlError::is_page_error`]) when the
    /// request fails, the server answers with a non-success status, or the
    /// response is not HTML.
    async fn fetch(&self, url: &Url) -> Result<FetchedPage>;
}

/// [`PageFetcher`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|source| CrawlError::Fetch {
                url: config.seed_url.clone(),
                source,
            })?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        let fetch_err = |source| CrawlError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url.clone()).send().await.map_err(fetch_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !is_html_content_type(&content_type) {
            return Err(CrawlError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(fetch_err)?;
        debug!(status = status.as_u16(), bytes = html.len(), "Fetched page");

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            html,
        })
    }
}

/// A missing content type is given the benefit of the doubt.
fn is_html_content_type(content_type: &str) -> bool {
    let ct = content_type.to_ascii_lowercase();
    ct.is_empty() || ct.contains("text/html") || ct.contains("application/xhtml")
}
