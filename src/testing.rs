//! In-memory stand-ins for the network, shared by unit tests.

use crate::crawler::PageHandler;
use crate::error::{CrawlError, Result};
use crate::fetcher::{FetchedPage, PageFetcher};
use crate::models::PageResult;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// Serves a fixed set of pages; everything else is a 404.
#[derive(Debug, Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
    requests: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Number of fetches issued so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.pages.get(url.as_str()) {
            Some(html) => Ok(FetchedPage {
                url: url.clone(),
                status: 200,
                html: html.clone(),
            }),
            None => Err(CrawlError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

impl PageHandler for Vec<PageResult> {
    async fn handle(&mut self, page: PageResult) -> Result<()> {
        self.push(page);
        Ok(())
    }
}
