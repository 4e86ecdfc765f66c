//! Breadth-first deep crawl.
//!
//! The crawl starts at depth 0 with the seed URLs and proceeds level by
//! level. Links found on a page at depth `d` are queued at `d + 1` as long as
//! `d < max_depth`. Every URL is fetched at most once, and no more than
//! `max_pages` pages are fetched in total.
//!
//! Pages of one level are fetched concurrently (`concurrency` in flight)
//! but handed to the [`PageHandler`] in discovery order, so two crawls of
//! an unchanged site see the same sequence of pages.

use crate::config::CrawlConfig;
use crate::error::{CrawlError, Result};
use crate::extract::extract_links;
use crate::fetcher::PageFetcher;
use crate::models::PageResult;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Receives every page of a crawl as soon as it is fetched.
pub trait PageHandler {
    /// Returning an error stops the crawl.
    async fn handle(&mut self, page: PageResult) -> Result<()>;
}

#[derive(Debug)]
pub struct DeepCrawler<'a, F> {
    fetcher: &'a F,
    max_depth: usize,
    max_pages: usize,
    include_external: bool,
    concurrency: usize,
}

impl<'a, F: PageFetcher> DeepCrawler<'a, F> {
    pub fn new(fetcher: &'a F, config: &CrawlConfig) -> Self {
        Self {
            fetcher,
            max_depth: config.effective_depth(),
            max_pages: config.max_pages,
            include_external: config.include_external,
            concurrency: config.concurrency.max(1),
        }
    }

    /// Crawl from `seeds`, feeding each page to `handler`.
    ///
    /// Returns the number of pages fetched.
    #[instrument(level = "info", skip_all, fields(seeds = seeds.len(), max_depth = self.max_depth, max_pages = self.max_pages))]
    pub async fn crawl<H: PageHandler>(&self, seeds: Vec<Url>, handler: &mut H) -> Result<usize> {
        let domains: HashSet<String> = seeds
            .iter()
            .filter_map(|u| u.host_str().map(site_domain))
            .collect();
        let mut visited: HashSet<String> = HashSet::new();
        let mut level: Vec<Url> = seeds
            .into_iter()
            .map(strip_fragment)
            .filter(|u| visited.insert(u.to_string()))
            .collect();

        let fetcher = self.fetcher;
        let mut depth = 0;
        let mut fetched = 0;

        while !level.is_empty() && fetched < self.max_pages {
            level.truncate(self.max_pages - fetched);
            info!(depth, urls = level.len(), "Crawling level");

            let mut next_level = Vec::new();
            let mut results = stream::iter(level)
                .map(move |url| async move {
                    let outcome = fetcher.fetch(&url).await;
                    (url, outcome)
                })
                .buffered(self.concurrency);

            while let Some((url, outcome)) = results.next().await {
                fetched += 1;
                let page = match outcome {
                    Ok(page) => {
                        visited.insert(page.url.to_string());
                        if depth < self.max_depth {
                            for link in extract_links(&page.html, &page.url) {
                                if self.should_follow(&link, &domains) && visited.insert(link.to_string()) {
                                    next_level.push(link);
                                }
                            }
                        }
                        PageResult {
                            url: page.url.to_string(),
                            depth,
                            status: Some(page.status),
                            html: Some(page.html),
                            error: None,
                        }
                    }
                    Err(e) if !e.is_page_error() => return Err(e),
                    Err(e) => {
                        warn!(%url, depth, error = %e, "Fetch failed; skipping page");
                        PageResult {
                            url: url.to_string(),
                            depth,
                            status: error_status(&e),
                            html: None,
                            error: Some(e.to_string()),
                        }
                    }
                };
                handler.handle(page).await?;
            }

            debug!(depth, discovered = next_level.len(), "Level complete");
            level = next_level;
            depth += 1;
        }

        info!(pages = fetched, "Crawl finished");
        Ok(fetched)
    }

    fn should_follow(&self, link: &Url, domains: &HashSet<String>) -> bool {
        if !matches!(link.scheme(), "http" | "https") {
            return false;
        }
        self.include_external
            || link
                .host_str()
                .is_some_and(|h| domains.iter().any(|d| same_site(h, d)))
    }
}

/// Host with a leading `www.` removed; `www.nur.cn` and `nur.cn` are one site.
fn site_domain(host: &str) -> String {
    let host = host.to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Whether `host` is `domain` itself or one of its subdomains.
fn same_site(host: &str, domain: &str) -> bool {
    let host = site_domain(host);
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn strip_fragment(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}

fn error_status(e: &CrawlError) -> Option<u16> {
    match e {
        CrawlError::Status { status, .. } => Some(*status),
        CrawlError::Fetch { source, .. } => source.status().map(|s| s.as_u16()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    fn site() -> MockFetcher {
        MockFetcher::new()
            .page(
                "https://www.nur.cn/",
                r#"<a href="/news/a.shtml">a</a>
                   <a href="/news/b.shtml">b</a>
                   <a href="/list.shtml">list</a>
                   <a href="https://other.example/">external</a>
                   <a href="mailto:info@nur.cn">mail</a>"#,
            )
            .page("https://www.nur.cn/news/a.shtml", r#"<a href="/">home</a><a href="/news/c.shtml">c</a>"#)
            .page("https://www.nur.cn/news/b.shtml", "<p>b</p>")
            .page("https://www.nur.cn/list.shtml", r#"<a href="/news/d.shtml">d</a>"#)
            .page("https://www.nur.cn/news/c.shtml", r#"<a href="/news/e.shtml">e</a>"#)
            .page("https://www.nur.cn/news/d.shtml", "<p>d</p>")
            .page("https://other.example/", "<p>x</p>")
    }

    fn config(depth: usize, pages: usize) -> CrawlConfig {
        CrawlConfig {
            max_depth: depth,
            max_pages: pages,
            concurrency: 2,
            ..CrawlConfig::default()
        }
    }

    fn seed() -> Vec<Url> {
        vec![Url::parse("https://www.nur.cn/").unwrap()]
    }

    fn urls(pages: &[PageResult]) -> Vec<&str> {
        pages.iter().map(|p| p.url.as_str()).collect()
    }

    #[tokio::test]
    async fn test_bfs_order_and_depth_limit() {
        let fetcher = site();
        let mut pages: Vec<PageResult> = Vec::new();
        let fetched = DeepCrawler::new(&fetcher, &config(1, 100))
            .crawl(seed(), &mut pages)
            .await
            .unwrap();

        assert_eq!(fetched, 4);
        assert_eq!(
            urls(&pages),
            vec![
                "https://www.nur.cn/",
                "https://www.nur.cn/news/a.shtml",
                "https://www.nur.cn/news/b.shtml",
                "https://www.nur.cn/list.shtml",
            ]
        );
        assert_eq!(pages[0].depth, 0);
        assert!(pages[1..].iter().all(|p| p.depth == 1));
    }

    #[tokio::test]
    async fn test_deeper_levels_never_revisit() {
        let fetcher = site();
        let mut pages: Vec<PageResult> = Vec::new();
        DeepCrawler::new(&fetcher, &config(3, 100))
            .crawl(seed(), &mut pages)
            .await
            .unwrap();

        let got = urls(&pages);
        assert_eq!(got.len(), 7);
        assert_eq!(got.iter().filter(|u| **u == "https://www.nur.cn/").count(), 1);
        assert!(!got.contains(&"https://other.example/"));
        let e = pages.iter().find(|p| p.url == "https://www.nur.cn/news/e.shtml").unwrap();
        assert_eq!(e.depth, 3);
        assert!(!e.success());
    }

    #[tokio::test]
    async fn test_max_pages_caps_fetches() {
        let fetcher = site();
        let mut pages: Vec<PageResult> = Vec::new();
        let fetched = DeepCrawler::new(&fetcher, &config(3, 2))
            .crawl(seed(), &mut pages)
            .await
            .unwrap();

        assert_eq!(fetched, 2);
        assert_eq!(pages.len(), 2);
        assert_eq!(fetcher.requests(), 2);
    }

    #[tokio::test]
    async fn test_include_external() {
        let fetcher = site();
        let mut pages: Vec<PageResult> = Vec::new();
        let config = CrawlConfig {
            include_external: true,
            ..config(1, 100)
        };
        DeepCrawler::new(&fetcher, &config)
            .crawl(seed(), &mut pages)
            .await
            .unwrap();

        assert!(urls(&pages).contains(&"https://other.example/"));
        assert!(!urls(&pages).iter().any(|u| u.starts_with("mailto:")));
    }

    #[tokio::test]
    async fn test_failed_pages_are_reported_and_skipped() {
        let fetcher = MockFetcher::new()
            .page("https://www.nur.cn/", r#"<a href="/missing.shtml">x</a><a href="/ok.shtml">y</a>"#)
            .page("https://www.nur.cn/ok.shtml", "<p>ok</p>");
        let mut pages: Vec<PageResult> = Vec::new();
        DeepCrawler::new(&fetcher, &config(1, 100))
            .crawl(seed(), &mut pages)
            .await
            .unwrap();

        assert_eq!(pages.len(), 3);
        let missing = &pages[1];
        assert_eq!(missing.url, "https://www.nur.cn/missing.shtml");
        assert_eq!(missing.status, Some(404));
        assert!(missing.error.is_some());
        assert!(pages[2].success());
    }

    #[tokio::test]
    async fn test_bare_domain_and_subdomains_are_internal() {
        let fetcher = MockFetcher::new()
            .page(
                "https://www.nur.cn/",
                r#"<a href="https://nur.cn/news/a.shtml">bare</a>
                   <a href="https://m.nur.cn/news/b.shtml">mobile</a>
                   <a href="https://notnur.cn/news/c.shtml">lookalike</a>
                   <a href="https://nur.cn.example/news/d.shtml">suffix</a>"#,
            )
            .page("https://nur.cn/news/a.shtml", "<p>a</p>")
            .page("https://m.nur.cn/news/b.shtml", "<p>b</p>");
        let mut pages: Vec<PageResult> = Vec::new();
        DeepCrawler::new(&fetcher, &config(1, 100))
            .crawl(seed(), &mut pages)
            .await
            .unwrap();

        assert_eq!(
            urls(&pages),
            vec![
                "https://www.nur.cn/",
                "https://nur.cn/news/a.shtml",
                "https://m.nur.cn/news/b.shtml",
            ]
        );
        assert!(pages.iter().all(|p| p.success()));
    }

    #[test]
    fn test_same_site() {
        assert_eq!(site_domain("WWW.nur.cn"), "nur.cn");
        assert!(same_site("www.nur.cn", "nur.cn"));
        assert!(same_site("nur.cn", "nur.cn"));
        assert!(same_site("m.nur.cn", "nur.cn"));
        assert!(!same_site("notnur.cn", "nur.cn"));
        assert!(!same_site("nur.cn.example", "nur.cn"));
    }

    #[tokio::test]
    async fn test_handler_error_stops_crawl() {
        struct FailFirst;
        impl PageHandler for FailFirst {
            async fn handle(&mut self, _page: PageResult) -> Result<()> {
                Err(CrawlError::InvalidConfig("stop".into()))
            }
        }

        let fetcher = site();
        let result = DeepCrawler::new(&fetcher, &config(3, 100))
            .crawl(seed(), &mut FailFirst)
            .await;

        assert!(result.is_err());
        assert_eq!(fetcher.requests(), 1);
    }
}
