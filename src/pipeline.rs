//! One crawl run, from configuration to files on disk.
//!
//! 1. Make sure the output directory is writable
//! 2. Load URLs extracted by earlier runs (unless `fresh`)
//! 3. Crawl; extract and write each article page as it arrives
//! 4. Write the JSON dataset
//! 5. Optionally bundle everything written into a zip

use crate::config::CrawlConfig;
use crate::crawler::{DeepCrawler, PageHandler};
use crate::error::Result;
use crate::extract::{extract_article, is_article_url};
use crate::fetcher::PageFetcher;
use crate::models::{Article, CrawlStats, PageResult, WriteResult};
use crate::outputs::{archive, json, text};
use crate::utils::{ensure_writable_dir, truncate_for_log};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, instrument};
use url::Url;

const EXTRACTED_LOG_EVERY: usize = 100;
const PAGES_LOG_EVERY: usize = 500;

/// Run a full crawl with the given fetcher.
///
/// Article text files are written while the crawl runs; the dataset and the
/// archive are written once it has finished.
///
/// # Arguments
///
/// * `config` - The effective configuration
/// * `fetcher` - Where pages come from; [`crate::fetcher::HttpFetcher`] in production
///
/// # Returns
///
/// A [`WriteResult`] listing every file written and the run's counters.
///
/// # Errors
///
/// Pages that cannot be fetched are skipped and counted, never returned.
/// Errors are returned for:
/// - An output directory that cannot be created or written
/// - A seed or target that is not an http(s) URL
/// - Any failure writing a text file, the dataset, or the archive
#[instrument(level = "info", skip_all, fields(output_dir = %config.output_dir.display()))]
pub async fn run<F: PageFetcher>(config: &CrawlConfig, fetcher: &F) -> Result<WriteResult> {
    ensure_writable_dir(&config.output_dir).await?;

    let seen = if config.fresh {
        HashSet::new()
    } else {
        json::load_existing_urls(&config.output_dir).await?
    };
    info!(known = seen.len(), "Previously extracted URLs will be skipped");

    let seeds = config.start_urls()?;
    let mut collector = ArticleCollector {
        output_dir: config.output_dir.clone(),
        extract_all: config.explicit_targets(),
        seen,
        articles: Vec::new(),
        text_files: Vec::new(),
        written: HashSet::new(),
        stats: CrawlStats::default(),
    };

    DeepCrawler::new(fetcher, config)
        .crawl(seeds, &mut collector)
        .await?;

    let ArticleCollector {
        articles,
        text_files,
        stats,
        ..
    } = collector;
    info!(
        pages = stats.pages,
        extracted = stats.extracted,
        skipped_duplicates = stats.skipped_duplicates,
        failed = stats.failed,
        "Crawl complete"
    );

    let dataset_file = json::write_dataset(&articles, &config.seed_url, &config.output_dir).await?;

    let mut result = WriteResult {
        text_files,
        dataset_file,
        archive: None,
        stats,
    };

    if let Some(dest) = &config.archive {
        let files = result.written_files();
        if files.is_empty() {
            info!(dest = %dest.display(), "Nothing written; archive skipped");
        } else {
            let path = archive::create_archive(&files, &config.output_dir, dest)?;
            let entries = archive::list_archive(&path)?;
            info!(entries = entries.len(), path = %path.display(), "Archive verified");
            result.archive = Some(path);
        }
    }

    Ok(result)
}

/// Turns crawled pages into articles and writes their text files.
struct ArticleCollector {
    output_dir: PathBuf,
    /// Extract every page, not only news article URLs.
    extract_all: bool,
    seen: HashSet<String>,
    articles: Vec<Article>,
    /// Text files in write order.
    text_files: Vec<PathBuf>,
    /// Same files, for constant-time repeat checks.
    written: HashSet<PathBuf>,
    stats: CrawlStats,
}

impl ArticleCollector {
    fn wants(&self, url: &str) -> bool {
        self.extract_all || Url::parse(url).is_ok_and(|u| is_article_url(&u))
    }
}

impl PageHandler for ArticleCollector {
    async fn handle(&mut self, page: PageResult) -> Result<()> {
        self.stats.pages += 1;
        if self.stats.pages % PAGES_LOG_EVERY == 0 {
            info!(
                pages = self.stats.pages,
                extracted = self.stats.extracted,
                skipped_duplicates = self.stats.skipped_duplicates,
                "Progress"
            );
        }

        if !page.success() {
            self.stats.failed += 1;
            debug!(
                url = %page.url,
                depth = page.depth,
                status = ?page.status,
                error = ?page.error,
                "Page not fetched"
            );
            return Ok(());
        }
        if !self.wants(&page.url) {
            return Ok(());
        }
        if !self.seen.insert(page.url.clone()) {
            self.stats.skipped_duplicates += 1;
            debug!(url = %page.url, "Already extracted; skipping");
            return Ok(());
        }

        let html = page.html.as_deref().unwrap_or_default();
        let Some(article) = extract_article(html, &page.url) else {
            debug!(url = %page.url, "No article content found");
            return Ok(());
        };

        if let Some(path) = text::write_article_text(&article, &self.output_dir).await? {
            if self.written.insert(path.clone()) {
                self.text_files.push(path);
            }
        }
        self.stats.extracted += 1;
        if self.stats.extracted % EXTRACTED_LOG_EVERY == 0 {
            info!(
                extracted = self.stats.extracted,
                title = %truncate_for_log(&article.title, 30),
                "Saved articles"
            );
        }
        self.articles.push(article);
        Ok(())
    }
}
