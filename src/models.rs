//! Data models for crawled pages and extracted articles.
//!
//! - [`PageResult`]: what the fetcher returned for one URL
//! - [`Article`]: an article record extracted from a page
//! - [`Dataset`]: the per-run JSON document wrapping all articles
//! - [`CrawlStats`] and [`WriteResult`]: what a run reports back

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The outcome of fetching one URL during a crawl.
#[derive(Debug, Clone)]
pub struct PageResult {
    /// The URL that was requested (fragment stripped).
    pub url: String,
    /// Link distance from the seed; seeds are depth 0.
    pub depth: usize,
    /// HTTP status, when a response arrived at all.
    pub status: Option<u16>,
    /// Page markup on success.
    pub html: Option<String>,
    /// Failure message when the page could not be fetched.
    pub error: Option<String>,
}

impl PageResult {
    pub fn success(&self) -> bool {
        self.html.is_some()
    }
}

/// A news article extracted from a single page.
///
/// The URL is the record's only identity. Records are never mutated after
/// extraction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    /// The page the article was extracted from.
    pub url: String,
    /// The headline; empty when the page only carried a body.
    pub title: String,
    /// Body text, one paragraph per line.
    pub content: String,
    /// Publication date as written in the page metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// RFC 3339 local time of extraction.
    pub crawl_time: String,
    /// Length of `content` in characters.
    pub content_length: usize,
}

/// The JSON document written at the end of a run.
#[derive(Debug, Deserialize, Serialize)]
pub struct Dataset {
    /// The seed URL the run started from.
    pub source: String,
    /// RFC 3339 local time the dataset was written.
    pub crawl_date: String,
    pub total_articles: usize,
    pub articles: Vec<Article>,
}

/// Counters accumulated over one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlStats {
    /// Pages fetched, successful or not.
    pub pages: usize,
    /// Article records extracted.
    pub extracted: usize,
    /// Article pages skipped because their URL was already extracted.
    pub skipped_duplicates: usize,
    /// Pages whose fetch failed.
    pub failed: usize,
}

/// Everything a run wrote to disk.
#[derive(Debug, Default)]
pub struct WriteResult {
    /// Text files, one per titled article, in write order (deduplicated).
    pub text_files: Vec<PathBuf>,
    /// The JSON dataset, absent when nothing new was extracted.
    pub dataset_file: Option<PathBuf>,
    /// The zip archive, when one was requested and there was something to bundle.
    pub archive: Option<PathBuf>,
    pub stats: CrawlStats,
}

impl WriteResult {
    /// All files written by the run, archive excluded.
    pub fn written_files(&self) -> Vec<PathBuf> {
        self.text_files
            .iter()
            .cloned()
            .chain(self.dataset_file.iter().cloned())
            .collect()
    }
}
