//! The per-run JSON dataset.
//!
//! Each run that extracts at least one article writes
//! `nur_dataset_{YYYYmmdd_HHMMSS}.json` into the output directory. Later runs
//! read every such file back to learn which URLs were already extracted.

use crate::error::{CrawlError, Result};
use crate::models::{Article, Dataset};
use chrono::{DateTime, Local, SecondsFormat};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// File name of the dataset written at `now`.
///
/// # Examples
///
/// ```ignore
/// // 2024-05-06 09:03:07 local time
/// assert_eq!(dataset_filename(&now), "nur_dataset_20240506_090307.json");
/// ```
pub fn dataset_filename(now: &DateTime<Local>) -> String {
    format!("nur_dataset_{}.json", now.format("%Y%m%d_%H%M%S"))
}

/// Write all articles of a run as one pretty-printed JSON document.
///
/// # Arguments
///
/// * `articles` - Articles extracted by this run, in crawl order
/// * `source` - The seed URL, recorded as the dataset's `source`
/// * `dir` - Output directory; must already exist
///
/// # Returns
///
/// The path of the dataset file, or `None` when `articles` is empty and
/// nothing was written.
///
/// # Errors
///
/// Returns [`CrawlError::Json`] if serialization fails, or
/// [`CrawlError::Io`] if the file cannot be written.
#[instrument(level = "info", skip_all, fields(dir = %dir.display(), count = articles.len()))]
pub async fn write_dataset(articles: &[Article], source: &str, dir: &Path) -> Result<Option<PathBuf>> {
    if articles.is_empty() {
        warn!("No new articles; dataset not written");
        return Ok(None);
    }

    let now = Local::now();
    let dataset = Dataset {
        source: source.to_string(),
        crawl_date: now.to_rfc3339_opts(SecondsFormat::Secs, false),
        total_articles: articles.len(),
        articles: articles.to_vec(),
    };
    let json = serde_json::to_string_pretty(&dataset)?;

    let path = dir.join(dataset_filename(&now));
    fs::write(&path, json)
        .await
        .map_err(|e| CrawlError::io(&path, e))?;
    info!(path = %path.display(), "Wrote dataset");

    Ok(Some(path))
}

/// Only the part of a dataset needed to skip known URLs.
#[derive(Deserialize)]
struct KnownUrls {
    articles: Vec<KnownArticle>,
}

#[derive(Deserialize)]
struct KnownArticle {
    url: String,
}

/// Collect article URLs from every `*.json` dataset in `dir`.
///
/// # Arguments
///
/// * `dir` - Output directory of earlier runs
///
/// # Returns
///
/// The URLs of every article recorded there. Files that cannot be read or
/// do not look like a dataset are ignored, and a missing directory yields
/// an empty set.
///
/// # Errors
///
/// Returns [`CrawlError::Io`] if the directory exists but cannot be listed.
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub async fn load_existing_urls(dir: &Path) -> Result<HashSet<String>> {
    let mut urls = HashSet::new();
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(urls),
        Err(e) => return Err(CrawlError::io(dir, e)),
    };

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| CrawlError::io(dir, e))?
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let parsed = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<KnownUrls>(&bytes).ok(),
            Err(_) => None,
        };
        match parsed {
            Some(known) => urls.extend(known.articles.into_iter().map(|a| a.url)),
            None => debug!(path = %path.display(), "Ignoring unreadable dataset"),
        }
    }

    info!(count = urls.len(), "Loaded previously extracted URLs");
    Ok(urls)
}
