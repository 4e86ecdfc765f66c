//! One text file per article.

use crate::error::{CrawlError, Result};
use crate::models::Article;
use crate::utils::sanitize_filename;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};

/// Write an article as `{title}\n\n{content}` into `dir`.
///
/// The file is named after the sanitized title. An existing file with the
/// same name is replaced, so rerunning over the same pages leaves identical
/// files behind.
///
/// # Arguments
///
/// * `article` - The extracted article
/// * `dir` - Output directory; must already exist
///
/// # Returns
///
/// The path written, or `None` for an article without a title.
///
/// # Errors
///
/// Returns [`CrawlError::Io`] if the file cannot be written.
#[instrument(level = "debug", skip_all, fields(url = %article.url))]
pub async fn write_article_text(article: &Article, dir: &Path) -> Result<Option<PathBuf>> {
    if article.title.is_empty() {
        return Ok(None);
    }

    let path = dir.join(format!("{}.txt", sanitize_filename(&article.title)));
    let body = format!("{}\n\n{}", article.title, article.content);
    fs::write(&path, body)
        .await
        .map_err(|e| CrawlError::io(&path, e))?;
    debug!(path = %path.display(), "Wrote article text");

    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, content: &str) -> Article {
        Article {
            url: "https://www.nur.cn/news/1.shtml".to_string(),
            title: title.to_string(),
            content: content.to_string(),
            publish_date: None,
            category: None,
            author: None,
            crawl_time: "2024-05-06T09:30:00+08:00".to_string(),
            content_length: content.chars().count(),
        }
    }

    #[tokio::test]
    async fn test_writes_title_and_body() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_article_text(&article("Example", "Hello news"), tmp.path())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(path, tmp.path().join("Example.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Example\n\nHello news");
    }

    #[tokio::test]
    async fn test_untitled_article_is_not_written() {
        let tmp = tempfile::tempdir().unwrap();
        let written = write_article_text(&article("", "body"), tmp.path()).await.unwrap();

        assert!(written.is_none());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unsafe_title_stays_inside_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_article_text(&article("../etc/passwd?", "x"), tmp.path())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(path.parent().unwrap(), tmp.path());
        assert_eq!(path.file_name().unwrap(), ".._etc_passwd_.txt");
    }

    #[tokio::test]
    async fn test_missing_dir_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = write_article_text(&article("T", "x"), &tmp.path().join("missing"))
            .await
            .unwrap_err();

        assert!(matches!(err, CrawlError::Io { .. }));
    }
}
