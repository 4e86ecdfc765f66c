//! Utility functions for file naming, log formatting and output directories.

use crate::error::{CrawlError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Characters that are not allowed in file names on common filesystems.
static FORBIDDEN: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());

/// Longest file stem produced by [`sanitize_filename`], in characters.
pub const MAX_STEM_CHARS: usize = 50;

/// Turn an article title into a file stem.
///
/// Forbidden characters become `_`, and the result is cut to
/// [`MAX_STEM_CHARS`] characters.
///
/// # Arguments
///
/// * `title` - The article headline
///
/// # Returns
///
/// A stem safe to join onto the output directory. Path separators never
/// survive, so the file always lands directly inside that directory.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(sanitize_filename("a/b: c?"), "a_b_ c_");
/// ```
pub fn sanitize_filename(title: &str) -> String {
    FORBIDDEN
        .replace_all(title, "_")
        .chars()
        .take(MAX_STEM_CHARS)
        .collect()
}

/// Truncate a string for logging purposes.
///
/// Strings longer than `max` characters are cut and suffixed with an
/// ellipsis and the number of characters dropped.
///
/// # Arguments
///
/// * `s` - The string to potentially truncate
/// * `max` - Maximum number of characters to keep
///
/// # Returns
///
/// The original string if it is short enough, otherwise the first `max`
/// characters followed by `"…(+N chars)"`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(12), 10), "aaaaaaaaaa…(+2 chars)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let total = s.chars().count();
    if total <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}…(+{} chars)", head, total - max)
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a scratch file.
///
/// # Arguments
///
/// * `path` - The directory to validate
///
/// # Errors
///
/// Returns [`CrawlError::Io`] if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| CrawlError::io(path, e))?;
    let scratch = path.join(".__write_check__");
    match stdfs::File::create(&scratch) {
        Ok(_) => {
            let _ = stdfs::remove_file(&scratch);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(CrawlError::io(path, e)),
    }
}
