//! Zip archive of a run's output files.
//!
//! Entries are named by their path relative to the output directory,
//! sorted, and stamped with a fixed modification time, so the same set of
//! files always produces the same archive bytes.

use crate::error::{CrawlError, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Bundle `files` into a zip at `dest`.
///
/// # Arguments
///
/// * `files` - Files to store; order and repeats do not matter
/// * `base` - Directory entry names are made relative to. Files outside it
///   are stored under their file name.
/// * `dest` - Archive path; parent directories are created
///
/// # Returns
///
/// The archive path.
///
/// # Errors
///
/// Returns [`CrawlError::Io`] if a source file cannot be read or the
/// archive cannot be created, and [`CrawlError::Archive`] on zip failures.
#[instrument(level = "info", skip_all, fields(dest = %dest.display(), files = files.len()))]
pub fn create_archive(files: &[PathBuf], base: &Path, dest: &Path) -> Result<PathBuf> {
    let mut entries: Vec<(String, &PathBuf)> = files.iter().map(|f| (entry_name(f, base), f)).collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries.dedup_by(|a, b| a.0 == b.0);

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CrawlError::io(parent, e))?;
    }
    let out = File::create(dest).map_err(|e| CrawlError::io(dest, e))?;
    let mut zip = ZipWriter::new(out);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(0o644);

    for (name, path) in &entries {
        zip.start_file(name.as_str(), options)?;
        let mut src = File::open(path).map_err(|e| CrawlError::io(path.as_path(), e))?;
        io::copy(&mut src, &mut zip).map_err(|e| CrawlError::io(path.as_path(), e))?;
    }
    zip.finish()?;

    info!(entries = entries.len(), "Wrote archive");
    Ok(dest.to_path_buf())
}

/// Names of the entries stored in an archive, in archive order.
///
/// # Errors
///
/// Returns [`CrawlError::Io`] if the file cannot be opened, and
/// [`CrawlError::Archive`] if it is not a readable zip.
pub fn list_archive(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| CrawlError::io(path, e))?;
    let mut archive = ZipArchive::new(file)?;
    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        names.push(archive.by_index(i)?.name().to_string());
    }
    Ok(names)
}

fn entry_name(file: &Path, base: &Path) -> String {
    match file.strip_prefix(base) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}
