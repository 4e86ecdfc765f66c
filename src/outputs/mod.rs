//! Output generation: article text files, the JSON dataset and the zip archive.
//!
//! # Submodules
//!
//! - [`text`]: one `.txt` file per titled article, written during the crawl
//! - [`json`]: the per-run dataset, and loading URLs of earlier runs
//! - [`archive`]: bundling a run's files into a single zip
//!
//! # Output Structure
//!
//! ```text
//! nur_articles/
//! ├── <sanitized title>.txt
//! ├── <sanitized title>.txt
//! └── nur_dataset_20240506_093000.json
//!
//! nur_articles.zip           # optional, same files
//! ```

pub mod archive;
pub mod json;
pub mod text;
