//! Per-URL text output files
//!
//! Each URL maps to `output_<hash>.txt` in the output directory. Files are
//! opened in append mode so repeated runs accumulate history.

use crate::extract::ExtractedDocument;
use crate::storage::traits::{DocumentSink, StorageError, StorageResult};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// djb2 string hash over the URL bytes (seed 5381, multiplier 33)
///
/// Stable across runs and platforms; not cryptographic.
pub fn url_hash(url: &str) -> u64 {
    url.bytes().fold(5381u64, |hash, b| {
        (hash << 5).wrapping_add(hash).wrapping_add(u64::from(b))
    })
}

/// Writes extracted text into append-only files under a directory
#[derive(Debug, Clone)]
pub struct FileSink {
    directory: PathBuf,
}

impl FileSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Path of the output file for a URL
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.directory.join(format!("output_{}.txt", url_hash(url)))
    }
}

impl DocumentSink for FileSink {
    fn persist(&self, document: &ExtractedDocument) -> StorageResult<()> {
        let path = self.path_for(&document.url);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StorageError::io(&path, e))?;

        // One write per block keeps concurrent appends from interleaving
        let block = format!(
            "URL: {}\n\nExtracted Text:\n{}\n\n",
            document.url, document.text
        );
        file.write_all(block.as_bytes())
            .map_err(|e| StorageError::io(&path, e))?;

        tracing::debug!("Appended {} bytes to {}", block.len(), path.display());
        Ok(())
    }
}
