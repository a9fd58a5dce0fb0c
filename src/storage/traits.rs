//! Storage traits and error types
//!
//! This module defines the trait interface for document persistence and
//! the error type shared by the checkpoint and output stores.

use crate::extract::ExtractedDocument;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed checkpoint: {0}")]
    Malformed(String),

    #[error("Checkpoint encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

impl StorageError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Destination for extracted documents
///
/// Implementations must tolerate concurrent calls from several workers.
pub trait DocumentSink: Send + Sync {
    /// Persists the extracted text of one document
    fn persist(&self, document: &ExtractedDocument) -> StorageResult<()>;
}
