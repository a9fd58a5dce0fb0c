//! Storage module for persisting crawl data
//!
//! This module handles everything the crawler writes to disk:
//! - The visited-URL checkpoint used to resume interrupted runs
//! - Per-URL output files holding the extracted text

mod checkpoint;
mod output;
mod traits;

pub use checkpoint::{decode, encode, CheckpointStore};
pub use output::{url_hash, FileSink};
pub use traits::{DocumentSink, StorageError, StorageResult};
