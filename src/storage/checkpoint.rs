//! Checkpoint file for the visited registry
//!
//! # Layout
//!
//! The magic is followed by a bincode record (fixed-width little-endian
//! integers).
//!
//! | field   | size    | value                          |
//! |---------|---------|--------------------------------|
//! | magic   | 4       | `SHCK`                         |
//! | version | 1       | `1`                            |
//! | count   | 8 (u64) | number of records              |
//! | record  | 8 + n   | URL byte length, UTF-8 bytes   |
//!
//! Each save overwrites the whole file; checkpoints are never merged.

use crate::storage::traits::{StorageError, StorageResult};
use crate::MAX_URL_LENGTH;
use bincode::Options;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const MAGIC: &[u8; 4] = b"SHCK";
const VERSION: u8 = 1;

/// Fixed-width part of the record: version byte plus the record count
const RECORD_HEADER_LEN: u64 = 1 + 8;

/// Serialized body following the magic
#[derive(Debug, Serialize, Deserialize)]
struct CheckpointFile<'a> {
    version: u8,
    urls: Cow<'a, [String]>,
}

/// Reads and writes registry snapshots at a fixed path
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,

    /// Largest record count accepted on load
    max_entries: usize,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        Self {
            path: path.into(),
            max_entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a snapshot, replacing any previous checkpoint
    ///
    /// The data goes to a sibling temp file first and is renamed into place,
    /// so a crash mid-write leaves the previous checkpoint intact.
    pub fn save(&self, urls: &[String]) -> StorageResult<()> {
        let bytes = encode(urls)?;
        let tmp = self.temp_path();

        fs::write(&tmp, &bytes).map_err(|e| StorageError::io(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                tracing::debug!("Failed to remove {}: {}", tmp.display(), cleanup);
            }
            return Err(StorageError::io(&self.path, e));
        }

        tracing::info!(
            "Saved checkpoint with {} URLs to {}",
            urls.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Loads the checkpoint, if there is a usable one
    ///
    /// A missing, unreadable or malformed file yields `None`, meaning a fresh
    /// start. This never fails.
    pub fn load(&self) -> Option<Vec<String>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No checkpoint at {}", self.path.display());
                return None;
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to read checkpoint {}: {}",
                    self.path.display(),
                    e
                );
                return None;
            }
        };

        match decode(&bytes, self.max_entries) {
            Ok(urls) => {
                tracing::debug!(
                    "Loaded checkpoint with {} URLs from {}",
                    urls.len(),
                    self.path.display()
                );
                Some(urls)
            }
            Err(e) => {
                tracing::warn!("Ignoring checkpoint {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Removes the checkpoint after a run that finished without interruption
    pub fn clear(&self) -> StorageResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!("Removed checkpoint {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(&self.path, e)),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

fn options(max_entries: usize) -> impl Options {
    let per_record = 8 + MAX_URL_LENGTH as u64;
    let limit = (max_entries as u64)
        .saturating_mul(per_record)
        .saturating_add(RECORD_HEADER_LEN);

    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(limit)
        .reject_trailing_bytes()
}

/// Serializes an ordered URL list into the checkpoint layout
pub fn encode(urls: &[String]) -> StorageResult<Vec<u8>> {
    if let Some(url) = urls.iter().find(|u| u.len() > MAX_URL_LENGTH) {
        return Err(StorageError::Malformed(format!(
            "URL of {} bytes exceeds {} bytes",
            url.len(),
            MAX_URL_LENGTH
        )));
    }

    let record = CheckpointFile {
        version: VERSION,
        urls: Cow::Borrowed(urls),
    };
    let body = options(urls.len()).serialize(&record)?;

    let mut out = Vec::with_capacity(MAGIC.len() + body.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Parses the checkpoint layout back into an ordered URL list
///
/// Input larger than `max_entries` maximal records is refused before any
/// record is allocated.
pub fn decode(bytes: &[u8], max_entries: usize) -> StorageResult<Vec<String>> {
    let body = bytes
        .strip_prefix(MAGIC.as_slice())
        .ok_or_else(|| StorageError::Malformed("bad magic".to_string()))?;

    let record: CheckpointFile<'static> = options(max_entries).deserialize(body)?;

    if record.version != VERSION {
        return Err(StorageError::Malformed(format!(
            "unsupported version {}",
            record.version
        )));
    }

    let urls = record.urls.into_owned();
    if urls.len() > max_entries {
        return Err(StorageError::Malformed(format!(
            "{} records exceeds capacity {}",
            urls.len(),
            max_entries
        )));
    }

    if let Some(index) = urls.iter().position(|u| u.len() > MAX_URL_LENGTH) {
        return Err(StorageError::Malformed(format!(
            "record {} is {} bytes, limit is {}",
            index,
            urls[index].len(),
            MAX_URL_LENGTH
        )));
    }

    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::VisitedRegistry;
    use tempfile::TempDir;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn store_in(dir: &TempDir) -> CheckpointStore {
        CheckpointStore::new(dir.path().join("crawler_state.dat"), 100)
    }

    #[test]
    fn test_save_then_load_preserves_order_and_count() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let snapshot = urls(&[
            "https://www.skysports.com/football",
            "https://www.bbc.com/sport/football",
            "https://example.com/?b=2&a=1",
        ]);

        store.save(&snapshot).unwrap();
        assert_eq!(store.load(), Some(snapshot));
    }

    #[test]
    fn test_empty_snapshot_is_found() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save(&[]).unwrap();
        assert_eq!(store.load(), Some(vec![]));
    }

    #[test]
    fn test_save_overwrites_previous() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save(&urls(&["https://a.com/", "https://b.com/"])).unwrap();
        store.save(&urls(&["https://c.com/"])).unwrap();

        assert_eq!(store.load(), Some(urls(&["https://c.com/"])));
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store_in(&dir).load(), None);
    }

    #[test]
    fn test_garbage_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), b"definitely not a checkpoint").unwrap();

        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_save_into_missing_directory_fails_without_panicking() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::new(dir.path().join("missing/state.dat"), 10);

        let result = store.save(&urls(&["https://a.com/"]));
        assert!(matches!(result, Err(StorageError::Io { .. })));
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save(&urls(&["https://a.com/"])).unwrap();
        store.clear().unwrap();
        assert!(!store.path().exists());

        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_layout() {
        let bytes = encode(&urls(&["ab"])).unwrap();
        assert_eq!(
            bytes,
            b"SHCK\x01\x01\x00\x00\x00\x00\x00\x00\x00\x02\x00\x00\x00\x00\x00\x00\x00ab".to_vec()
        );
    }

    /// Magic, version, count, then one record with the given length prefix
    fn single_record(len: u64, data: &[u8]) -> Vec<u8> {
        let mut bytes = b"SHCK\x01".to_vec();
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.extend_from_slice(&len.to_le_bytes());
        bytes.extend_from_slice(data);
        bytes
    }

    #[test]
    fn test_decode_rejects_truncated_input() {
        let bytes = encode(&urls(&["https://a.com/", "https://b.com/"])).unwrap();
        for cut in 0..bytes.len() {
            assert!(decode(&bytes[..cut], 100).is_err(), "accepted cut at {}", cut);
        }
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let mut bytes = encode(&urls(&["https://a.com/"])).unwrap();
        bytes.push(0);
        assert!(decode(&bytes, 100).is_err());
    }

    #[test]
    fn test_decode_rejects_wrong_version() {
        let mut bytes = encode(&urls(&["https://a.com/"])).unwrap();
        bytes[4] = 2;
        assert!(decode(&bytes, 100).is_err());
    }

    #[test]
    fn test_decode_rejects_count_over_capacity() {
        let bytes = encode(&urls(&["https://a.com/", "https://b.com/"])).unwrap();
        assert!(decode(&bytes, 1).is_err());
        assert!(decode(&bytes, 2).is_ok());
    }

    #[test]
    fn test_decode_rejects_oversized_record() {
        let data = vec![b'a'; MAX_URL_LENGTH + 1];
        let bytes = single_record(data.len() as u64, &data);
        assert!(decode(&bytes, 100).is_err());
    }

    #[test]
    fn test_decode_rejects_huge_length_prefix() {
        let bytes = single_record(1 << 40, b"abc");
        assert!(matches!(decode(&bytes, 100), Err(StorageError::Encoding(_))));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let bytes = single_record(2, b"\xff\xfe");
        assert!(decode(&bytes, 100).is_err());
    }

    #[test]
    fn test_registry_at_capacity_survives_save_and_restore() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crawler_state.dat");
        let capacity = 5;

        let registry = VisitedRegistry::new(capacity);
        for i in 0..capacity {
            assert!(registry.add(&format!("https://example.com/{}", i)).is_added());
        }
        let snapshot = registry.snapshot();

        let store = CheckpointStore::new(&path, capacity);
        store.save(&snapshot).unwrap();
        let loaded = store.load().unwrap();

        let restored = VisitedRegistry::new(capacity);
        restored.restore(loaded);
        assert_eq!(restored.len(), capacity);
        assert_eq!(restored.snapshot(), snapshot);

        // One record past capacity is not a usable checkpoint
        let mut over = snapshot.clone();
        over.push("https://example.com/extra".to_string());
        CheckpointStore::new(&path, capacity + 1).save(&over).unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        // A non-empty directory at the target path cannot be replaced
        fs::create_dir(store.path()).unwrap();
        fs::write(store.path().join("occupant"), b"x").unwrap();

        let result = store.save(&urls(&["https://a.com/"]));
        assert!(matches!(result, Err(StorageError::Io { .. })));
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_encode_rejects_oversized_url() {
        let long = "a".repeat(MAX_URL_LENGTH + 1);
        assert!(encode(&[long]).is_err());
    }
}
