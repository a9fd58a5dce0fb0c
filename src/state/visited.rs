//! Bounded registry of visited URLs
//!
//! The registry is the only state shared between fetch workers. Every read
//! and write goes through the same mutex; snapshots are copied out so the
//! lock is never held across checkpoint I/O.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Result of inserting a URL into the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The URL was appended
    Added,

    /// The URL was already present; nothing changed
    Duplicate,

    /// The registry is at capacity; the URL was dropped
    Full,
}

impl InsertOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added)
    }
}

#[derive(Debug, Default)]
struct Entries {
    /// URLs in first-insertion order
    ordered: Vec<String>,

    /// Membership index over `ordered`
    seen: HashSet<String>,
}

/// Ordered, capacity-bounded set of visited URLs
///
/// URLs are stored exactly as given; no normalization is applied, so
/// `https://a.com` and `https://a.com/` are distinct entries.
#[derive(Debug)]
pub struct VisitedRegistry {
    entries: Mutex<Entries>,
    capacity: usize,
}

impl VisitedRegistry {
    /// Creates an empty registry holding at most `capacity` URLs
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Entries::default()),
            capacity,
        }
    }

    /// Records a URL as visited
    ///
    /// Insertion past capacity is dropped without error.
    pub fn add(&self, url: &str) -> InsertOutcome {
        let mut entries = self.lock();

        if entries.seen.contains(url) {
            return InsertOutcome::Duplicate;
        }

        if entries.ordered.len() >= self.capacity {
            tracing::debug!("Visited registry full ({}), dropping {}", self.capacity, url);
            return InsertOutcome::Full;
        }

        entries.seen.insert(url.to_string());
        entries.ordered.push(url.to_string());
        InsertOutcome::Added
    }

    /// Returns whether the URL has been recorded
    pub fn contains(&self, url: &str) -> bool {
        self.lock().seen.contains(url)
    }

    /// Copies the current contents in insertion order
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().ordered.clone()
    }

    /// Replaces the contents wholesale
    ///
    /// Used at startup with a loaded checkpoint, before any worker runs.
    /// Duplicates collapse to their first occurrence and anything past
    /// capacity is dropped.
    pub fn restore(&self, urls: Vec<String>) {
        let mut restored = Entries::default();
        for url in urls {
            if restored.ordered.len() >= self.capacity {
                break;
            }
            if restored.seen.insert(url.clone()) {
                restored.ordered.push(url);
            }
        }
        *self.lock() = restored;
    }

    pub fn len(&self) -> usize {
        self.lock().ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
