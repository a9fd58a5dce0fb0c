//! Fetch worker - one URL's lifecycle
//!
//! A worker fetches the page, strips the markup, classifies the text,
//! appends it to the URL's output file and records the URL as visited.
//! Every failure is handled here; nothing propagates to the dispatcher.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::Fetcher;
use crate::extract::{classify, strip, Category, ExtractedDocument};
use crate::state::{InsertOutcome, VisitedRegistry};
use crate::storage::DocumentSink;
use crate::FetchError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// How a worker run ended, used for the dispatcher's tally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// Fetched, extracted and classified
    Processed(Category),

    /// The fetch failed; nothing was written
    FetchFailed,

    /// The in-flight fetch was abandoned on cancellation
    Cancelled,
}

/// Shared per-run worker context
///
/// One instance is shared by every launched worker; each call to `run`
/// handles a single URL.
pub struct FetchWorker {
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn DocumentSink>,
    registry: Arc<VisitedRegistry>,
    cancel: CancellationToken,
    raw_capacity: usize,
    text_capacity: usize,
    abort_in_flight: bool,
}

impl FetchWorker {
    pub fn new(
        config: &CrawlerConfig,
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<dyn DocumentSink>,
        registry: Arc<VisitedRegistry>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            fetcher,
            sink,
            registry,
            cancel,
            raw_capacity: config.raw_buffer_capacity,
            text_capacity: config.text_buffer_capacity(),
            abort_in_flight: config.abort_in_flight,
        }
    }

    /// Processes one URL
    ///
    /// The worker owns `url`; it is released on every return path.
    pub async fn run(&self, url: String) -> WorkerOutcome {
        let fetched = tokio::select! {
            result = self.fetcher.fetch(&url, self.raw_capacity) => result,
            _ = self.cancel.cancelled(), if self.abort_in_flight => {
                Err(FetchError::Cancelled { url: url.clone() })
            }
        };

        let mut fetched = match fetched {
            Ok(content) => content,
            Err(FetchError::Cancelled { .. }) => {
                tracing::info!("Abandoned fetch of {} on cancellation", url);
                return WorkerOutcome::Cancelled;
            }
            Err(e) => {
                tracing::error!("Fetch failed: {}", e);
                return WorkerOutcome::FetchFailed;
            }
        };

        tracing::info!("Downloaded: {}", url);
        if fetched.truncated {
            tracing::warn!(
                "Content of {} truncated at {} bytes",
                url,
                self.raw_capacity
            );
            trim_partial_char(&mut fetched.body);
        }

        let raw = String::from_utf8_lossy(&fetched.body);
        tracing::trace!("Raw content for {}:\n{}", url, raw);

        let stripped = strip(&raw, self.text_capacity);
        if stripped.truncated {
            tracing::warn!(
                "Extracted text of {} truncated at {} bytes",
                url,
                self.text_capacity
            );
        }

        let category = classify(&stripped.text);
        let document = ExtractedDocument {
            url,
            raw_content: fetched.body,
            text: stripped.text,
            category,
        };

        if let Err(e) = self.sink.persist(&document) {
            tracing::warn!("Failed to save text for {}: {}", document.url, e);
        }

        tracing::info!("Classified: {} as {}", document.url, category);

        match self.registry.add(&document.url) {
            InsertOutcome::Added => tracing::debug!("Marked {} visited", document.url),
            InsertOutcome::Duplicate => {
                tracing::debug!("{} was already marked visited", document.url)
            }
            InsertOutcome::Full => {}
        }

        WorkerOutcome::Processed(category)
    }
}

/// Drops a multi-byte character cut in half at the end of a truncated body
fn trim_partial_char(body: &mut Vec<u8>) {
    if let Err(e) = std::str::from_utf8(body) {
        // `error_len() == None` means the input ended mid-sequence
        if e.error_len().is_none() {
            body.truncate(e.valid_up_to());
        }
    }
}
