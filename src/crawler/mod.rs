//! Crawler module for fetching and processing seed URLs
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching into bounded buffers
//! - Launch pacing and worker-pool limiting
//! - Per-URL worker lifecycle
//! - Overall dispatch, cancellation and checkpointing

mod dispatcher;
mod fetcher;
mod scheduler;
mod worker;

pub use dispatcher::{run_harvest, DispatchSummary, Dispatcher};
pub use fetcher::{build_http_client, FetchedContent, Fetcher, HttpFetcher};
pub use scheduler::Scheduler;
pub use worker::{FetchWorker, WorkerOutcome};
