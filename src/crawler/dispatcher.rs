//! Dispatcher - launches one worker per seed URL
//!
//! This module contains the main harvest loop, including:
//! - Skipping seeds already recorded in a restored registry
//! - Pacing launches and bounding outstanding workers
//! - Stopping launches on cancellation and joining every launched worker
//! - Saving or clearing the checkpoint once all workers are done

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, Fetcher, HttpFetcher};
use crate::crawler::scheduler::Scheduler;
use crate::crawler::worker::{FetchWorker, WorkerOutcome};
use crate::state::VisitedRegistry;
use crate::storage::{CheckpointStore, DocumentSink, FileSink};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Tally of one dispatcher run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Workers launched
    pub launched: usize,

    /// Seeds skipped because they were already visited
    pub skipped: usize,

    /// Workers that fetched and classified their page
    pub processed: usize,

    /// Workers whose fetch failed
    pub failed: usize,

    /// Workers that abandoned an in-flight fetch on cancellation
    pub aborted: usize,

    /// Whether cancellation was observed
    pub cancelled: bool,

    /// Whether a checkpoint was written
    pub checkpoint_saved: bool,
}

/// Harvest orchestrator
pub struct Dispatcher {
    worker: Arc<FetchWorker>,
    registry: Arc<VisitedRegistry>,
    checkpoint: CheckpointStore,
    scheduler: Scheduler,
    cancel: CancellationToken,
}

impl Dispatcher {
    /// Creates a dispatcher with explicit fetch and persistence backends
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<dyn DocumentSink>,
        registry: Arc<VisitedRegistry>,
        cancel: CancellationToken,
    ) -> Self {
        let crawler = &config.crawler;
        let worker = FetchWorker::new(
            crawler,
            fetcher,
            sink,
            Arc::clone(&registry),
            cancel.clone(),
        );

        Self {
            worker: Arc::new(worker),
            registry,
            checkpoint: CheckpointStore::new(
                &config.output.checkpoint_path,
                crawler.max_visited_urls,
            ),
            scheduler: Scheduler::new(
                crawler.max_concurrent_workers as usize,
                crawler.launch_delay(),
            ),
            cancel,
        }
    }

    /// Creates a dispatcher that fetches over HTTP and writes output files
    ///
    /// # Returns
    ///
    /// * `Ok(Dispatcher)` - Ready to run
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn from_config(
        config: &Config,
        registry: Arc<VisitedRegistry>,
        cancel: CancellationToken,
    ) -> crate::Result<Self> {
        let client = build_http_client(&config.user_agent, config.crawler.request_timeout())?;
        let fetcher = Arc::new(HttpFetcher::new(client));
        let sink = Arc::new(FileSink::new(&config.output.directory));

        Ok(Self::new(config, fetcher, sink, registry, cancel))
    }

    pub fn checkpoint(&self) -> &CheckpointStore {
        &self.checkpoint
    }

    /// Launches a worker for every seed, in order
    ///
    /// Launching stops at the first cancellation observed between launches
    /// or during a wait. Every launched worker is joined before returning.
    /// A cancelled run saves the registry to the checkpoint; an uninterrupted
    /// one removes the checkpoint. Checkpoint I/O failures are logged only.
    pub async fn run(&self, seeds: &[String]) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        let mut workers = JoinSet::new();

        for url in seeds {
            if self.cancel.is_cancelled() {
                tracing::info!("Cancellation requested, no further launches");
                break;
            }

            if self.registry.contains(url) {
                tracing::info!("Skipping already visited {}", url);
                summary.skipped += 1;
                continue;
            }

            let Some(permit) = self.scheduler.next_slot(&self.cancel).await else {
                tracing::info!("Cancellation requested while waiting to launch {}", url);
                break;
            };

            let worker = Arc::clone(&self.worker);
            let url = url.clone();
            tracing::debug!(
                "Launching worker for {} ({} slots left)",
                url,
                self.scheduler.available_slots()
            );

            workers.spawn(async move {
                let outcome = worker.run(url).await;
                drop(permit);
                outcome
            });
            summary.launched += 1;
        }

        tracing::debug!("Waiting for {} workers to finish", workers.len());
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(WorkerOutcome::Processed(_)) => summary.processed += 1,
                Ok(WorkerOutcome::FetchFailed) => summary.failed += 1,
                Ok(WorkerOutcome::Cancelled) => summary.aborted += 1,
                Err(e) => {
                    tracing::error!("Worker task failed: {}", e);
                    summary.failed += 1;
                }
            }
        }

        summary.cancelled = self.cancel.is_cancelled();
        if summary.cancelled {
            match self.checkpoint.save(&self.registry.snapshot()) {
                Ok(()) => summary.checkpoint_saved = true,
                Err(e) => tracing::error!("Failed to save checkpoint: {}", e),
            }
        } else if let Err(e) = self.checkpoint.clear() {
            tracing::warn!("Failed to remove checkpoint: {}", e);
        }

        tracing::info!(
            "Harvest finished: {} launched, {} skipped, {} processed, {} failed, {} aborted",
            summary.launched,
            summary.skipped,
            summary.processed,
            summary.failed,
            summary.aborted
        );
        summary
    }
}

/// Runs a complete harvest
///
/// This is the main entry point for a harvest. It will:
/// 1. Build the HTTP client and output sink
/// 2. Restore the visited registry from the checkpoint unless `fresh`
/// 3. Dispatch the configured seeds
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `fresh` - Ignore any existing checkpoint
/// * `cancel` - Token cancelled on interrupt
pub async fn run_harvest(
    config: &Config,
    fresh: bool,
    cancel: CancellationToken,
) -> crate::Result<DispatchSummary> {
    std::fs::create_dir_all(&config.output.directory)?;

    let registry = Arc::new(VisitedRegistry::new(config.crawler.max_visited_urls));
    let dispatcher = Dispatcher::from_config(config, Arc::clone(&registry), cancel)?;

    if fresh {
        tracing::info!("Starting fresh harvest (ignoring previous checkpoint)");
    } else if let Some(urls) = dispatcher.checkpoint().load() {
        registry.restore(urls);
        tracing::info!(
            "Resuming from checkpoint with {} visited URLs",
            registry.len()
        );
    } else {
        tracing::info!("No checkpoint found, starting from scratch");
    }

    tracing::info!("Dispatching {} seed URLs", config.seeds.len());
    Ok(dispatcher.run(&config.seeds).await)
}
