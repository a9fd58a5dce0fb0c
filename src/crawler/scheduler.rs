//! Launch scheduling for fetch workers
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore (one permit per worker)
//! - Launch pacing via a token bucket with a burst of one
//! - Abandoning a wait as soon as cancellation is requested

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

type LaunchLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Hands out launch slots to the dispatcher
///
/// A slot is a semaphore permit that the launched worker holds until it
/// finishes, so at most `max_workers` workers are ever outstanding.
/// Consecutive slots are spaced by at least the launch delay.
pub struct Scheduler {
    /// Global semaphore for limiting concurrent workers
    pool: Arc<Semaphore>,

    /// Launch pacing; `None` when the delay is zero
    limiter: Option<LaunchLimiter>,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `max_workers` - Maximum number of outstanding workers
    /// * `launch_delay` - Minimum spacing between launches
    pub fn new(max_workers: usize, launch_delay: Duration) -> Self {
        let limiter = Quota::with_period(launch_delay).map(RateLimiter::direct);

        Self {
            pool: Arc::new(Semaphore::new(max_workers)),
            limiter,
        }
    }

    /// Waits for the next launch slot
    ///
    /// The first slot is available immediately; later ones wait for the
    /// launch delay and for a free worker permit.
    ///
    /// # Returns
    ///
    /// * `Some(permit)` - A worker may be launched; drop the permit when it finishes
    /// * `None` - Cancellation was requested while waiting
    pub async fn next_slot(&self, cancel: &CancellationToken) -> Option<OwnedSemaphorePermit> {
        if let Some(limiter) = &self.limiter {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return None,
                _ = limiter.until_ready() => {}
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            permit = Arc::clone(&self.pool).acquire_owned() => permit.ok(),
        }
    }

    /// Number of workers that could be launched right now
    pub fn available_slots(&self) -> usize {
        self.pool.available_permits()
    }
}
