//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `VisitedRegistry`: bounded, mutex-guarded ordered set of visited URLs,
//!   shared by every fetch worker and snapshotted for checkpoints

mod visited;

pub use visited::{InsertOutcome, VisitedRegistry};
