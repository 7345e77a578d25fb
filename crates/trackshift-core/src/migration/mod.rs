//! The migration pipeline: fetch both libraries, deduplicate, write the
//! difference in batches, summarize.

pub mod dedup;
pub mod engine;
pub mod fetcher;
pub mod writer;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use dedup::unique_against;
pub use engine::{MigrationEngine, MigrationPhase};
pub use fetcher::{fetch_all, FetchProgress};
pub use writer::{write_all, WriteOutcome, WriteProgress};

/// Snapshot emitted while a migration runs. Counts never decrease across
/// successive snapshots of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationProgress {
    pub current: usize,
    pub total: usize,
    pub added: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Terminal accounting for one completed run.
///
/// Invariant: `added + failed == total - skipped`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationSummary {
    pub total: usize,
    pub added: usize,
    pub skipped: usize,
    pub failed: usize,
    pub duration_ms: u64,
    /// Ids of every track in a failed batch, in write order.
    pub failed_track_ids: Vec<String>,
}

/// A timestamped rendering of a summary, for file export by consumers.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub timestamp: DateTime<Utc>,
    pub total_tracks: usize,
    pub added: usize,
    pub skipped: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub failed_track_ids: Vec<String>,
}

impl MigrationReport {
    pub fn from_summary(summary: &MigrationSummary) -> Self {
        Self {
            timestamp: Utc::now(),
            total_tracks: summary.total,
            added: summary.added,
            skipped: summary.skipped,
            failed: summary.failed,
            duration_ms: summary.duration_ms,
            failed_track_ids: summary.failed_track_ids.clone(),
        }
    }
}

/// Cooperative cancellation signal, checked between steps and between
/// chunks. Cancelling mid-write leaves already-written chunks in place;
/// there is no rollback.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
