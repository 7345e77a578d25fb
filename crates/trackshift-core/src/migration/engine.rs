//! Migration orchestrator.
//!
//! Sequences Fetch(source) → Fetch(destination) → Deduplicate →
//! Batch-Write(unique) → Summarize, strictly one step at a time. Any
//! component failure aborts the remaining steps; there is no partial
//! resume — the caller restarts the whole pipeline.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::info;

use crate::error::{CoreError, Result};
use crate::migration::fetcher::PAGE_SIZE;
use crate::migration::writer::{CHUNK_SIZE, INTER_CHUNK_DELAY};
use crate::migration::{
    fetch_all, unique_against, write_all, CancellationFlag, MigrationProgress, MigrationSummary,
};
use crate::session::{AccountType, SessionStore};
use crate::spotify::SpotifyClient;

/// Pipeline state, advanced strictly forward within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationPhase {
    Idle,
    FetchingSource,
    FetchingDestination,
    Deduplicating,
    Writing,
    Completed,
    Failed,
}

impl MigrationPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            MigrationPhase::Idle => "idle",
            MigrationPhase::FetchingSource => "fetching-source",
            MigrationPhase::FetchingDestination => "fetching-destination",
            MigrationPhase::Deduplicating => "deduplicating",
            MigrationPhase::Writing => "writing",
            MigrationPhase::Completed => "completed",
            MigrationPhase::Failed => "failed",
        }
    }
}

impl fmt::Display for MigrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drives one migration run over an injected client and session store.
pub struct MigrationEngine<'a> {
    client: &'a SpotifyClient,
    cancel: CancellationFlag,
    phase: MigrationPhase,
    chunk_size: usize,
    inter_chunk_delay: Duration,
}

impl<'a> MigrationEngine<'a> {
    pub fn new(client: &'a SpotifyClient) -> Self {
        Self {
            client,
            cancel: CancellationFlag::new(),
            phase: MigrationPhase::Idle,
            chunk_size: CHUNK_SIZE,
            inter_chunk_delay: INTER_CHUNK_DELAY,
        }
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn with_inter_chunk_delay(mut self, delay: Duration) -> Self {
        self.inter_chunk_delay = delay;
        self
    }

    /// A handle consumers may use to cancel the run from a callback or
    /// another task. Checked between steps and between chunks.
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    pub fn phase(&self) -> MigrationPhase {
        self.phase
    }

    /// Run the full pipeline.
    ///
    /// Both sessions are authorized up front (absent → `NotAuthenticated`,
    /// expired → `TokenExpired`) before any remote request. The progress
    /// callback is invoked synchronously between awaited steps; during the
    /// fetch phases `total` is the remote collection size, during the
    /// write phase it is the deduplicated set size.
    pub async fn run(
        &mut self,
        store: &SessionStore,
        mut on_progress: impl FnMut(MigrationProgress),
    ) -> Result<MigrationSummary> {
        let result = self.run_inner(store, &mut on_progress).await;
        self.phase = match &result {
            Ok(_) => MigrationPhase::Completed,
            Err(_) => MigrationPhase::Failed,
        };
        result
    }

    async fn run_inner(
        &mut self,
        store: &SessionStore,
        on_progress: &mut impl FnMut(MigrationProgress),
    ) -> Result<MigrationSummary> {
        let started = Instant::now();

        let source = store.authorized(AccountType::Source)?;
        let destination = store.authorized(AccountType::Destination)?;

        self.enter(MigrationPhase::FetchingSource)?;
        let source_tracks = fetch_all(self.client, source, PAGE_SIZE, |p| {
            on_progress(MigrationProgress {
                current: p.current,
                total: p.total as usize,
                ..MigrationProgress::default()
            });
        })
        .await?;

        self.enter(MigrationPhase::FetchingDestination)?;
        let destination_tracks = fetch_all(self.client, destination, PAGE_SIZE, |p| {
            on_progress(MigrationProgress {
                current: p.current,
                total: p.total as usize,
                ..MigrationProgress::default()
            });
        })
        .await?;

        self.enter(MigrationPhase::Deduplicating)?;
        let unique = unique_against(&source_tracks, &destination_tracks);
        let total = source_tracks.len();
        let skipped = total - unique.len();
        info!(
            unique = unique.len(),
            skipped, "deduplication complete"
        );

        if unique.is_empty() {
            // Nothing to write: short-circuit to a zero-added summary
            // without touching the batch writer.
            return Ok(MigrationSummary {
                total,
                added: 0,
                skipped,
                failed: 0,
                duration_ms: started.elapsed().as_millis() as u64,
                failed_track_ids: Vec::new(),
            });
        }

        self.enter(MigrationPhase::Writing)?;
        let track_ids: Vec<String> = unique.iter().map(|t| t.id.clone()).collect();
        let outcome = write_all(
            self.client,
            destination,
            &track_ids,
            self.chunk_size,
            self.inter_chunk_delay,
            &self.cancel,
            |w| {
                on_progress(MigrationProgress {
                    current: w.current,
                    total: w.total,
                    added: w.added,
                    failed: w.failed,
                    skipped,
                });
            },
        )
        .await?;

        let summary = MigrationSummary {
            total,
            added: outcome.added,
            skipped,
            failed: outcome.failed,
            duration_ms: started.elapsed().as_millis() as u64,
            failed_track_ids: outcome.failed_track_ids,
        };
        info!(
            total = summary.total,
            added = summary.added,
            skipped = summary.skipped,
            failed = summary.failed,
            duration_ms = summary.duration_ms,
            "migration complete"
        );
        Ok(summary)
    }

    fn enter(&mut self, phase: MigrationPhase) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        self.phase = phase;
        info!(phase = %phase, "migration phase");
        Ok(())
    }
}
