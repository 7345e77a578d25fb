//! Batched writes of track ids into the destination library.

use std::time::Duration;

use tracing::warn;

use crate::error::{CoreError, Result};
use crate::migration::CancellationFlag;
use crate::session::AccountSession;
use crate::spotify::{SpotifyClient, MAX_IDS_PER_REQUEST};

/// Default chunk size; the provider's per-write maximum.
pub const CHUNK_SIZE: usize = MAX_IDS_PER_REQUEST;

/// Default pause after every chunk, success or failure, to bound the
/// outbound request rate.
pub const INTER_CHUNK_DELAY: Duration = Duration::from_millis(300);

/// Incremental write progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteProgress {
    /// Ids attempted so far (added + failed).
    pub current: usize,
    pub total: usize,
    pub added: usize,
    pub failed: usize,
}

/// Terminal write accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    pub added: usize,
    pub failed: usize,
    /// Every id from every failed chunk, in write order.
    pub failed_track_ids: Vec<String>,
}

/// Write `track_ids` in contiguous chunks of at most `chunk_size`.
///
/// Accounting is batch-granular: a chunk whose write fails after the
/// transport's retries counts every one of its ids as failed, and a
/// successful chunk counts every id as added. After each chunk the
/// progress callback fires and the inter-chunk delay is slept,
/// unconditionally. The cancellation flag is checked before each chunk;
/// cancelling does not roll back chunks already written.
pub async fn write_all(
    client: &SpotifyClient,
    session: &AccountSession,
    track_ids: &[String],
    chunk_size: usize,
    inter_chunk_delay: Duration,
    cancel: &CancellationFlag,
    mut on_progress: impl FnMut(WriteProgress),
) -> Result<WriteOutcome> {
    let total = track_ids.len();
    let mut outcome = WriteOutcome::default();
    let mut attempted = 0usize;

    for chunk in track_ids.chunks(chunk_size.max(1)) {
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        match client.add_tracks(session, chunk).await {
            Ok(added) => outcome.added += added,
            Err(err) => {
                warn!(
                    chunk_len = chunk.len(),
                    error = %err,
                    "batch write failed, recording whole chunk as failed"
                );
                outcome.failed += chunk.len();
                outcome.failed_track_ids.extend_from_slice(chunk);
            }
        }
        attempted += chunk.len();

        on_progress(WriteProgress {
            current: attempted,
            total,
            added: outcome.added,
            failed: outcome.failed,
        });
        tokio::time::sleep(inter_chunk_delay).await;
    }

    Ok(outcome)
}
