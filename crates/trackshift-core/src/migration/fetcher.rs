//! Drains a paginated saved-tracks collection into a complete list.

use std::time::Duration;

use tracing::debug;

use crate::error::Result;
use crate::session::AccountSession;
use crate::spotify::{SpotifyClient, Track, MAX_PAGE_LIMIT};

/// Default page size; the provider's per-page maximum.
pub const PAGE_SIZE: u64 = MAX_PAGE_LIMIT;

/// Fixed pause between page requests, independent of response time, to
/// stay under the provider's rate budget.
const PAGE_DELAY: Duration = Duration::from_millis(100);

/// Incremental fetch progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchProgress {
    /// Tracks accumulated so far.
    pub current: usize,
    /// Collection size as reported by the remote side.
    pub total: u64,
}

/// Fetch the entire saved-tracks collection for `session`.
///
/// Requests pages at offsets 0, `page_size`, 2*`page_size`, … and invokes
/// `on_progress` after every page. Stops when the provider reports no
/// further page or the accumulated count reaches the reported total,
/// whichever comes first. Failures propagate immediately; per-request
/// retry lives in the transport beneath each page request.
pub async fn fetch_all(
    client: &SpotifyClient,
    session: &AccountSession,
    page_size: u64,
    mut on_progress: impl FnMut(FetchProgress),
) -> Result<Vec<Track>> {
    let mut tracks: Vec<Track> = Vec::new();
    let mut offset = 0u64;

    loop {
        let page = client.saved_tracks_page(session, offset, page_size).await?;
        let total = page.total;
        tracks.extend(page.items);

        on_progress(FetchProgress {
            current: tracks.len(),
            total,
        });

        if !page.has_next || tracks.len() as u64 >= total {
            break;
        }
        offset += page_size;
        tokio::time::sleep(PAGE_DELAY).await;
    }

    debug!(account = %session.account, count = tracks.len(), "saved-tracks fetch complete");
    Ok(tracks)
}
