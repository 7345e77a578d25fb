//! Typed client for the provider's saved-tracks endpoints.
//!
//! One method per remote operation, each routed through the retrying
//! transport. The caller supplies a live [`AccountSession`]; expiry is
//! checked at the session store, not here.

use std::time::Duration;

use tracing::debug;

use crate::config::Config;
use crate::error::{Result, TransportError, ValidationError};
use crate::session::{AccountProfile, AccountSession};
use crate::spotify::types::{ProfileResponse, SavedTracksPage, SavedTracksResponse};
use crate::transport::{retry_with_backoff, RetryPolicy};

/// The provider accepts at most 50 items per page and per write.
pub const MAX_PAGE_LIMIT: u64 = 50;
pub const MAX_IDS_PER_REQUEST: usize = 50;

/// Provider API client shared by the fetcher, writer, and orchestrator.
pub struct SpotifyClient {
    http: reqwest::Client,
    config: Config,
    read_policy: RetryPolicy,
    write_policy: RetryPolicy,
}

impl SpotifyClient {
    pub fn new(config: Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            read_policy: RetryPolicy::default(),
            write_policy: RetryPolicy::write(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Override both retry budgets. Tests use tight budgets and delays.
    #[must_use]
    pub fn with_retry_policies(mut self, read: RetryPolicy, write: RetryPolicy) -> Self {
        self.read_policy = read;
        self.write_policy = write;
        self
    }

    /// Fetch the profile for the session's account.
    pub async fn profile(&self, session: &AccountSession) -> Result<AccountProfile> {
        let url = format!("{}/me", self.config.api_base);
        let raw: ProfileResponse = retry_with_backoff(self.read_policy, || {
            let request = self.http.get(&url).bearer_auth(&session.access_token);
            async move { decode_json(request.send().await?).await }
        })
        .await?;
        Ok(raw.into_profile())
    }

    /// Fetch one page of the saved-tracks collection at `offset`.
    ///
    /// `limit` is capped at the provider maximum of 50.
    pub async fn saved_tracks_page(
        &self,
        session: &AccountSession,
        offset: u64,
        limit: u64,
    ) -> Result<SavedTracksPage> {
        let limit = limit.min(MAX_PAGE_LIMIT);
        let url = format!("{}/me/tracks", self.config.api_base);
        let raw: SavedTracksResponse = retry_with_backoff(self.read_policy, || {
            let request = self
                .http
                .get(&url)
                .query(&[("offset", offset), ("limit", limit)])
                .bearer_auth(&session.access_token);
            async move { decode_json(request.send().await?).await }
        })
        .await?;

        debug!(
            account = %session.account,
            offset,
            limit,
            total = raw.total,
            returned = raw.items.len(),
            "fetched saved-tracks page"
        );
        Ok(raw.into_page())
    }

    /// Save up to 50 tracks to the session's library in one write.
    ///
    /// Returns the number of ids written.
    pub async fn add_tracks(&self, session: &AccountSession, track_ids: &[String]) -> Result<usize> {
        validate_ids(track_ids)?;

        let url = format!("{}/me/tracks", self.config.api_base);
        let body = serde_json::json!({ "ids": track_ids });
        retry_with_backoff(self.write_policy, || {
            let request = self
                .http
                .put(&url)
                .bearer_auth(&session.access_token)
                .json(&body);
            async move {
                ensure_success(request.send().await?).await?;
                Ok(())
            }
        })
        .await?;

        debug!(account = %session.account, count = track_ids.len(), "added tracks");
        Ok(track_ids.len())
    }

    /// Check which of up to 50 tracks are already saved.
    ///
    /// Returns one flag per id, in the input order.
    pub async fn check_saved(
        &self,
        session: &AccountSession,
        track_ids: &[String],
    ) -> Result<Vec<bool>> {
        validate_ids(track_ids)?;

        let url = format!("{}/me/tracks/contains", self.config.api_base);
        let ids = track_ids.join(",");
        let saved: Vec<bool> = retry_with_backoff(self.read_policy, || {
            let request = self
                .http
                .get(&url)
                .query(&[("ids", ids.as_str())])
                .bearer_auth(&session.access_token);
            async move { decode_json(request.send().await?).await }
        })
        .await?;
        Ok(saved)
    }
}

fn validate_ids(track_ids: &[String]) -> Result<(), ValidationError> {
    if track_ids.is_empty() {
        return Err(ValidationError::EmptyTrackIds);
    }
    if track_ids.len() > MAX_IDS_PER_REQUEST {
        return Err(ValidationError::TooManyTrackIds {
            len: track_ids.len(),
            max: MAX_IDS_PER_REQUEST,
        });
    }
    Ok(())
}

/// Map a non-success response into the transport taxonomy, honoring a
/// `Retry-After` wait hint on throttling responses.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs);
    let detail = response.text().await.unwrap_or_default();
    Err(TransportError::from_status(status, detail, retry_after))
}

async fn decode_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, TransportError> {
    let response = ensure_success(response).await?;
    response.json::<T>().await.map_err(TransportError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_id_list_is_rejected() {
        assert!(matches!(
            validate_ids(&[]),
            Err(ValidationError::EmptyTrackIds)
        ));
    }

    #[test]
    fn oversized_id_list_is_rejected() {
        let ids: Vec<String> = (0..51).map(|i| format!("t{i}")).collect();
        assert!(matches!(
            validate_ids(&ids),
            Err(ValidationError::TooManyTrackIds { len: 51, max: 50 })
        ));
    }

    #[test]
    fn full_batch_is_accepted() {
        let ids: Vec<String> = (0..50).map(|i| format!("t{i}")).collect();
        assert!(validate_ids(&ids).is_ok());
    }
}
