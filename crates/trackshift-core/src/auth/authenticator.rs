//! PKCE authenticator: authorization URLs, code exchange, token refresh.
//!
//! The authenticator owns the single pending [`PkceChallenge`] and writes
//! completed sessions into the caller's [`SessionStore`]. Dependencies
//! (HTTP client, profile store) are injected; nothing here is ambient.

use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::auth::pkce::PkceChallenge;
use crate::config::Config;
use crate::error::{AuthError, ConfigError, CoreError, Result, TransportError};
use crate::session::{AccountProfile, AccountSession, AccountType, SessionStore};
use crate::spotify::types::ProfileResponse;
use crate::storage::ProfileStore;

/// Scopes requested for every login: read + modify saved tracks, read email.
const SCOPES: [&str; 3] = ["user-library-read", "user-library-modify", "user-read-email"];

/// Fallback token lifetime when the provider omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Authorization URL plus the CSRF state the callback must echo.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
    pub account: AccountType,
}

/// Result of a completed login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub account: AccountType,
    pub profile: AccountProfile,
}

/// Token response from the provider token endpoint.
#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// PKCE-based OAuth authenticator for the two account slots.
pub struct Authenticator {
    config: Config,
    http: reqwest::Client,
    pending: Option<PkceChallenge>,
    profiles: Option<ProfileStore>,
}

impl Authenticator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            pending: None,
            profiles: None,
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Report successful logins to a durable profile store.
    ///
    /// The store is write-only from the authenticator's perspective; upsert
    /// failures are logged and do not fail the login.
    #[must_use]
    pub fn with_profile_store(mut self, profiles: ProfileStore) -> Self {
        self.profiles = Some(profiles);
        self
    }

    /// Begin an authorization flow for `account`.
    ///
    /// Generates a fresh verifier/challenge/state triple, stores it as the
    /// single pending challenge (replacing any earlier one), and returns
    /// the fully-formed authorization URL.
    ///
    /// # Errors
    /// Returns a configuration error if the configured authorization
    /// endpoint is not a valid URL.
    pub fn begin_authorization(&mut self, account: AccountType) -> Result<AuthorizationRequest> {
        let challenge = PkceChallenge::generate(account);

        let mut url = Url::parse(&self.config.auth_url).map_err(|e| ConfigError::InvalidValue {
            key: "auth_url",
            message: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("code_challenge_method", "S256")
            .append_pair("code_challenge", &challenge.code_challenge())
            .append_pair("state", &challenge.state)
            .append_pair("scope", &SCOPES.join(" "));

        info!(%account, "authorization flow initiated");

        let request = AuthorizationRequest {
            url: url.into(),
            state: challenge.state.clone(),
            account,
        };
        self.pending = Some(challenge);
        Ok(request)
    }

    /// Complete an authorization flow from the provider callback.
    ///
    /// The pending challenge is consumed on entry, success or failure, so a
    /// second callback with the same state always fails. The CSRF check
    /// happens before any network call.
    ///
    /// # Errors
    /// `CsrfMismatch` if no challenge is pending or the state differs;
    /// `InvalidAuthorizationCode` if the provider rejects the exchange.
    pub async fn complete_authorization(
        &mut self,
        store: &mut SessionStore,
        code: &str,
        state: &str,
    ) -> Result<LoginOutcome> {
        // One-time use: consumed before validation so even a failed
        // callback burns the challenge.
        let challenge = self.pending.take().ok_or(AuthError::CsrfMismatch)?;

        if challenge.state.as_bytes() != state.as_bytes() {
            warn!(account = %challenge.account, "state mismatch on callback");
            return Err(AuthError::CsrfMismatch.into());
        }

        let account = challenge.account;
        let tokens = self.exchange_code(code, &challenge.code_verifier).await?;
        let profile = self.fetch_profile(&tokens.access_token).await?;

        let session = AccountSession {
            account,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at: Utc::now()
                + Duration::seconds(tokens.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS)),
            profile: profile.clone(),
        };
        store.set(session);

        if let Some(profiles) = &self.profiles {
            if let Err(e) = profiles.upsert(account, &profile) {
                warn!(%account, error = %e, "profile upsert failed");
            }
        }

        info!(%account, user = %profile.id, "authorization completed");
        Ok(LoginOutcome { account, profile })
    }

    /// Refresh the access token for an existing session.
    ///
    /// Updates the session in place, retaining the prior refresh token when
    /// the provider does not issue a new one.
    ///
    /// # Errors
    /// `NoRefreshToken` if no session with a refresh token exists;
    /// `InvalidRefreshToken` if the provider rejects the exchange.
    pub async fn refresh_access_token(
        &self,
        store: &mut SessionStore,
        account: AccountType,
    ) -> Result<()> {
        let refresh_token = store
            .get(account)
            .and_then(|s| s.refresh_token.clone())
            .ok_or(AuthError::NoRefreshToken { account })?;

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(TransportError::from)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            if (400..500).contains(&status) {
                return Err(AuthError::InvalidRefreshToken(detail).into());
            }
            return Err(TransportError::from_status(status, detail, None).into());
        }

        let tokens: TokenResponse = response.json().await.map_err(TransportError::from)?;

        // get_mut cannot fail here: the slot existed above and nothing
        // else touches the store between the two lookups.
        if let Some(session) = store.get_mut(account) {
            session.access_token = tokens.access_token;
            session.refresh_token = tokens.refresh_token.or(Some(refresh_token));
            session.expires_at = Utc::now()
                + Duration::seconds(tokens.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS));
        }

        info!(%account, "access token refreshed");
        Ok(())
    }

    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<TokenResponse> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code_verifier", code_verifier),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(TransportError::from)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            if (400..500).contains(&status) {
                return Err(AuthError::InvalidAuthorizationCode(detail).into());
            }
            return Err(TransportError::from_status(status, detail, None).into());
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| CoreError::Transport(TransportError::from(e)))
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<AccountProfile> {
        let url = format!("{}/me", self.config.api_base);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(TransportError::from)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(TransportError::from_status(status, detail, None).into());
        }

        let raw: ProfileResponse = response.json().await.map_err(TransportError::from)?;
        Ok(raw.into_profile())
    }
}
