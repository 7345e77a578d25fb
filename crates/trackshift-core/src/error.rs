//! Core error types for trackshift-core.
//!
//! The taxonomy is closed: every failure the library can surface is one
//! variant of one of the enums below, grouped by the component that raises
//! it and funneled through [`CoreError`].

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::session::AccountType;

/// Core error type for trackshift-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// OAuth/PKCE authorization errors
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Session slot errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Remote transport errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Request-shape validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Startup configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Profile store errors
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Migration aborted via the cancellation signal
    #[error("Migration cancelled")]
    Cancelled,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// OAuth/PKCE-specific errors.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Account label is not "source" or "destination"
    #[error("Invalid account type '{0}'. Must be \"source\" or \"destination\"")]
    InvalidAccountType(String),

    /// No pending challenge, or the callback state does not match it
    #[error("State parameter does not match the pending authorization request")]
    CsrfMismatch,

    /// Provider rejected the authorization code exchange
    #[error("Invalid authorization code: {0}")]
    InvalidAuthorizationCode(String),

    /// Refresh was requested for a session without a refresh token
    #[error("No refresh token available for {account} account. Login again")]
    NoRefreshToken { account: AccountType },

    /// Provider rejected the refresh token exchange
    #[error("Invalid refresh token: {0}. Login again")]
    InvalidRefreshToken(String),
}

/// Session slot errors.
///
/// `NotAuthenticated` (absent slot) and `TokenExpired` (present but stale)
/// are deliberately distinct: only the latter can be repaired by a refresh.
#[derive(Error, Debug)]
pub enum SessionError {
    /// No session exists for the account
    #[error("Not authenticated with {account} account. Login first")]
    NotAuthenticated { account: AccountType },

    /// Session exists but its access token has expired
    #[error("Access token expired for {account} account. Refresh it")]
    TokenExpired { account: AccountType },
}

/// Remote transport errors, classified for the retry layer.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Provider throttled the request (429), optionally with a wait hint
    #[error("Rate limited by provider")]
    RateLimited { retry_after: Option<Duration> },

    /// Network failure or provider 5xx
    #[error("Transient transport failure: {0}")]
    Transient(String),

    /// Provider refused the operation outright (403)
    #[error("Insufficient permissions for the requested operation")]
    PermissionDenied,

    /// Provider rejected the request shape (other 4xx)
    #[error("Provider rejected request ({status}): {detail}")]
    InvalidRequest { status: u16, detail: String },
}

impl TransportError {
    /// Whether the retry layer may attempt this call again.
    ///
    /// Permanent client errors fail immediately instead of burning the
    /// retry budget.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::RateLimited { .. } | TransportError::Transient(_)
        )
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, detail: String, retry_after: Option<Duration>) -> Self {
        match status {
            429 => TransportError::RateLimited { retry_after },
            403 => TransportError::PermissionDenied,
            400..=499 => TransportError::InvalidRequest { status, detail },
            _ => TransportError::Transient(format!("provider returned {status}: {detail}")),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Transient(err.to_string())
    }
}

/// Request-shape validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Write/check called with no track ids
    #[error("trackIds must be a non-empty list")]
    EmptyTrackIds,

    /// Write/check called with more ids than the provider accepts
    #[error("Maximum {max} track ids per request (got {len})")]
    TooManyTrackIds { len: usize, max: usize },
}

/// Startup configuration errors.
///
/// These prevent the process from starting at all; they are never a
/// runtime path.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(&'static str),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: &'static str, message: String },

    /// Failed to load configuration file
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_and_transient_are_retryable() {
        assert!(TransportError::RateLimited { retry_after: None }.is_retryable());
        assert!(TransportError::Transient("connection reset".into()).is_retryable());
    }

    #[test]
    fn permanent_client_errors_are_terminal() {
        assert!(!TransportError::PermissionDenied.is_retryable());
        assert!(!TransportError::InvalidRequest {
            status: 400,
            detail: "bad ids".into()
        }
        .is_retryable());
    }

    #[test]
    fn status_classification() {
        let hint = Some(Duration::from_secs(2));
        match TransportError::from_status(429, String::new(), hint) {
            TransportError::RateLimited { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_secs(2)));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }

        assert!(matches!(
            TransportError::from_status(403, String::new(), None),
            TransportError::PermissionDenied
        ));
        assert!(matches!(
            TransportError::from_status(404, String::new(), None),
            TransportError::InvalidRequest { status: 404, .. }
        ));
        assert!(matches!(
            TransportError::from_status(502, String::new(), None),
            TransportError::Transient(_)
        ));
    }
}
