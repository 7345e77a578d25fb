//! # Trackshift Core Library
//!
//! This library moves a saved-track library between two accounts on the
//! same music service through the service's authorized web API. All
//! operations are available to a standalone CLI binary, which is a thin
//! consumer over this core.
//!
//! ## Architecture
//!
//! - **Auth**: PKCE-based OAuth for two independent account slots, with
//!   CSRF-protected one-time challenges and token refresh
//! - **Sessions**: a dual-slot store consulted by every authorized call
//! - **Spotify client**: typed wrappers over the provider endpoints,
//!   routed through a retry-with-backoff transport
//! - **Migration**: fetch → deduplicate → batched write → summary, with a
//!   progress callback and cooperative cancellation
//! - **Storage**: SQLite upsert of authenticated profiles
//!
//! ## Key Components
//!
//! - [`Authenticator`]: PKCE authorization, code exchange, refresh
//! - [`SessionStore`]: the two credential slots
//! - [`SpotifyClient`]: provider API access
//! - [`MigrationEngine`]: the pipeline orchestrator

pub mod auth;
pub mod config;
pub mod error;
pub mod migration;
pub mod session;
pub mod spotify;
pub mod storage;
pub mod transport;

pub use auth::{Authenticator, AuthorizationRequest, LoginOutcome};
pub use config::Config;
pub use error::{
    AuthError, ConfigError, CoreError, SessionError, TransportError, ValidationError,
};
pub use migration::{
    CancellationFlag, MigrationEngine, MigrationPhase, MigrationProgress, MigrationReport,
    MigrationSummary,
};
pub use session::{AccountProfile, AccountSession, AccountType, SessionStatus, SessionStore};
pub use spotify::{SpotifyClient, Track};
pub use storage::ProfileStore;
pub use transport::RetryPolicy;
