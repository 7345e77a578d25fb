//! Dual-account session store.
//!
//! Two independent credential slots, one per [`AccountType`]. The store is
//! the single coordination point every authorized operation consults: get
//! the slot, check expiry, only then use the token. The store itself never
//! refreshes anything; the caller decides how to react to `TokenExpired`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, SessionError};

/// Which of the two accounts a credential or operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// The account tracks are migrated from.
    Source,
    /// The account tracks are migrated to.
    Destination,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountType::Source => "source",
            AccountType::Destination => "destination",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source" => Ok(AccountType::Source),
            "destination" => Ok(AccountType::Destination),
            other => Err(AuthError::InvalidAccountType(other.to_string())),
        }
    }
}

/// Provider profile attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    /// Opaque provider user id.
    pub id: String,
    pub email: Option<String>,
    pub display_name: String,
    pub image_url: Option<String>,
}

/// Credentials and profile for one authenticated account.
///
/// Created on successful code exchange, mutated in place on refresh,
/// destroyed on logout or process end. `expires_at` is advisory: callers
/// must check it before issuing an authorized request.
#[derive(Debug, Clone)]
pub struct AccountSession {
    pub account: AccountType,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub profile: AccountProfile,
}

impl AccountSession {
    /// Whether the access token's advisory expiry has passed.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Connection state of one slot, as reported by [`SessionStore::status`].
#[derive(Debug, Clone, Serialize)]
pub struct SlotStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<AccountProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Status of both slots.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub source: SlotStatus,
    pub destination: SlotStatus,
}

/// Holds at most one [`AccountSession`] per account type.
#[derive(Debug, Default)]
pub struct SessionStore {
    source: Option<AccountSession>,
    destination: Option<AccountSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, account: AccountType) -> Option<&AccountSession> {
        self.slot(account).as_ref()
    }

    pub fn get_mut(&mut self, account: AccountType) -> Option<&mut AccountSession> {
        self.slot_mut(account).as_mut()
    }

    /// Install a session, replacing any prior session for its account type.
    pub fn set(&mut self, session: AccountSession) {
        let account = session.account;
        *self.slot_mut(account) = Some(session);
    }

    /// The get-then-expiry-check every authorized operation performs.
    ///
    /// Absent slot fails `NotAuthenticated`; present-but-expired fails
    /// `TokenExpired` before any remote request is issued.
    pub fn authorized(&self, account: AccountType) -> Result<&AccountSession, SessionError> {
        let session = self
            .get(account)
            .ok_or(SessionError::NotAuthenticated { account })?;
        if session.is_expired() {
            return Err(SessionError::TokenExpired { account });
        }
        Ok(session)
    }

    /// Connection status for both slots.
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            source: Self::slot_status(&self.source),
            destination: Self::slot_status(&self.destination),
        }
    }

    /// Destroy both slots (logout).
    pub fn clear_all(&mut self) {
        self.source = None;
        self.destination = None;
    }

    fn slot_status(slot: &Option<AccountSession>) -> SlotStatus {
        match slot {
            Some(session) => SlotStatus {
                connected: true,
                profile: Some(session.profile.clone()),
                expires_at: Some(session.expires_at),
            },
            None => SlotStatus {
                connected: false,
                profile: None,
                expires_at: None,
            },
        }
    }

    fn slot(&self, account: AccountType) -> &Option<AccountSession> {
        match account {
            AccountType::Source => &self.source,
            AccountType::Destination => &self.destination,
        }
    }

    fn slot_mut(&mut self, account: AccountType) -> &mut Option<AccountSession> {
        match account {
            AccountType::Source => &mut self.source,
            AccountType::Destination => &mut self.destination,
        }
    }
}
