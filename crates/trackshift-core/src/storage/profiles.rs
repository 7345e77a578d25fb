//! SQLite-backed profile store.
//!
//! The core reports each successfully authenticated profile here and never
//! reads it back; the table is a durable record for external consumers.

use chrono::Utc;
use rusqlite::{params, Connection};

use crate::session::{AccountProfile, AccountType};

/// Durable upsert target for authenticated profiles.
pub struct ProfileStore {
    conn: Connection,
}

impl ProfileStore {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/trackshift/trackshift.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, rusqlite::Error> {
        let path = super::config_dir()
            .map_err(|e| rusqlite::Error::InvalidPath(e.to_string().into()))?
            .join("trackshift.db");
        Self::open_at(&path)
    }

    /// Open the database at a specific path (tests use a temp dir).
    pub fn open_at(path: &std::path::Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                spotify_id        TEXT PRIMARY KEY,
                email             TEXT,
                display_name      TEXT NOT NULL,
                profile_image_url TEXT,
                account_type      TEXT NOT NULL,
                updated_at        TEXT NOT NULL
            );",
        )
    }

    /// Insert or update the row for `profile`, keyed by provider user id.
    pub fn upsert(
        &self,
        account: AccountType,
        profile: &AccountProfile,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO users (spotify_id, email, display_name, profile_image_url, account_type, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(spotify_id) DO UPDATE SET
                 email = excluded.email,
                 display_name = excluded.display_name,
                 profile_image_url = excluded.profile_image_url,
                 account_type = excluded.account_type,
                 updated_at = excluded.updated_at",
            params![
                profile.id,
                profile.email,
                profile.display_name,
                profile.image_url,
                account.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}
