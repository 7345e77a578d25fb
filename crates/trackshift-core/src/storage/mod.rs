pub mod profiles;

pub use profiles::ProfileStore;

use std::path::PathBuf;

/// Returns `~/.config/trackshift[-dev]/` based on TRACKSHIFT_ENV.
///
/// Set TRACKSHIFT_ENV=dev to use a separate development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn config_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TRACKSHIFT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("trackshift-dev")
    } else {
        base_dir.join("trackshift")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
