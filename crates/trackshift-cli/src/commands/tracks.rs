//! Connect a single account and preview its saved tracks.

use std::io::Write as _;

use trackshift_core::migration::{fetch_all, fetcher::PAGE_SIZE};
use trackshift_core::{AccountType, Authenticator, Config, SessionStore, SpotifyClient};

use crate::login::login;

pub async fn run(account: &str, preview: usize) -> Result<(), Box<dyn std::error::Error>> {
    let account: AccountType = account.parse()?;
    let config = Config::load()?;
    let redirect_uri = config.redirect_uri.clone();

    let mut auth = Authenticator::new(config.clone());
    let mut store = SessionStore::new();
    login(&mut auth, &mut store, account, &redirect_uri).await?;

    let client = SpotifyClient::new(config);
    let session = store.authorized(account)?;

    let tracks = fetch_all(&client, session, PAGE_SIZE, |p| {
        print!("\rfetching {}/{}    ", p.current, p.total);
        let _ = std::io::stdout().flush();
    })
    .await?;
    println!();

    println!("{} saved tracks in the {account} account", tracks.len());
    for track in tracks.iter().take(preview) {
        println!(
            "  {} — {} ({}) [{}]",
            track.name,
            track.artists.join(", "),
            track.album,
            format_duration(track.duration_ms)
        );
    }
    if tracks.len() > preview {
        println!("  ... and {} more", tracks.len() - preview);
    }

    Ok(())
}

/// Format a duration in milliseconds as `m:ss`.
fn format_duration(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    format!("{minutes}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_track_durations() {
        assert_eq!(format_duration(225_000), "3:45");
        assert_eq!(format_duration(60_000), "1:00");
        assert_eq!(format_duration(5_400), "0:05");
    }
}
