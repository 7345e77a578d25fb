//! Connect a single account and check which of the given tracks it has
//! already saved.

use trackshift_core::{AccountType, Authenticator, Config, SessionStore, SpotifyClient};

use crate::login::login;

pub async fn run(account: &str, ids: &str) -> Result<(), Box<dyn std::error::Error>> {
    let account: AccountType = account.parse()?;
    let track_ids: Vec<String> = ids
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    let config = Config::load()?;
    let redirect_uri = config.redirect_uri.clone();

    let mut auth = Authenticator::new(config.clone());
    let mut store = SessionStore::new();
    login(&mut auth, &mut store, account, &redirect_uri).await?;

    let client = SpotifyClient::new(config);
    let session = store.authorized(account)?;

    let saved = client.check_saved(session, &track_ids).await?;
    for (id, saved) in track_ids.iter().zip(saved) {
        println!("  {id}  {}", if saved { "saved" } else { "not saved" });
    }

    Ok(())
}
