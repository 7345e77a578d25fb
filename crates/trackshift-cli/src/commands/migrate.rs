//! The full migration flow: connect both accounts, run the pipeline,
//! print the summary, optionally export a report.

use std::io::Write as _;
use std::path::PathBuf;

use trackshift_core::{
    AccountType, Authenticator, Config, MigrationEngine, MigrationReport, ProfileStore,
    SessionError, SessionStore, SpotifyClient,
};

use crate::login::login;

pub async fn run(report: Option<PathBuf>, chunk_size: usize) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let redirect_uri = config.redirect_uri.clone();

    let profiles = ProfileStore::open()?;
    let mut auth = Authenticator::new(config.clone()).with_profile_store(profiles);
    let mut store = SessionStore::new();

    login(&mut auth, &mut store, AccountType::Source, &redirect_uri).await?;
    login(&mut auth, &mut store, AccountType::Destination, &redirect_uri).await?;

    // A slow second login can outlive the first access token; refresh it
    // rather than forcing a re-login.
    for account in [AccountType::Source, AccountType::Destination] {
        if matches!(
            store.authorized(account),
            Err(SessionError::TokenExpired { .. })
        ) {
            auth.refresh_access_token(&mut store, account).await?;
        }
    }

    let client = SpotifyClient::new(config);
    let mut engine = MigrationEngine::new(&client).with_chunk_size(chunk_size.clamp(1, 50));

    // Ctrl-C stops the run after the in-flight batch; already-written
    // chunks stay in the destination library.
    let cancel = engine.cancellation_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\ncancelling after the current batch...");
            cancel.cancel();
        }
    });

    let status = store.status();
    if let (Some(source), Some(destination)) = (&status.source.profile, &status.destination.profile)
    {
        println!(
            "Migrating saved tracks: {} -> {}",
            source.display_name, destination.display_name
        );
    }
    let summary = engine
        .run(&store, |p| {
            if p.total > 0 {
                print!(
                    "\r{}/{} (added {}, failed {}, skipped {})    ",
                    p.current, p.total, p.added, p.failed, p.skipped
                );
                let _ = std::io::stdout().flush();
            }
        })
        .await?;
    println!();

    println!("Done in {:.1}s", summary.duration_ms as f64 / 1000.0);
    println!("  total   {}", summary.total);
    println!("  added   {}", summary.added);
    println!("  skipped {}", summary.skipped);
    println!("  failed  {}", summary.failed);
    if !summary.failed_track_ids.is_empty() {
        println!("  failed track ids: {}", summary.failed_track_ids.join(", "));
    }

    if let Some(path) = report {
        let report = MigrationReport::from_summary(&summary);
        std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}
