use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod logging;
mod login;

#[derive(Parser)]
#[command(name = "trackshift", version, about = "Migrate liked songs between two accounts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect both accounts and migrate saved tracks source -> destination
    Migrate {
        /// Write a JSON migration report to this path
        #[arg(long)]
        report: Option<PathBuf>,
        /// Track ids per write batch (1-50)
        #[arg(long, default_value_t = 50)]
        chunk_size: usize,
    },
    /// Connect one account and list its saved tracks
    Tracks {
        /// Account to inspect: source or destination
        #[arg(long, default_value = "source")]
        account: String,
        /// How many tracks to print
        #[arg(long, default_value_t = 10)]
        preview: usize,
    },
    /// Connect one account and check whether the given tracks are saved
    Check {
        /// Account to check: source or destination
        #[arg(long, default_value = "destination")]
        account: String,
        /// Comma-separated track ids (max 50)
        #[arg(long)]
        ids: String,
    },
}

#[tokio::main]
async fn main() {
    logging::init_logger();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Migrate { report, chunk_size } => commands::migrate::run(report, chunk_size).await,
        Commands::Tracks { account, preview } => commands::tracks::run(&account, preview).await,
        Commands::Check { account, ids } => commands::check::run(&account, &ids).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
