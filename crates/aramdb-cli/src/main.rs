mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use aramdb_core::GameMode;

#[derive(Debug, Parser)]
#[command(name = "aramdb-cli")]
#[command(about = "Champion balance data from the wiki, from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch, parse and store champion data now, ignoring cache freshness
    Refresh {
        /// Fetch and parse without writing to the cache store
        #[arg(long)]
        dry_run: bool,
    },
    /// Show how old the cached champion data is
    Age,
    /// Print champion modifiers for a game mode
    Show {
        /// Game mode block to print (aram, urf, usb, ofa, nb, ar)
        #[arg(long, default_value = "aram")]
        mode: GameMode,
        /// Restrict output to one champion (record key, API name or display name)
        #[arg(long)]
        champion: Option<String>,
        /// Hide champions with no balance changes in the selected mode
        #[arg(long)]
        modified_only: bool,
        /// Read the cache only; never fetch
        #[arg(long)]
        cached: bool,
        /// Print the records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Parse a saved edit page or raw module source without fetching
    ParseFile {
        /// Path to an HTML edit page or a `return { ... }` source file
        path: PathBuf,
    },
    /// Launch the headless browser once and report its version
    BrowserCheck,
    /// List the records in the cache store collection
    Records,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    let config = aramdb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Refresh { dry_run }) => commands::run_refresh(&config, dry_run).await?,
        Some(Commands::Age) => commands::run_age(&config).await?,
        Some(Commands::Show {
            mode,
            champion,
            modified_only,
            cached,
            json,
        }) => {
            commands::run_show(
                &config,
                &commands::ShowOptions {
                    mode,
                    champion,
                    modified_only,
                    cached,
                    json,
                },
            )
            .await?;
        }
        Some(Commands::ParseFile { path }) => commands::run_parse_file(&path).await?,
        Some(Commands::BrowserCheck) => commands::run_browser_check(&config).await?,
        Some(Commands::Records) => commands::run_records(&config).await?,
        None => println!("aramdb-cli: run with --help to list commands"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
