//! hookstats - Leaderboard of blockchain networks ranked by hook activity
//!
//! Fetches per-network hook statistics from a GraphQL backend, ranks them and
//! prints the board once, or keeps refreshing it in watch mode.

use std::sync::Arc;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use hookstats::cli::{Cli, StartupConfig};
use hookstats::data::{HookInfo, StatsClient, StatsService};
use hookstats::leaderboard;
use hookstats::refresh::{RefreshHandle, RefreshMessage};

/// Sends logs to stderr so stdout only carries the board
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("hookstats=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Ranks the snapshot and prints it as a table or JSON
fn print_board(snapshot: &[HookInfo], config: &StartupConfig) -> Result<(), serde_json::Error> {
    let rows = leaderboard::rank(snapshot, config.sort_key);

    if config.json {
        println!("{}", leaderboard::format_json(&rows, config.limit)?);
    } else {
        println!("{}\n", leaderboard::format_board(&rows, config.limit));
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => Cli::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    init_logging();
    tracing::info!(endpoint = %config.endpoint, "starting hookstats");

    let service = Arc::new(StatsService::new(StatsClient::new(config.endpoint.clone())));

    let Some(interval) = config.watch_interval else {
        let snapshot = service.hook_infos().await?;
        print_board(&snapshot, &config)?;
        return Ok(());
    };

    let mut handle = RefreshHandle::spawn(Arc::clone(&service), interval);

    loop {
        tokio::select! {
            message = handle.receiver.recv() => match message {
                Some(RefreshMessage::Updated(snapshot)) => print_board(&snapshot, &config)?,
                // Already logged by the refresh task; keep the last board on screen
                Some(RefreshMessage::RefreshError(_)) => {}
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, shutting down");
                break;
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}
