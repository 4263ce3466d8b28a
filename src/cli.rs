//! Command-line interface parsing for hookstats
//!
//! This module handles parsing of CLI arguments using clap and validating them
//! into a `StartupConfig`.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::leaderboard::SortKey;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified sort key is not recognized
    #[error("Invalid sort key: '{0}'. Valid keys: swaps, pools")]
    InvalidSortKey(String),

    /// `--limit 0` would print an empty board
    #[error("Invalid limit: must be at least 1")]
    InvalidLimit,

    /// `--watch 0` would refresh in a busy loop
    #[error("Invalid watch interval: must be at least 1 second")]
    InvalidWatchInterval,
}

/// hookstats - Rank blockchain networks by hook activity
#[derive(Parser, Debug)]
#[command(name = "hookstats")]
#[command(about = "Leaderboard of blockchain networks ranked by hook swap and pool activity")]
#[command(version)]
pub struct Cli {
    /// GraphQL endpoint serving hook statistics
    #[arg(long, env = "HOOKSTATS_ENDPOINT", value_name = "URL")]
    pub endpoint: String,

    /// Metric to rank by: swaps or pools
    #[arg(long, value_name = "METRIC", default_value = "swaps")]
    pub sort: String,

    /// Only show the top N networks
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Keep running and refresh the board every SECONDS
    ///
    /// Refreshes within the cache TTL are served from memory.
    #[arg(long, value_name = "SECONDS")]
    pub watch: Option<u64>,

    /// Print the board as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Validated configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,
    /// Ranking metric
    pub sort_key: SortKey,
    /// Maximum number of rows to print
    pub limit: Option<usize>,
    /// Refresh period in watch mode, `None` for a single run
    pub watch_interval: Option<Duration>,
    /// Emit JSON instead of a text table
    pub json: bool,
}

/// Parses a sort key argument
pub fn parse_sort_arg(s: &str) -> Result<SortKey, CliError> {
    SortKey::parse(s).ok_or_else(|| CliError::InvalidSortKey(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if any argument is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let sort_key = parse_sort_arg(&cli.sort)?;

        if cli.limit == Some(0) {
            return Err(CliError::InvalidLimit);
        }

        let watch_interval = match cli.watch {
            None => None,
            Some(0) => return Err(CliError::InvalidWatchInterval),
            Some(secs) => Some(Duration::from_secs(secs)),
        };

        Ok(StartupConfig {
            endpoint: cli.endpoint.clone(),
            sort_key,
            limit: cli.limit,
            watch_interval,
            json: cli.json,
        })
    }
}
