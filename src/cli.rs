//! Command-line interface parsing for couponfeed
//!
//! This module handles parsing of CLI arguments using clap. Running the
//! binary without a subcommand behaves like `codes`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cache::DEFAULT_TTL_SECS;

/// Couponfeed - fetch, cache, and serve game store voucher codes
#[derive(Parser, Debug)]
#[command(name = "couponfeed")]
#[command(about = "Fetch, cache, and serve game store voucher codes")]
#[command(version)]
pub struct Cli {
    /// Cache file to use instead of the default XDG location
    #[arg(long, value_name = "FILE", global = true)]
    pub cache_file: Option<PathBuf>,

    /// Cache time-to-live in seconds
    #[arg(long, value_name = "SECONDS", global = true, default_value_t = DEFAULT_TTL_SECS)]
    pub ttl: u64,

    /// Voucher feed URL to use instead of the default
    #[arg(long, value_name = "URL", global = true)]
    pub feed_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the current coupon codes
    Codes {
        /// Bypass the cache and fetch fresh data from the feed
        #[arg(long)]
        refresh: bool,
        /// Print coupons as JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Print just the first coupon code
    Latest,
    /// Show the cache status as JSON
    Status,
    /// Remove the cached coupon data
    Clear,
}

impl Cli {
    /// The subcommand to run, defaulting to a plain `codes` listing
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Codes {
            refresh: false,
            json: false,
        })
    }
}
