//! Tracker Sync - reconcile a local FLAC library with private torrent trackers.
//!
//! Every album folder under the music root is looked up on each configured
//! tracker. Exact-size matches are downloaded as `.torrent` files and every
//! outcome is appended to per-tracker logs, so interrupted runs resume where
//! they stopped.

pub mod cli;
pub mod config;
pub mod error;
pub mod ledger;
pub mod metadata;
pub mod reconcile;
pub mod scanner;
#[cfg(test)]
pub mod test_utils;
pub mod tracker;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    let args = cli::Cli::parse();

    // Initialize logging; RUST_LOG wins over the verbosity flag
    let default_directive = if args.verbose {
        "tracker_sync=debug"
    } else {
        "tracker_sync=info"
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .init();

    if let Err(e) = cli::run_command(&args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
