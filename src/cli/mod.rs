//! Command-line interface for tracker-sync.
//!
//! Running without a subcommand starts a reconciliation run.

mod commands;

pub use commands::{Cli, Commands, run_command};
