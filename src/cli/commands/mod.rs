//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `run`: Reconcile the music library against every tracker
//! - `tools`: External tool checks
//! - `status`: Ledger statistics

mod run;
mod status;
mod tools;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

pub use run::cmd_run;
pub use status::cmd_status;
pub use tools::cmd_check_tools;

/// Tracker Sync CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the config file (default: ./config.toml, then the OS config directory)
    #[arg(short, long, global = true, env = "TRACKER_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Search every album on every tracker and download exact matches
    Run,
    /// Check if metadata tools are installed
    CheckTools,
    /// Show how many albums each tracker's logs hold
    Status,
}

/// Run the specified CLI command, defaulting to `run`.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let rt = Runtime::new()?;
            cmd_run(&rt, cli.config.as_deref())
        }
        Commands::CheckTools => cmd_check_tools(),
        Commands::Status => cmd_status(cli.config.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["tracker-sync"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["tracker-sync", "status", "-v", "--config", "/etc/ts.toml"])
                .unwrap();
        assert_eq!(cli.command, Some(Commands::Status));
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/ts.toml")));
    }

    #[test]
    fn test_check_tools_is_kebab_case() {
        let cli = Cli::try_parse_from(["tracker-sync", "check-tools"]).unwrap();
        assert_eq!(cli.command, Some(Commands::CheckTools));
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["tracker-sync", "scan"]).is_err());
    }
}
