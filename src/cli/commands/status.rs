//! Ledger statistics.

use std::collections::HashSet;
use std::path::Path;

use super::run::load_config;
use crate::config::TrackerConfig;
use crate::ledger::{
    LedgerError, found_elsewhere_log_name, found_log_name, not_found_log_name, read_entries,
};

/// What the logs say about one tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerStatus {
    pub name: String,
    pub found: usize,
    pub not_found: usize,
    /// `(other tracker, torrents found here but missing there)`
    pub missing_elsewhere: Vec<(String, usize)>,
}

/// Show per-tracker ledger counts
pub fn cmd_status(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let statuses = collect_status(&config.logs_directory, &config.trackers)?;

    println!("Ledger status ({})", config.logs_directory.display());
    println!("==============");
    for status in &statuses {
        println!("{}", status.name);
        println!("  ✓ Found:     {}", status.found);
        println!("  ✗ Not found: {}", status.not_found);
        for (other, count) in &status.missing_elsewhere {
            println!("  → Missing on {}: {}", other, count);
        }
    }
    Ok(())
}

/// Count distinct entries in every log for the configured trackers
pub fn collect_status(
    logs_directory: &Path,
    trackers: &[TrackerConfig],
) -> Result<Vec<TrackerStatus>, LedgerError> {
    let distinct = |name: String| -> Result<usize, LedgerError> {
        let entries = read_entries(&logs_directory.join(name))?;
        Ok(entries.iter().collect::<HashSet<_>>().len())
    };

    trackers
        .iter()
        .map(|tracker| -> Result<TrackerStatus, LedgerError> {
            let mut missing_elsewhere = Vec::new();
            for other in trackers.iter().filter(|o| o.name != tracker.name) {
                let count = distinct(found_elsewhere_log_name(&tracker.name, &other.name))?;
                missing_elsewhere.push((other.name.clone(), count));
            }

            Ok(TrackerStatus {
                name: tracker.name.clone(),
                found: distinct(found_log_name(&tracker.name))?,
                not_found: distinct(not_found_log_name(&tracker.name))?,
                missing_elsewhere,
            })
        })
        .collect()
}
