//! Resume ledger - the only persisted state of a run.
//!
//! For each tracker two plain-text logs hold one album path per line:
//! `FoundOn<Tracker>.log` and `NotFoundOn<Tracker>.log`. A third family,
//! `FoundOn<A>ButNotOn<B>.log`, collects torrent ids found on tracker A for
//! albums tracker B lacks, so they can be uploaded there by hand.
//!
//! Every entry is appended and flushed immediately; after a crash the next
//! run reloads the logs and skips whatever was already recorded.

mod log;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{SkipPolicy, TrackerConfig};
use crate::tracker::TorrentId;

pub use log::{LedgerLog, read_entries};

/// Why an album is in a tracker's skip-set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorOutcome {
    Found,
    NotFound,
}

/// Errors writing or loading ledger files
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Failed to open ledger {0:?}: {1}")]
    Open(PathBuf, std::io::Error),

    #[error("Failed to read ledger {0:?}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to append to ledger {0:?}: {1}")]
    Append(PathBuf, std::io::Error),

    #[error("Unknown tracker {0:?}")]
    UnknownTracker(String),
}

/// File name of a tracker's found log
pub fn found_log_name(tracker: &str) -> String {
    format!("FoundOn{}.log", tracker)
}

/// File name of a tracker's not-found log
pub fn not_found_log_name(tracker: &str) -> String {
    format!("NotFoundOn{}.log", tracker)
}

/// File name of the log of torrents found on `found_on` but missing on `missing_on`
pub fn found_elsewhere_log_name(found_on: &str, missing_on: &str) -> String {
    format!("FoundOn{}ButNotOn{}.log", found_on, missing_on)
}

/// Ledger state of one tracker
pub struct TrackerLedger {
    logs_directory: PathBuf,
    name: String,
    found: LedgerLog,
    not_found: LedgerLog,
    /// Opened on first write, keyed by the tracker lacking the album
    found_elsewhere: HashMap<String, LedgerLog>,
    skip: HashMap<String, PriorOutcome>,
}

impl TrackerLedger {
    /// Open the tracker's logs and load its skip-set.
    ///
    /// Each category is loaded only when its skip flag is enabled, so an
    /// operator can re-check not-found albums while still skipping found ones.
    pub fn open(
        logs_directory: &Path,
        name: &str,
        policy: SkipPolicy,
    ) -> Result<Self, LedgerError> {
        let found_path = logs_directory.join(found_log_name(name));
        let not_found_path = logs_directory.join(not_found_log_name(name));

        let mut skip = HashMap::new();
        if policy.already_not_found {
            for entry in read_entries(&not_found_path)? {
                skip.insert(entry, PriorOutcome::NotFound);
            }
        }
        // Found wins when a path somehow ended up in both logs
        if policy.already_found {
            for entry in read_entries(&found_path)? {
                skip.insert(entry, PriorOutcome::Found);
            }
        }
        debug!("Loaded {} entries to skip for {}", skip.len(), name);

        Ok(Self {
            logs_directory: logs_directory.to_path_buf(),
            name: name.to_string(),
            found: LedgerLog::open(found_path)?,
            not_found: LedgerLog::open(not_found_path)?,
            found_elsewhere: HashMap::new(),
            skip,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn skip_count(&self) -> usize {
        self.skip.len()
    }

    pub fn prior_outcome(&self, album: &str) -> Option<PriorOutcome> {
        self.skip.get(album).copied()
    }

    fn record_found_elsewhere(
        &mut self,
        missing_on: &str,
        torrent_id: &TorrentId,
    ) -> Result<(), LedgerError> {
        if !self.found_elsewhere.contains_key(missing_on) {
            let path = self
                .logs_directory
                .join(found_elsewhere_log_name(&self.name, missing_on));
            self.found_elsewhere
                .insert(missing_on.to_string(), LedgerLog::open(path)?);
        }

        match self.found_elsewhere.get_mut(missing_on) {
            Some(log) => log.append(torrent_id.as_str()),
            None => Err(LedgerError::UnknownTracker(missing_on.to_string())),
        }
    }
}

/// Ledgers of every configured tracker
pub struct ResumeLedger {
    trackers: Vec<TrackerLedger>,
}

impl ResumeLedger {
    /// Open the ledgers of all trackers in `logs_directory`
    pub fn open(logs_directory: &Path, trackers: &[TrackerConfig]) -> Result<Self, LedgerError> {
        let trackers = trackers
            .iter()
            .map(|t| TrackerLedger::open(logs_directory, &t.name, t.skip))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { trackers })
    }

    pub fn tracker(&self, name: &str) -> Option<&TrackerLedger> {
        self.trackers.iter().find(|t| t.name == name)
    }

    fn tracker_mut(&mut self, name: &str) -> Result<&mut TrackerLedger, LedgerError> {
        self.trackers
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| LedgerError::UnknownTracker(name.to_string()))
    }

    /// True iff `album` was loaded into the tracker's skip-set
    pub fn should_skip(&self, tracker: &str, album: &str) -> bool {
        self.prior_outcome(tracker, album).is_some()
    }

    /// Which log put `album` in the tracker's skip-set, if any
    pub fn prior_outcome(&self, tracker: &str, album: &str) -> Option<PriorOutcome> {
        self.tracker(tracker).and_then(|t| t.prior_outcome(album))
    }

    pub fn record_found(&mut self, tracker: &str, album: &str) -> Result<(), LedgerError> {
        self.tracker_mut(tracker)?.found.append(album)
    }

    pub fn record_not_found(&mut self, tracker: &str, album: &str) -> Result<(), LedgerError> {
        self.tracker_mut(tracker)?.not_found.append(album)
    }

    /// Note that `torrent_id` on `found_on` is missing from `missing_on`
    pub fn record_found_elsewhere(
        &mut self,
        found_on: &str,
        missing_on: &str,
        torrent_id: &TorrentId,
    ) -> Result<(), LedgerError> {
        self.tracker_mut(found_on)?
            .record_found_elsewhere(missing_on, torrent_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::tracker_config;
    use tempfile::tempdir;

    fn policy(already_found: bool, already_not_found: bool) -> SkipPolicy {
        SkipPolicy {
            already_found,
            already_not_found,
        }
    }

    #[test]
    fn test_log_names() {
        assert_eq!(found_log_name("RED"), "FoundOnRED.log");
        assert_eq!(not_found_log_name("RED"), "NotFoundOnRED.log");
        assert_eq!(found_elsewhere_log_name("RED", "OPS"), "FoundOnREDButNotOnOPS.log");
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        let trackers = vec![tracker_config("RED", "token")];

        {
            let mut ledger = ResumeLedger::open(dir.path(), &trackers).unwrap();
            assert!(!ledger.should_skip("RED", "/music/A"));
            ledger.record_found("RED", "/music/A").unwrap();
            ledger.record_not_found("RED", "/music/B").unwrap();
        }

        let ledger = ResumeLedger::open(dir.path(), &trackers).unwrap();
        assert_eq!(ledger.prior_outcome("RED", "/music/A"), Some(PriorOutcome::Found));
        assert_eq!(ledger.prior_outcome("RED", "/music/B"), Some(PriorOutcome::NotFound));
        assert!(!ledger.should_skip("RED", "/music/C"));
        assert!(!ledger.should_skip("OPS", "/music/A"));
    }

    #[test]
    fn test_skip_categories_load_independently() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("FoundOnRED.log"), "/music/A\n").unwrap();
        std::fs::write(dir.path().join("NotFoundOnRED.log"), "/music/B\n").unwrap();

        let only_found = TrackerLedger::open(dir.path(), "RED", policy(true, false)).unwrap();
        assert_eq!(only_found.prior_outcome("/music/A"), Some(PriorOutcome::Found));
        assert_eq!(only_found.prior_outcome("/music/B"), None);

        let only_not_found = TrackerLedger::open(dir.path(), "RED", policy(false, true)).unwrap();
        assert_eq!(only_not_found.prior_outcome("/music/A"), None);
        assert_eq!(
            only_not_found.prior_outcome("/music/B"),
            Some(PriorOutcome::NotFound)
        );

        let neither = TrackerLedger::open(dir.path(), "RED", policy(false, false)).unwrap();
        assert_eq!(neither.skip_count(), 0);
    }

    #[test]
    fn test_missing_logs_load_as_empty() {
        let dir = tempdir().unwrap();
        let ledger = TrackerLedger::open(dir.path(), "RED", policy(true, true)).unwrap();
        assert_eq!(ledger.skip_count(), 0);
        assert_eq!(ledger.name(), "RED");
    }

    #[test]
    fn test_found_elsewhere_appends_ids() {
        let dir = tempdir().unwrap();
        let trackers = vec![tracker_config("RED", "t"), tracker_config("OPS", "t")];
        let mut ledger = ResumeLedger::open(dir.path(), &trackers).unwrap();

        ledger
            .record_found_elsewhere("RED", "OPS", &TorrentId::new("7"))
            .unwrap();
        ledger
            .record_found_elsewhere("RED", "OPS", &TorrentId::new("9"))
            .unwrap();

        let entries = read_entries(&dir.path().join("FoundOnREDButNotOnOPS.log")).unwrap();
        assert_eq!(entries, vec!["7", "9"]);
        assert!(!dir.path().join("FoundOnOPSButNotOnRED.log").exists());
    }

    #[test]
    fn test_unknown_tracker() {
        let dir = tempdir().unwrap();
        let mut ledger = ResumeLedger::open(dir.path(), &[]).unwrap();
        let result = ledger.record_found("RED", "/music/A");
        assert!(matches!(result, Err(LedgerError::UnknownTracker(_))));
    }
}
