//! Reconciliation engine - walks the music root and checks every album
//! against every configured tracker.
//!
//! Per album:
//! 1. Compute the directory size and locate FLAC files (skip the album on failure)
//! 2. Extract metadata from the first FLAC file (failures degrade to no metadata)
//! 3. Search phase: resolve the album on each tracker not skipping it
//! 4. Record phase: download matches, append to the ledger, and note torrents
//!    found on one tracker but missing on another
//!
//! The search phase completes before anything is recorded so the cross-tracker
//! log knows which trackers matched.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use super::resolver::{self, MatchResult};
use super::storage;
use crate::config::RunConfig;
use crate::ledger::{PriorOutcome, ResumeLedger};
use crate::metadata::{AlbumMetadata, MetadataProvider};
use crate::scanner::{self, ScanError};
use crate::tracker::{TorrentId, TrackerApi, TrackerError};

/// A tracker as seen by the engine
pub struct TrackerContext {
    pub name: String,
    pub torrent_directory: PathBuf,
    pub api: Arc<dyn TrackerApi>,
}

/// What happened on one tracker for the current album
#[derive(Debug, Clone, PartialEq, Eq)]
enum TrackerOutcome {
    /// Already recorded on a previous run
    Skipped(PriorOutcome),
    /// Search failed; nothing recorded, retried next run
    Failed,
    Matched(TorrentId),
    NotMatched,
}

impl TrackerOutcome {
    /// Whether a match on another tracker should be logged as missing here.
    /// Anything short of a match in this pass counts.
    fn lacks_album(&self) -> bool {
        !matches!(self, TrackerOutcome::Matched(_))
    }
}

/// Per-tracker counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerSummary {
    pub name: String,
    pub found: usize,
    pub not_found: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Counters for a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub albums_total: usize,
    pub albums_processed: usize,
    pub albums_skipped: usize,
    pub cancelled: bool,
    pub trackers: Vec<TrackerSummary>,
}

impl RunSummary {
    fn new(trackers: &[TrackerContext]) -> Self {
        Self {
            trackers: trackers
                .iter()
                .map(|t| TrackerSummary {
                    name: t.name.clone(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    /// Emit the summary as log lines
    pub fn log(&self) {
        info!(
            "Processed {} of {} album folder(s), {} skipped{}",
            self.albums_processed,
            self.albums_total,
            self.albums_skipped,
            if self.cancelled { " (cancelled)" } else { "" }
        );
        for t in &self.trackers {
            info!(
                "{}: {} found, {} not found, {} skipped, {} failed",
                t.name, t.found, t.not_found, t.skipped, t.failed
            );
        }
    }
}

/// Drives a reconciliation run
pub struct Engine {
    music_directory: PathBuf,
    ledger: ResumeLedger,
    trackers: Vec<TrackerContext>,
    metadata: Box<dyn MetadataProvider>,
    cancelled: Arc<AtomicBool>,
}

impl Engine {
    /// `trackers` must be in configuration order and match the ledger's trackers
    pub fn new(
        config: &RunConfig,
        ledger: ResumeLedger,
        trackers: Vec<TrackerContext>,
        metadata: Box<dyn MetadataProvider>,
    ) -> Self {
        Self {
            music_directory: config.music_directory.clone(),
            ledger,
            trackers,
            metadata,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops the run after the album in progress
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Process every album folder under the music root.
    ///
    /// Only an unreadable music root is an error; everything else is logged
    /// and skipped at album or tracker level.
    pub async fn run(&mut self) -> Result<RunSummary, ScanError> {
        info!("Search for folders in {:?}", self.music_directory);

        let albums = scanner::list_album_folders(&self.music_directory)?;
        let mut summary = RunSummary::new(&self.trackers);
        summary.albums_total = albums.len();

        for (index, album) in albums.iter().enumerate() {
            if self.cancelled.load(Ordering::SeqCst) {
                warn!("Cancellation requested, stopping before {:?}", album);
                summary.cancelled = true;
                break;
            }

            info!("({} / {}) Looking into {:?}", index + 1, albums.len(), album);
            if self.process_album(album, &mut summary).await {
                summary.albums_processed += 1;
            } else {
                summary.albums_skipped += 1;
            }
        }

        Ok(summary)
    }

    /// Reconcile one album against all trackers. Returns false when the
    /// album itself had to be skipped.
    async fn process_album(&mut self, album: &Path, summary: &mut RunSummary) -> bool {
        let key = album.to_string_lossy().into_owned();

        if self
            .trackers
            .iter()
            .all(|t| self.ledger.should_skip(&t.name, &key))
        {
            info!("Already processed on every tracker");
            for stats in &mut summary.trackers {
                stats.skipped += 1;
            }
            return true;
        }

        let prior: Vec<Option<PriorOutcome>> = self
            .trackers
            .iter()
            .map(|t| self.ledger.prior_outcome(&t.name, &key))
            .collect();

        let size = match scanner::directory_size(album) {
            Ok(size) => size,
            Err(e) => {
                warn!("Invalid directory size ({}). Skipping", e);
                return false;
            }
        };

        let flac_files = scanner::find_flac_files(album);
        let Some(first_flac) = flac_files.first() else {
            warn!("{}. Skipping", ScanError::NoFlacFiles(album.to_path_buf()));
            return false;
        };

        let metadata = match self.metadata.extract(first_flac) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("No usable metadata for {:?}: {}", first_flac, e);
                AlbumMetadata::default()
            }
        };
        if metadata.is_empty() {
            warn!("No searchable metadata, album will be recorded as not found");
        } else if metadata.album.is_none() {
            warn!("No album metadata found for this album");
        } else if metadata.performer.is_none() {
            warn!("No performer metadata found for this album");
        }

        let outcomes = self.search_trackers(&metadata, size, &prior).await;
        self.record_outcomes(&key, &outcomes, summary).await;
        true
    }

    /// Search phase: one outcome per tracker, in configuration order
    async fn search_trackers(
        &self,
        metadata: &AlbumMetadata,
        size: u64,
        prior: &[Option<PriorOutcome>],
    ) -> Vec<TrackerOutcome> {
        let mut outcomes = Vec::with_capacity(self.trackers.len());

        for (tracker, prior) in self.trackers.iter().zip(prior) {
            if let Some(prior) = prior {
                warn!(
                    "Skipping search for tracker {} since it has already been searched for",
                    tracker.name
                );
                outcomes.push(TrackerOutcome::Skipped(*prior));
                continue;
            }

            let outcome = match resolver::resolve(metadata, tracker.api.as_ref(), size).await {
                Ok(MatchResult::Found {
                    torrent_id,
                    strategy,
                }) => {
                    info!(
                        "{} {:?} found on {}. ID : {}",
                        strategy.label(),
                        strategy.query(metadata).unwrap_or_default(),
                        tracker.name,
                        torrent_id
                    );
                    TrackerOutcome::Matched(torrent_id)
                }
                Ok(MatchResult::NotFound) => {
                    info!("Not found on {}", tracker.name);
                    TrackerOutcome::NotMatched
                }
                Err(e) => {
                    warn!("Search on {} failed: {}", tracker.name, e);
                    TrackerOutcome::Failed
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Record phase: downloads and ledger writes.
    ///
    /// Failures stay local to their tracker: a failed download records
    /// nothing, so the album is searched again on the next run.
    async fn record_outcomes(
        &mut self,
        key: &str,
        outcomes: &[TrackerOutcome],
        summary: &mut RunSummary,
    ) {
        for (index, outcome) in outcomes.iter().enumerate() {
            let tracker = &self.trackers[index];
            let stats = &mut summary.trackers[index];

            match outcome {
                TrackerOutcome::Skipped(_) => {
                    stats.skipped += 1;
                }
                TrackerOutcome::Failed => {
                    stats.failed += 1;
                }
                TrackerOutcome::NotMatched => match self.ledger.record_not_found(&tracker.name, key) {
                    Ok(()) => stats.not_found += 1,
                    Err(e) => {
                        warn!("{}", e);
                        stats.failed += 1;
                    }
                },
                TrackerOutcome::Matched(torrent_id) => {
                    if let Err(e) = download(tracker, torrent_id).await {
                        warn!("Download of torrent {} from {} failed: {}", torrent_id, tracker.name, e);
                        stats.failed += 1;
                        continue;
                    }

                    if let Err(e) = self.ledger.record_found(&tracker.name, key) {
                        warn!("{}", e);
                        stats.failed += 1;
                        continue;
                    }
                    stats.found += 1;

                    for (other, other_outcome) in self.trackers.iter().zip(outcomes) {
                        if other.name == tracker.name || !other_outcome.lacks_album() {
                            continue;
                        }
                        if let Err(e) =
                            self.ledger
                                .record_found_elsewhere(&tracker.name, &other.name, torrent_id)
                        {
                            warn!("{}", e);
                        }
                    }
                }
            }
        }
    }
}

/// Fetch a torrent file and store it in the tracker's torrent directory
async fn download(tracker: &TrackerContext, torrent_id: &TorrentId) -> Result<PathBuf, TrackerError> {
    let file = tracker.api.fetch_torrent(torrent_id).await?;
    let path = storage::save_torrent(&tracker.torrent_directory, torrent_id, &file)?;
    info!("{:?} successfully downloaded on {}", path, tracker.name);
    Ok(path)
}
