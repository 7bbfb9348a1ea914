//! Test utilities and fixtures for tracker-sync tests.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{write_file, tracker_config};
//!
//! #[test]
//! fn test_something() {
//!     let dir = tempfile::tempdir().unwrap();
//!     write_file(&dir.path().join("Album").join("01.flac"), 1000);
//!     let tracker = tracker_config("RED", "token");
//!     // ... test logic
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{AuthMode, RateLimit, RunConfig, SkipPolicy, TrackerConfig};
use crate::metadata::MetadataBackend;

/// Writes a file of exactly `size` bytes, creating parent directories.
pub fn write_file(path: &Path, size: usize) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, vec![0u8; size]).expect("Failed to write test file");
}

/// A token-authenticated tracker with default limits and skip flags.
///
/// Customize using struct update syntax:
///
/// ```ignore
/// let tracker = TrackerConfig {
///     torrent_directory: dir.path().join("RED"),
///     ..tracker_config("RED", "token")
/// };
/// ```
pub fn tracker_config(name: &str, token: &str) -> TrackerConfig {
    TrackerConfig {
        name: name.to_string(),
        url: "https://tracker.example".to_string(),
        auth: AuthMode::Token(token.to_string()),
        torrent_directory: PathBuf::from("./torrents").join(name),
        rate_limit: RateLimit::default(),
        skip: SkipPolicy::default(),
    }
}

/// A run configuration over existing directories.
pub fn run_config(music: &Path, logs: &Path, trackers: Vec<TrackerConfig>) -> RunConfig {
    RunConfig {
        music_directory: music.to_path_buf(),
        logs_directory: logs.to_path_buf(),
        metadata_backend: MetadataBackend::default(),
        trackers,
    }
}
