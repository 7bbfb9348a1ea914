//! Persisting downloaded `.torrent` files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::tracker::{TorrentFile, TorrentId, TrackerError};

/// Replace characters that are invalid in filenames on common platforms
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect()
}

/// Filename for a downloaded torrent.
///
/// Uses the tracker's suggestion when it survives sanitizing, otherwise
/// `<torrentId>.torrent`.
pub fn torrent_filename(suggested: Option<&str>, torrent_id: &TorrentId) -> String {
    suggested
        .map(|name| sanitize_filename(name.trim()))
        .filter(|name| !name.is_empty() && !name.chars().all(|c| c == '.'))
        .unwrap_or_else(|| format!("{}.torrent", torrent_id))
}

/// Write a torrent file into `directory`, returning its path.
///
/// Written to a temporary name first and renamed, so a crash never leaves
/// a truncated `.torrent` behind.
pub fn save_torrent(
    directory: &Path,
    torrent_id: &TorrentId,
    file: &TorrentFile,
) -> Result<PathBuf, TrackerError> {
    let filename = torrent_filename(file.suggested_filename.as_deref(), torrent_id);
    let path = directory.join(&filename);
    let temp_path = directory.join(format!("{}.part", filename));

    let written = fs::write(&temp_path, &file.bytes)
        .map_err(|e| TrackerError::Io(format!("{:?}: {}", temp_path, e)))
        .and_then(|_| {
            fs::rename(&temp_path, &path)
                .map_err(|e| TrackerError::Io(format!("{:?}: {}", path, e)))
        });

    if written.is_err() {
        // Ignored: the temp file may never have been created
        let _ = fs::remove_file(&temp_path);
    }
    written.map(|_| path)
}
