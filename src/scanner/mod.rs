//! Local album discovery.
//!
//! Lists album folders under the music root, locates the FLAC files used for
//! metadata extraction and computes the content size that trackers report for
//! a torrent (sum of regular file sizes, directory entries excluded).

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Errors that make an album (or the whole music root) unusable.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Failed to read music directory {path:?}: {source}")]
    ReadRoot {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to compute size of {path:?}: {message}")]
    Size { path: PathBuf, message: String },

    #[error("No FLAC files found in {0:?}")]
    NoFlacFiles(PathBuf),
}

/// Lists the album directories directly under `root`, sorted by name.
///
/// Plain files at the top level are ignored.
pub fn list_album_folders(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let entries = fs::read_dir(root).map_err(|source| ScanError::ReadRoot {
        path: root.to_path_buf(),
        source,
    })?;

    let mut folders: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|e| e.path())
        .collect();
    folders.sort();

    Ok(folders)
}

/// Total size in bytes of every regular file below `path`.
///
/// Symlinks are not followed and directory entries do not count, which is
/// how trackers compute the size of a torrent's content.
pub fn directory_size(path: &Path) -> Result<u64, ScanError> {
    let mut total = 0u64;

    for entry in WalkDir::new(path) {
        let entry = entry.map_err(|e| ScanError::Size {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if entry.file_type().is_file() {
            let metadata = entry.metadata().map_err(|e| ScanError::Size {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            total += metadata.len();
        }
    }

    Ok(total)
}

/// Locates the FLAC files of an album.
///
/// The album root is searched first. Multi-disc releases often keep their
/// tracks in `CD1/`, `CD2/`..., so when the root has none, each immediate
/// subdirectory is tried in name order and the first one holding any FLAC
/// file wins. Returns an empty list when nothing is found.
pub fn find_flac_files(album: &Path) -> Vec<PathBuf> {
    let root_files = flac_files_in(album);
    if !root_files.is_empty() {
        return root_files;
    }

    let Ok(entries) = fs::read_dir(album) else {
        return Vec::new();
    };

    let mut subdirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|e| e.path())
        .collect();
    subdirs.sort();

    subdirs
        .iter()
        .map(|dir| flac_files_in(dir))
        .find(|files| !files.is_empty())
        .unwrap_or_default()
}

/// FLAC files directly inside `dir` (not recursive), sorted.
fn flac_files_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.path())
        .filter(|p| is_flac_file(p))
        .collect();
    files.sort();

    files
}

/// Check if a path has a `.flac` extension (case-insensitive)
pub fn is_flac_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("flac"))
}
