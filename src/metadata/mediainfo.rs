//! Metadata extraction using the MediaInfo command-line tool
//!
//! Runs `mediainfo --Output=JSON <file>` and reads the first track record
//! (the "General" section), which carries the container-level tags.
//!
//! Install mediainfo:
//! - Windows: `winget install MediaArea.MediaInfo`
//! - macOS: `brew install media-info`
//! - Linux: `apt install mediainfo` or equivalent

use std::path::Path;
use std::process::Command;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{AlbumMetadata, MetadataError, MetadataProvider, first_present};

/// Common installation paths for mediainfo
#[cfg(windows)]
const MEDIAINFO_PATHS: &[&str] = &[
    "mediainfo", // In PATH
    r"C:\Program Files\MediaInfo\MediaInfo.exe",
    r"C:\Program Files (x86)\MediaInfo\MediaInfo.exe",
];

#[cfg(not(windows))]
const MEDIAINFO_PATHS: &[&str] = &[
    "mediainfo", // In PATH
    "/usr/bin/mediainfo",
    "/usr/local/bin/mediainfo",
    "/opt/homebrew/bin/mediainfo",
];

/// Find the mediainfo executable, checking common installation paths
fn find_mediainfo() -> Option<&'static str> {
    MEDIAINFO_PATHS
        .iter()
        .find(|&path| {
            Command::new(path)
                .arg("--Version")
                .output()
                .map(|o| o.status.success())
                .unwrap_or(false)
        })
        .copied()
}

/// MediaInfo-backed metadata provider.
pub struct MediaInfo {
    program: String,
}

impl MediaInfo {
    /// Use the first mediainfo found in the usual locations
    pub fn new() -> Self {
        Self {
            program: find_mediainfo().unwrap_or("mediainfo").to_string(),
        }
    }

    /// Use an explicit executable
    #[cfg(test)]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for MediaInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataProvider for MediaInfo {
    fn extract(&self, path: &Path) -> Result<AlbumMetadata, MetadataError> {
        tracing::info!("Extracting metadata from: {:?}", path);

        let output = Command::new(&self.program)
            .arg("--Output=JSON")
            .arg(path)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => MetadataError::ToolNotFound(self.program.clone()),
                _ => MetadataError::ToolFailed {
                    status: "spawn".to_string(),
                    stderr: e.to_string(),
                },
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MetadataError::ToolFailed {
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_mediainfo_json(&stdout, path)
    }
}

/// mediainfo JSON output structure
#[derive(Deserialize)]
struct MediaInfoOutput {
    media: Option<Media>,
}

#[derive(Deserialize)]
struct Media {
    #[serde(default)]
    track: Vec<Map<String, Value>>,
}

/// Parse the JSON output from mediainfo
fn parse_mediainfo_json(json: &str, path: &Path) -> Result<AlbumMetadata, MetadataError> {
    let parsed: MediaInfoOutput =
        serde_json::from_str(json).map_err(|e| MetadataError::Parse(e.to_string()))?;

    let track = parsed
        .media
        .and_then(|m| m.track.into_iter().next())
        .ok_or_else(|| MetadataError::NoTrack(path.to_path_buf()))?;

    let field = |key: &str| track.get(key).and_then(Value::as_str);

    Ok(AlbumMetadata {
        album: first_present([field("Album"), field("Title")]),
        performer: first_present([
            field("Album_Performer"),
            field("Performer"),
            field("Composer"),
        ]),
    })
}

/// Check if mediainfo is available on the system
pub fn is_mediainfo_available() -> bool {
    find_mediainfo().is_some()
}

/// Get mediainfo version string (for diagnostics)
pub fn get_mediainfo_version() -> Option<String> {
    let mediainfo = find_mediainfo()?;
    Command::new(mediainfo)
        .arg("--Version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().replace('\n', " "))
}
