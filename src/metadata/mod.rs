//! Album metadata extraction.
//!
//! Only two fields matter for tracker searches: the album title and the
//! performer. Both are optional; a missing field simply disables the search
//! strategy that needs it.
//!
//! Two backends are available:
//! - [`MediaInfo`] shells out to the `mediainfo` command-line tool
//! - [`TagReader`] reads embedded tags natively with lofty

mod mediainfo;
mod tags;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use mediainfo::{MediaInfo, get_mediainfo_version, is_mediainfo_available};
pub use tags::TagReader;

/// Search-relevant metadata of an album, read from one of its tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumMetadata {
    /// Album title (falls back to the track title)
    pub album: Option<String>,
    /// Album performer (falls back to performer, then composer)
    pub performer: Option<String>,
}

impl AlbumMetadata {
    /// True when no search field is available at all
    pub fn is_empty(&self) -> bool {
        self.album.is_none() && self.performer.is_none()
    }
}

/// Errors that can occur while extracting metadata
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("{0} not found. Please install MediaInfo: https://mediaarea.net/en/MediaInfo")]
    ToolNotFound(String),

    #[error("Metadata tool failed ({status}): {stderr}")]
    ToolFailed { status: String, stderr: String },

    #[error("Failed to parse metadata output: {0}")]
    Parse(String),

    #[error("No track information in metadata of {0:?}")]
    NoTrack(std::path::PathBuf),

    #[error("Failed to read tags: {0}")]
    Tags(String),
}

/// Extracts album metadata from a single audio file. Blocking.
pub trait MetadataProvider: Send + Sync {
    fn extract(&self, path: &Path) -> Result<AlbumMetadata, MetadataError>;
}

/// Which metadata backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataBackend {
    /// External `mediainfo --Output=JSON`
    #[default]
    Mediainfo,
    /// Embedded tags via lofty
    Tags,
}

/// Build the provider for a configured backend
pub fn provider_for(backend: MetadataBackend) -> Box<dyn MetadataProvider> {
    match backend {
        MetadataBackend::Mediainfo => Box::new(MediaInfo::new()),
        MetadataBackend::Tags => Box::new(TagReader),
    }
}

/// Returns the first candidate that holds non-blank text.
pub(crate) fn first_present<'a>(
    candidates: impl IntoIterator<Item = Option<&'a str>>,
) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_present_skips_blank_values() {
        let value = first_present([None, Some("   "), Some(" Composer "), Some("Other")]);
        assert_eq!(value.as_deref(), Some("Composer"));
    }

    #[test]
    fn test_first_present_none() {
        assert_eq!(first_present([None, Some("")]), None);
    }

    #[test]
    fn test_backend_from_config_text() {
        #[derive(Deserialize)]
        struct Wrapper {
            backend: MetadataBackend,
        }
        let parsed: Wrapper = toml::from_str(r#"backend = "tags""#).unwrap();
        assert_eq!(parsed.backend, MetadataBackend::Tags);
        assert_eq!(MetadataBackend::default(), MetadataBackend::Mediainfo);
    }

    #[test]
    fn test_album_metadata_is_empty() {
        assert!(AlbumMetadata::default().is_empty());
        let meta = AlbumMetadata {
            performer: Some("Artist".to_string()),
            ..Default::default()
        };
        assert!(!meta.is_empty());
    }
}
