//! Internal domain models for tracker searches and downloads.
//!
//! These types are OUR types - they don't change when a tracker's API changes.
//! All API responses get converted into these types via the adapter.

use std::fmt;

/// Tracker-assigned torrent identifier, used to request the `.torrent` file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TorrentId(String);

impl TorrentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TorrentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One downloadable torrent of a release (a specific format/edition)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentVariant {
    pub torrent_id: TorrentId,
    /// Content size in bytes as reported by the tracker
    pub size: u64,
}

/// A search result: one release group bundling several torrent variants
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchGroup {
    /// Release name, for logging only
    pub name: Option<String>,
    pub variants: Vec<TorrentVariant>,
}

/// A downloaded `.torrent` file
#[derive(Debug, Clone)]
pub struct TorrentFile {
    /// Filename announced by the tracker (Content-Disposition), unsanitized
    pub suggested_filename: Option<String>,
    pub bytes: Vec<u8>,
}

/// Errors that can occur while talking to a tracker
#[derive(Debug, Clone, thiserror::Error)]
pub enum TrackerError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("API request failed: {0}")]
    Api(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Authentication failed: {0}")]
    Login(String),

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Failed to store torrent file: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_torrent_id_display() {
        let id = TorrentId::new("1234");
        assert_eq!(id.to_string(), "1234");
        assert_eq!(id.as_str(), "1234");
    }

    #[test]
    fn test_error_display() {
        let err = TrackerError::Http {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
    }
}
