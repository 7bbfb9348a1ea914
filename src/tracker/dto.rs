//! Gazelle JSON API Data Transfer Objects
//!
//! These types match what the Gazelle `ajax.php` endpoints return.
//! DO NOT use these types outside the tracker module - convert to domain types.
//!
//! Every endpoint wraps its payload in the same envelope:
//! `{"status": "success", "response": {...}}` or
//! `{"status": "failure", "error": "..."}`.

use serde::{Deserialize, Serialize};

/// Common response envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope<T> {
    pub status: String,
    pub response: Option<T>,
    pub error: Option<String>,
}

/// `action=browse` payload
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseResponse {
    pub current_page: Option<u32>,
    pub pages: Option<u32>,
    #[serde(default)]
    pub results: Vec<BrowseGroup>,
}

/// A torrent group in browse results.
///
/// Non-music categories come back without a `torrents` array.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseGroup {
    pub group_id: Option<Id>,
    pub group_name: Option<String>,
    pub artist: Option<String>,
    pub group_year: Option<u32>,
    #[serde(default)]
    pub torrents: Vec<BrowseTorrent>,
}

/// A single torrent inside a browse group
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseTorrent {
    pub torrent_id: Id,
    /// Content size in bytes
    pub size: u64,
    pub format: Option<String>,
    pub encoding: Option<String>,
    pub media: Option<String>,
}

/// Identifiers are numbers on most Gazelle forks, strings on a few
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Id {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Id::Number(n) => write!(f, "{}", n),
            Id::Text(s) => f.write_str(s),
        }
    }
}

/// `action=index` payload (used after a username/password login)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexResponse {
    pub username: Option<String>,
    pub id: Option<Id>,
    pub authkey: String,
    pub passkey: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_browse_response() {
        let json = r#"{
            "status": "success",
            "response": {
                "currentPage": 1,
                "pages": 1,
                "results": [
                    {
                        "groupId": 410618,
                        "groupName": "Kind of Blue",
                        "artist": "Miles Davis",
                        "groupYear": 1959,
                        "torrents": [
                            {"torrentId": 959473, "size": 339862289, "format": "FLAC",
                             "encoding": "Lossless", "media": "CD"},
                            {"torrentId": "959474", "size": 96113821, "format": "MP3"}
                        ]
                    },
                    {"groupId": 5, "groupName": "Ebook without variants", "torrentId": 6, "size": 10}
                ]
            }
        }"#;

        let parsed: Envelope<BrowseResponse> = serde_json::from_str(json).unwrap();
        let response = parsed.response.unwrap();

        assert_eq!(parsed.status, "success");
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].torrents.len(), 2);
        assert_eq!(response.results[0].torrents[0].torrent_id, Id::Number(959473));
        assert_eq!(
            response.results[0].torrents[1].torrent_id,
            Id::Text("959474".to_string())
        );
        assert!(response.results[1].torrents.is_empty());
    }

    #[test]
    fn test_deserialize_failure_envelope() {
        let json = r#"{"status": "failure", "error": "bad parameters"}"#;

        let parsed: Envelope<BrowseResponse> = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.status, "failure");
        assert!(parsed.response.is_none());
        assert_eq!(parsed.error.as_deref(), Some("bad parameters"));
    }

    #[test]
    fn test_deserialize_index_response() {
        let json = r#"{"status": "success", "response": {
            "username": "user", "id": 42, "authkey": "abc", "passkey": "def",
            "notifications": {"messages": 0}
        }}"#;

        let parsed: Envelope<IndexResponse> = serde_json::from_str(json).unwrap();
        let index = parsed.response.unwrap();

        assert_eq!(index.authkey, "abc");
        assert_eq!(index.passkey, "def");
    }
}
