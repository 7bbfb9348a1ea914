//! Adapter layer: Convert Gazelle DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.

use super::domain::{SearchGroup, TorrentId, TorrentVariant, TrackerError};
use super::dto;

/// Unwrap a response envelope, turning `"status": "failure"` into an error
pub fn unwrap_envelope<T>(envelope: dto::Envelope<T>) -> Result<T, TrackerError> {
    if envelope.status != "success" {
        return Err(TrackerError::Api(
            envelope
                .error
                .unwrap_or_else(|| format!("status {}", envelope.status)),
        ));
    }

    envelope
        .response
        .ok_or_else(|| TrackerError::Parse("success envelope without response".to_string()))
}

/// Convert browse results to search groups, preserving result order
pub fn to_search_groups(response: dto::BrowseResponse) -> Vec<SearchGroup> {
    response
        .results
        .into_iter()
        .map(|group| SearchGroup {
            name: group.group_name,
            variants: group
                .torrents
                .into_iter()
                .map(|t| TorrentVariant {
                    torrent_id: TorrentId::new(t.torrent_id.to_string()),
                    size: t.size,
                })
                .collect(),
        })
        .collect()
}
