//! Match resolution: find a tracker torrent holding exactly a local album.
//!
//! Search text is fuzzy, so the content size is what decides: a variant only
//! matches when its reported size equals the album directory size to the
//! byte. Searches run by album title first; the performer is a weaker query
//! and only tried when the title search yields no exact-size variant.

use tracing::debug;

use crate::metadata::AlbumMetadata;
use crate::tracker::{SearchGroup, TorrentId, TorrentVariant, TrackerApi, TrackerError};

/// A way of querying a tracker for an album
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    AlbumTitle,
    Performer,
}

impl SearchStrategy {
    /// Strategies in priority order
    pub const ORDER: [SearchStrategy; 2] = [SearchStrategy::AlbumTitle, SearchStrategy::Performer];

    /// Query text for this strategy, if the metadata has the field
    pub fn query<'a>(&self, metadata: &'a AlbumMetadata) -> Option<&'a str> {
        match self {
            SearchStrategy::AlbumTitle => metadata.album.as_deref(),
            SearchStrategy::Performer => metadata.performer.as_deref(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SearchStrategy::AlbumTitle => "album",
            SearchStrategy::Performer => "performer",
        }
    }
}

/// Outcome of resolving one album against one tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Found {
        torrent_id: TorrentId,
        strategy: SearchStrategy,
    },
    NotFound,
}

/// First variant, across all groups in result order, whose size is exactly `size`
pub fn find_exact_size(groups: &[SearchGroup], size: u64) -> Option<&TorrentVariant> {
    groups
        .iter()
        .flat_map(|group| group.variants.iter())
        .find(|variant| variant.size == size)
}

/// Try each search strategy in order until one finds an exact-size variant.
///
/// Strategies whose metadata field is missing are skipped. A transport
/// error aborts resolution; the caller decides what it means for the album.
pub async fn resolve(
    metadata: &AlbumMetadata,
    tracker: &dyn TrackerApi,
    target_size: u64,
) -> Result<MatchResult, TrackerError> {
    for strategy in SearchStrategy::ORDER {
        let Some(query) = strategy.query(metadata) else {
            debug!("No {} metadata, skipping that search", strategy.label());
            continue;
        };

        let groups = tracker.search(query).await?;
        debug!(
            "Search by {} {:?} returned {} group(s)",
            strategy.label(),
            query,
            groups.len()
        );

        if let Some(variant) = find_exact_size(&groups, target_size) {
            return Ok(MatchResult::Found {
                torrent_id: variant.torrent_id.clone(),
                strategy,
            });
        }
    }

    Ok(MatchResult::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::traits::mocks::MockTracker;

    fn metadata(album: Option<&str>, performer: Option<&str>) -> AlbumMetadata {
        AlbumMetadata {
            album: album.map(String::from),
            performer: performer.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_exact_size_match_by_album() {
        let tracker = MockTracker::new().with_result("X", &[("7", 1000)]);

        let result = resolve(&metadata(Some("X"), None), &tracker, 1000).await.unwrap();

        assert_eq!(
            result,
            MatchResult::Found {
                torrent_id: TorrentId::new("7"),
                strategy: SearchStrategy::AlbumTitle
            }
        );
    }

    #[tokio::test]
    async fn test_size_mismatch_is_not_found() {
        let tracker = MockTracker::new().with_result("X", &[("7", 999)]);

        let result = resolve(&metadata(Some("X"), None), &tracker, 1000).await.unwrap();

        assert_eq!(result, MatchResult::NotFound);
    }

    #[tokio::test]
    async fn test_album_title_preferred_over_performer() {
        let tracker = MockTracker::new()
            .with_result("Album", &[("1", 500)])
            .with_result("Artist", &[("2", 500)]);

        let result = resolve(&metadata(Some("Album"), Some("Artist")), &tracker, 500)
            .await
            .unwrap();

        assert_eq!(
            result,
            MatchResult::Found {
                torrent_id: TorrentId::new("1"),
                strategy: SearchStrategy::AlbumTitle
            }
        );
        // Performer search never issued
        assert_eq!(tracker.search_calls(), vec!["Album"]);
    }

    #[tokio::test]
    async fn test_falls_back_to_performer() {
        let tracker = MockTracker::new()
            .with_result("Album", &[("1", 400)])
            .with_result("Artist", &[("2", 300), ("3", 500)]);

        let result = resolve(&metadata(Some("Album"), Some("Artist")), &tracker, 500)
            .await
            .unwrap();

        assert_eq!(
            result,
            MatchResult::Found {
                torrent_id: TorrentId::new("3"),
                strategy: SearchStrategy::Performer
            }
        );
        assert_eq!(tracker.search_calls(), vec!["Album", "Artist"]);
    }

    #[tokio::test]
    async fn test_no_metadata_issues_no_search() {
        let tracker = MockTracker::new();

        let result = resolve(&AlbumMetadata::default(), &tracker, 500).await.unwrap();

        assert_eq!(result, MatchResult::NotFound);
        assert!(tracker.search_calls().is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let tracker =
            MockTracker::new().failing_search(TrackerError::Network("timeout".to_string()));

        let result = resolve(&metadata(Some("X"), Some("Y")), &tracker, 1).await;

        assert!(matches!(result, Err(TrackerError::Network(_))));
        assert_eq!(tracker.search_calls().len(), 1);
    }

    #[test]
    fn test_find_exact_size_scans_all_groups_in_order() {
        let groups = vec![
            SearchGroup {
                name: None,
                variants: vec![],
            },
            SearchGroup {
                name: None,
                variants: vec![
                    TorrentVariant {
                        torrent_id: TorrentId::new("a"),
                        size: 1,
                    },
                    TorrentVariant {
                        torrent_id: TorrentId::new("b"),
                        size: 2,
                    },
                ],
            },
            SearchGroup {
                name: None,
                variants: vec![TorrentVariant {
                    torrent_id: TorrentId::new("c"),
                    size: 2,
                }],
            },
        ];

        assert_eq!(find_exact_size(&groups, 2).unwrap().torrent_id, TorrentId::new("b"));
        assert!(find_exact_size(&groups, 3).is_none());
    }
}
