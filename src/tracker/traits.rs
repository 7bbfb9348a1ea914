//! Trait definition for tracker API clients.
//!
//! The reconciliation engine only sees [`TrackerApi`], so tests can substitute
//! the mock implementation below for the real HTTP client.

use async_trait::async_trait;

use super::client::GazelleClient;
use super::domain::{SearchGroup, TorrentFile, TorrentId, TrackerError};

/// Remote catalog of one tracker.
#[async_trait]
pub trait TrackerApi: Send + Sync {
    /// Free-text search returning result groups in tracker order.
    async fn search(&self, query: &str) -> Result<Vec<SearchGroup>, TrackerError>;

    /// Download the `.torrent` file for a torrent.
    async fn fetch_torrent(&self, torrent_id: &TorrentId) -> Result<TorrentFile, TrackerError>;
}

#[async_trait]
impl TrackerApi for GazelleClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchGroup>, TrackerError> {
        GazelleClient::search(self, query).await
    }

    async fn fetch_torrent(&self, torrent_id: &TorrentId) -> Result<TorrentFile, TrackerError> {
        GazelleClient::fetch_torrent(self, torrent_id).await
    }
}
