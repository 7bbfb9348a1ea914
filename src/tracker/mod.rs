//! Tracker integration - searches remote catalogs and downloads torrent files.
//!
//! # Architecture
//!
//! - **Domain models** (`domain.rs`) - Internal types used by the reconciler
//! - **API DTOs** (`dto.rs`) - Exact Gazelle JSON response shapes
//! - **Adapter** (`adapter.rs`) - Converts DTOs to domain models
//! - **Client** (`client.rs`) - Authenticated HTTP client for one tracker
//! - **Rate limiter** (`rate_limit.rs`) - Per-tracker request throttling
//! - **Traits** (`traits.rs`) - The seam the engine depends on, plus mocks

pub mod adapter;
pub mod client;
pub mod domain;
pub mod dto;
pub mod rate_limit;
pub mod traits;

pub use client::GazelleClient;
pub use domain::{SearchGroup, TorrentFile, TorrentId, TorrentVariant, TrackerError};
pub use rate_limit::RateLimiter;
pub use traits::TrackerApi;
