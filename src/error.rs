//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while the
//! CLI uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum
//! - Module-specific errors (e.g., [`ConfigError`], [`TrackerError`]) for
//!   detailed handling
//!
//! # Example
//!
//! ```ignore
//! use tracker_sync::error::{Error, Result};
//!
//! fn open(path: &Path) -> Result<RunConfig> {
//!     let config = config::load(path)?;  // Config errors auto-convert
//!     config.prepare_directories()?;
//!     Ok(config)
//! }
//! ```

use crate::config::ConfigError;
use crate::ledger::LedgerError;
use crate::metadata::MetadataError;
use crate::scanner::ScanError;
use crate::tracker::TrackerError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid or unreadable configuration. Always fatal.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Music root or album folder could not be read
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// Tracker transport, API or download failure
    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),

    /// Log file could not be opened, read or appended to
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, TrackerError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Tracker(e).context(ctx))
    }
}
