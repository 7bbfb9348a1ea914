//! The reconciliation run.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::config::{self, ConfigError, RunConfig};
use crate::error::{Result, ResultExt};
use crate::ledger::ResumeLedger;
use crate::metadata::{self, MetadataBackend, MetadataError};
use crate::reconcile::{Engine, TrackerContext};
use crate::tracker::GazelleClient;

/// Reconcile the music library against every configured tracker
pub fn cmd_run(rt: &Runtime, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    rt.block_on(run(&config))?;
    Ok(())
}

async fn run(config: &RunConfig) -> Result<()> {
    let mut engine = build_engine(config).await?;

    let cancel = engine.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current album");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let summary = engine.run().await?;
    summary.log();
    Ok(())
}

/// Locate and load the config file
pub(crate) fn load_config(explicit: Option<&Path>) -> Result<RunConfig> {
    let path = config::resolve_path(explicit).ok_or(ConfigError::NotFound)?;
    Ok(config::load(&path)?)
}

/// Everything that must succeed before the first album is touched
async fn build_engine(config: &RunConfig) -> Result<Engine> {
    config.prepare_directories()?;

    if config.metadata_backend == MetadataBackend::Mediainfo
        && !metadata::is_mediainfo_available()
    {
        // Every album would be recorded as not found
        return Err(MetadataError::ToolNotFound("mediainfo".to_string()).into());
    }

    let ledger = ResumeLedger::open(&config.logs_directory, &config.trackers)?;
    for tracker in &config.trackers {
        if let Some(recorded) = ledger.tracker(&tracker.name) {
            info!(
                "{}: {} album(s) already recorded will be skipped",
                recorded.name(),
                recorded.skip_count()
            );
        }
    }

    let mut trackers = Vec::with_capacity(config.trackers.len());
    for tracker in &config.trackers {
        let client = GazelleClient::connect(tracker)
            .await
            .with_context(format!("Cannot connect to tracker {}", tracker.name))?;
        info!("Connected to {}", client.name());

        trackers.push(TrackerContext {
            name: client.name().to_string(),
            torrent_directory: tracker.torrent_directory.clone(),
            api: Arc::new(client),
        });
    }

    Ok(Engine::new(
        config,
        ledger,
        trackers,
        metadata::provider_for(config.metadata_backend),
    ))
}
