//! Shared wiring for the crawling commands.

use anyhow::Result;
use harvest_core::batch::ProgressStats;
use harvest_core::checkpoint::CheckpointDb;
use harvest_core::config::HarvestConfig;
use harvest_core::fetch::{CurlTransport, FetchPolicy, FetchWorker};
use harvest_core::pipeline::{build_identity_pool, Harvester, Layout};
use std::sync::Arc;

/// Harvester over libcurl with the configured identities. Checkpointing is
/// skipped (with a warning) if the database cannot be opened.
pub async fn build_harvester(
    cfg: &HarvestConfig,
    layout: &Layout,
    progress_tx: tokio::sync::mpsc::Sender<ProgressStats>,
) -> Result<Harvester<CurlTransport>> {
    let worker = Arc::new(FetchWorker::new(
        CurlTransport::from_config(cfg),
        FetchPolicy::from_config(cfg),
    ));
    let identities = build_identity_pool(cfg, layout, &worker).await?;
    let harvester = Harvester::new(cfg.clone(), layout.clone(), worker, identities)
        .with_progress(progress_tx);

    match CheckpointDb::open_default().await {
        Ok(db) => Ok(harvester.with_checkpoints(db)),
        Err(e) => {
            tracing::warn!("checkpoint database unavailable, not checkpointing: {:#}", e);
            Ok(harvester)
        }
    }
}
