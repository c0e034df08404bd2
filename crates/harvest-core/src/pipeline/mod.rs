//! The three crawl stages wired onto the retry controller.
//!
//! `discover` walks search pages to item pages to text download URLs,
//! `download` fetches the texts into `data/`, and `preprocess` turns `data/`
//! into one segmented corpus file. Each stage is one controller run and, when
//! a checkpoint database is attached, one checkpoint run.

mod discover;
mod download;
mod identities;
mod layout;

pub use discover::DiscoverReport;
pub use download::DownloadReport;
pub use identities::{build_identity_pool, fetch_proxy_list};
pub use layout::Layout;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::artifact::ArtifactStore;
use crate::batch::ProgressStats;
use crate::checkpoint::{CheckpointDb, RunCheckpoints, RunId, Stage};
use crate::config::HarvestConfig;
use crate::controller::{HarvestReport, RetryController};
use crate::fetch::{FetchWorker, Transport};
use crate::identity::IdentityPool;
use crate::target::Target;
use crate::text::{build_corpus, CorpusStats};

/// Result of one stage's controller run.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: Stage,
    /// Checkpoint run, if the stage was checkpointed.
    pub run_id: Option<RunId>,
    /// Targets handed to the controller.
    pub targets: usize,
    pub report: HarvestReport,
}

/// Runs crawl stages with one worker and identity pool.
pub struct Harvester<T> {
    config: HarvestConfig,
    layout: Layout,
    worker: Arc<FetchWorker<T>>,
    identities: Arc<IdentityPool>,
    checkpoints: Option<CheckpointDb>,
    progress_tx: Option<tokio::sync::mpsc::Sender<ProgressStats>>,
}

impl<T: Transport + 'static> Harvester<T> {
    pub fn new(
        config: HarvestConfig,
        layout: Layout,
        worker: Arc<FetchWorker<T>>,
        identities: IdentityPool,
    ) -> Self {
        Self {
            config,
            layout,
            worker,
            identities: Arc::new(identities),
            checkpoints: None,
            progress_tx: None,
        }
    }

    /// Record every round of every stage in `db`.
    pub fn with_checkpoints(mut self, db: CheckpointDb) -> Self {
        self.checkpoints = Some(db);
        self
    }

    pub fn with_progress(mut self, tx: tokio::sync::mpsc::Sender<ProgressStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    async fn sink_for(&self, stage: Stage, targets: usize) -> Option<RunCheckpoints> {
        let db = self.checkpoints.as_ref()?;
        if targets == 0 {
            return None;
        }
        match db.begin_run(stage, targets).await {
            Ok(run_id) => {
                tracing::debug!(%stage, run_id, "checkpoint run started");
                Some(RunCheckpoints::new(db.clone(), run_id))
            }
            Err(e) => {
                tracing::warn!(%stage, "could not start checkpoint run: {:#}", e);
                None
            }
        }
    }

    /// One controller run over `targets`; `on_success` consumes each fetched payload.
    pub(crate) async fn run_stage<F>(
        &self,
        stage: Stage,
        targets: Vec<Target>,
        on_success: F,
    ) -> StageReport
    where
        F: FnMut(&Target, &[u8]) -> anyhow::Result<()>,
    {
        let count = targets.len();
        let sink = self.sink_for(stage, count).await;
        let run_id = sink.as_ref().map(RunCheckpoints::run_id);

        let mut controller = RetryController::new(
            Arc::clone(&self.worker),
            Arc::clone(&self.identities),
            sink,
            self.config.retry.retry_budget,
            self.config.effective_pool_size(),
        )
        .with_label(stage.as_str());
        if let Some(tx) = &self.progress_tx {
            controller = controller.with_progress(tx.clone());
        }

        tracing::info!(%stage, targets = count, "stage started");
        let report = controller.run(targets, on_success).await;
        StageReport {
            stage,
            run_id,
            targets: count,
            report,
        }
    }
}

/// Build the corpus from `<root>/data` into `out` (default `<root>/corpus.txt`).
pub fn preprocess(layout: &Layout, out: Option<&Path>) -> Result<CorpusStats> {
    let out = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| layout.corpus_path());
    build_corpus(&ArtifactStore::text(layout.data_dir()), &out)
}
