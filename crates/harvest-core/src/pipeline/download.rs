use anyhow::{Context, Result};

use super::{Harvester, StageReport};
use crate::artifact::{ArtifactStore, WriteOutcome};
use crate::checkpoint::Stage;
use crate::dedup;
use crate::fetch::Transport;
use crate::target::{targets_from_lines, KeyRule};

/// Results of the download stage.
#[derive(Debug, Clone)]
pub struct DownloadReport {
    /// Well-formed URLs in `download_urls.txt`.
    pub listed: usize,
    /// Targets dropped because their artifact already existed.
    pub already_present: usize,
    /// Targets left out by `max_per_run`.
    pub deferred: usize,
    pub stage: StageReport,
    /// Artifacts written this run.
    pub written: usize,
}

impl<T: Transport + 'static> Harvester<T> {
    /// Fetch every listed text not yet in `data/`, up to `max_per_run`.
    pub async fn download(&self) -> Result<DownloadReport> {
        let list_path = self.layout.download_urls_path();
        let text = tokio::fs::read_to_string(&list_path)
            .await
            .with_context(|| format!("read {}", list_path.display()))?;
        let rule = KeyRule::after(self.config.download.key_delimiter.clone());
        let listed = targets_from_lines(text.lines(), &rule);
        let listed_count = listed.len();

        let store = ArtifactStore::text(self.layout.data_dir());
        store.ensure_dir()?;
        let mut targets = dedup::filter(listed, &store.keys()?);
        let already_present = listed_count - targets.len();

        let mut deferred = 0;
        if let Some(max) = self.config.download.max_per_run {
            if targets.len() > max {
                deferred = targets.len() - max;
                tracing::info!(max, deferred, "capping downloads for this run");
                targets.truncate(max);
            }
        }

        let mut written = 0usize;
        let stage = self
            .run_stage(Stage::Download, targets, |target, body| {
                if store.write(target, body)? == WriteOutcome::Written {
                    written += 1;
                }
                Ok(())
            })
            .await;

        Ok(DownloadReport {
            listed: listed_count,
            already_present,
            deferred,
            stage,
            written,
        })
    }
}
