use std::sync::Arc;

use super::state::{HarvestReport, RoundState, RoundSummary};
use crate::batch::{run_batch, BatchProgress, ProgressStats};
use crate::checkpoint::{CheckpointRecord, CheckpointSink};
use crate::fetch::{FetchWorker, Outcome, Transport};
use crate::identity::IdentityPool;
use crate::target::Target;

/// Drives rounds of `run_batch` until the working set is empty or the budget is spent.
pub struct RetryController<T, S> {
    worker: Arc<FetchWorker<T>>,
    identities: Arc<IdentityPool>,
    sink: S,
    retry_budget: u32,
    pool_size: usize,
    label: String,
    progress_tx: Option<tokio::sync::mpsc::Sender<ProgressStats>>,
}

impl<T, S> RetryController<T, S>
where
    T: Transport + 'static,
    S: CheckpointSink,
{
    pub fn new(
        worker: Arc<FetchWorker<T>>,
        identities: Arc<IdentityPool>,
        sink: S,
        retry_budget: u32,
        pool_size: usize,
    ) -> Self {
        Self {
            worker,
            identities,
            sink,
            retry_budget,
            pool_size: pool_size.max(1),
            label: "fetch".to_string(),
            progress_tx: None,
        }
    }

    /// Name used in log lines and progress snapshots (e.g. the stage name).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn with_progress(mut self, tx: tokio::sync::mpsc::Sender<ProgressStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// Fetch `targets`, retrying failures round by round.
    ///
    /// After each round is checkpointed, `on_success` receives every target
    /// fetched in that round with its payload. A consumer error is logged and
    /// stays with that target; it does not make the target retry.
    pub async fn run<F>(&self, targets: Vec<Target>, mut on_success: F) -> HarvestReport
    where
        F: FnMut(&Target, &[u8]) -> anyhow::Result<()>,
    {
        let mut report = HarvestReport::default();
        let mut state = if targets.is_empty() {
            RoundState::Succeeded
        } else {
            RoundState::Pending(targets)
        };

        loop {
            state = match state {
                RoundState::Pending(targets) if self.retry_budget == 0 => {
                    RoundState::GaveUp { failed: targets }
                }
                RoundState::Pending(targets) => RoundState::Retrying { round: 1, targets },
                RoundState::Retrying { round, targets } => {
                    let attempted = targets.len();
                    let outcomes = self.run_round(round, targets).await;

                    let record = CheckpointRecord::from_outcomes(round, &outcomes);
                    if let Err(e) = self.sink.checkpoint(&record).await {
                        tracing::warn!(label = %self.label, round, "checkpoint write failed: {:#}", e);
                    }

                    let mut failed = Vec::new();
                    let mut succeeded = 0usize;
                    for (target, outcome) in outcomes {
                        match outcome {
                            Outcome::Success { body, .. } => {
                                succeeded += 1;
                                if let Err(e) = on_success(&target, &body) {
                                    tracing::warn!(url = target.url(), "could not consume payload: {:#}", e);
                                }
                            }
                            other => {
                                tracing::debug!(url = target.url(), round, "attempt failed: {}", other);
                                failed.push(target);
                            }
                        }
                    }

                    report.succeeded += succeeded;
                    report.rounds.push(RoundSummary {
                        round,
                        attempted,
                        succeeded,
                    });
                    tracing::info!(
                        label = %self.label,
                        round,
                        attempted,
                        succeeded,
                        failed = failed.len(),
                        "round finished"
                    );

                    if failed.is_empty() {
                        RoundState::Succeeded
                    } else if round >= self.retry_budget {
                        RoundState::GaveUp { failed }
                    } else {
                        RoundState::Retrying {
                            round: round + 1,
                            targets: failed,
                        }
                    }
                }
                RoundState::Succeeded => return report,
                RoundState::GaveUp { failed } => {
                    tracing::warn!(
                        label = %self.label,
                        "could not fetch {} target(s) after {} round(s)",
                        failed.len(),
                        report.rounds_run()
                    );
                    for t in &failed {
                        tracing::warn!(label = %self.label, "permanently failed: {}", t.url());
                    }
                    report.failed = failed;
                    return report;
                }
            };
        }
    }

    /// One batch on a blocking thread. A batch that cannot be joined (panic in
    /// the scheduler itself) comes back as all-skipped so the round still counts.
    async fn run_round(&self, round: u32, targets: Vec<Target>) -> Vec<(Target, Outcome)> {
        let worker = Arc::clone(&self.worker);
        let identities = Arc::clone(&self.identities);
        let pool_size = self.pool_size;
        let progress = BatchProgress::new(
            format!("{} round {}", self.label, round),
            targets.len(),
            self.progress_tx.clone(),
        );
        let fallback = targets.clone();

        let joined = tokio::task::spawn_blocking(move || {
            run_batch(&targets, &identities, &worker, pool_size, Some(&progress))
        })
        .await;

        match joined {
            Ok(outcomes) => outcomes,
            Err(e) => {
                tracing::error!(label = %self.label, round, "batch task failed: {}", e);
                fallback
                    .into_iter()
                    .map(|t| (t, Outcome::skipped("batch task failed")))
                    .collect()
            }
        }
    }
}
