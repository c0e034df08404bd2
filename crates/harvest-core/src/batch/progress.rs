//! Progress reporting for a running batch.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Snapshot of batch progress (CLI-friendly).
#[derive(Debug, Clone)]
pub struct ProgressStats {
    /// Human label for the batch, e.g. `"download round 2"`.
    pub label: String,
    /// Targets with an outcome so far.
    pub completed: usize,
    /// Targets in the batch.
    pub total: usize,
    /// Successes among `completed`.
    pub succeeded: usize,
    /// Elapsed time since the batch started (seconds).
    pub elapsed_secs: f64,
}

impl ProgressStats {
    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.completed as f64 / self.total as f64).min(1.0)
    }

    /// Completed targets per second (0 if elapsed is 0).
    pub fn per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.completed as f64 / self.elapsed_secs
    }
}

/// Shared counters updated by workers. `completed` only ever increases.
#[derive(Debug)]
pub struct BatchProgress {
    label: String,
    total: usize,
    completed: AtomicUsize,
    succeeded: AtomicUsize,
    started: Instant,
    tx: Option<tokio::sync::mpsc::Sender<ProgressStats>>,
}

impl BatchProgress {
    pub fn new(
        label: impl Into<String>,
        total: usize,
        tx: Option<tokio::sync::mpsc::Sender<ProgressStats>>,
    ) -> Self {
        Self {
            label: label.into(),
            total,
            completed: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
            started: Instant::now(),
            tx,
        }
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::Relaxed)
    }

    /// Record one finished target and publish a snapshot. Intermediate
    /// snapshots are dropped when the channel is full; the final one waits for
    /// room, so callers must be off the async runtime (worker or blocking threads).
    pub(crate) fn record(&self, success: bool) {
        if success {
            self.succeeded.fetch_add(1, Ordering::Relaxed);
        }
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(tx) = &self.tx {
            let stats = ProgressStats {
                label: self.label.clone(),
                completed,
                total: self.total,
                succeeded: self.succeeded(),
                elapsed_secs: self.started.elapsed().as_secs_f64(),
            };
            if completed >= self.total {
                let _ = tx.blocking_send(stats);
            } else {
                let _ = tx.try_send(stats);
            }
        }
    }
}
