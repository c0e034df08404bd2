//! Where the retry controller sends each round's outcomes.

use anyhow::Result;
use std::future::Future;

use super::db::CheckpointDb;
use super::types::{CheckpointRecord, RunId};

/// Append-only store for round records. Called once per round, from the controller only.
pub trait CheckpointSink {
    fn checkpoint(&self, record: &CheckpointRecord) -> impl Future<Output = Result<()>> + Send;
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCheckpoints;

impl CheckpointSink for NoCheckpoints {
    async fn checkpoint(&self, _record: &CheckpointRecord) -> Result<()> {
        Ok(())
    }
}

/// Writes rounds of one run into the checkpoint database.
#[derive(Clone)]
pub struct RunCheckpoints {
    db: CheckpointDb,
    run_id: RunId,
}

impl RunCheckpoints {
    pub fn new(db: CheckpointDb, run_id: RunId) -> Self {
        Self { db, run_id }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }
}

impl CheckpointSink for RunCheckpoints {
    async fn checkpoint(&self, record: &CheckpointRecord) -> Result<()> {
        self.db.write_round(self.run_id, record).await
    }
}

/// `None` discards records, like `NoCheckpoints`.
impl<S: CheckpointSink + Sync> CheckpointSink for Option<S> {
    async fn checkpoint(&self, record: &CheckpointRecord) -> Result<()> {
        match self {
            Some(sink) => sink.checkpoint(record).await,
            None => Ok(()),
        }
    }
}
