//! Checkpoint write operations: start a run, append a round.

use anyhow::{Context, Result};

use super::db::{unix_timestamp, CheckpointDb};
use super::types::{CheckpointRecord, RunId, Stage};

impl CheckpointDb {
    /// Register a new controller run for `stage`.
    pub async fn begin_run(&self, stage: Stage, target_count: usize) -> Result<RunId> {
        let now = unix_timestamp();
        let id = sqlx::query(
            r#"
            INSERT INTO runs (stage, target_count, started_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(stage.as_str())
        .bind(target_count as i64)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    /// Append the record for one round. Fails if that round was already written.
    pub async fn write_round(&self, run_id: RunId, record: &CheckpointRecord) -> Result<()> {
        let now = unix_timestamp();
        let entries_json =
            serde_json::to_string(&record.entries).context("serialize checkpoint entries")?;
        sqlx::query(
            r#"
            INSERT INTO checkpoints (
                run_id, round, created_at, success_count, failure_count, entries_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(run_id)
        .bind(record.round as i64)
        .bind(now)
        .bind(record.success_count() as i64)
        .bind(record.failure_count() as i64)
        .bind(entries_json)
        .execute(&self.pool)
        .await
        .with_context(|| format!("write checkpoint run {} round {}", run_id, record.round))?;
        Ok(())
    }
}
