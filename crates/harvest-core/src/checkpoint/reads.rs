//! Checkpoint read operations: runs, rounds, and recovery of the failed set.

use anyhow::{Context, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::db::CheckpointDb;
use super::types::{CheckpointRecord, RunId, RunSummary, Stage, StoredRound};
use crate::target::Target;

const RUN_SUMMARY_SELECT: &str = r#"
    SELECT r.id, r.stage, r.target_count, r.started_at,
           (SELECT COUNT(*) FROM checkpoints c WHERE c.run_id = r.id) AS rounds,
           (SELECT c.failure_count FROM checkpoints c
             WHERE c.run_id = r.id ORDER BY c.round DESC LIMIT 1) AS last_failures
    FROM runs r
"#;

fn run_summary(row: &SqliteRow) -> RunSummary {
    let stage: String = row.get("stage");
    RunSummary {
        id: row.get("id"),
        stage: Stage::parse(&stage),
        target_count: row.get("target_count"),
        started_at: row.get("started_at"),
        rounds: row.get("rounds"),
        last_failures: row.get("last_failures"),
    }
}

fn stored_round(row: &SqliteRow) -> Result<StoredRound> {
    let run_id: i64 = row.get("run_id");
    let round: i64 = row.get("round");
    let entries_json: String = row.get("entries_json");
    let entries = serde_json::from_str(&entries_json)
        .with_context(|| format!("parse checkpoint run {} round {}", run_id, round))?;
    Ok(StoredRound {
        run_id,
        created_at: row.get("created_at"),
        record: CheckpointRecord {
            round: round as u32,
            entries,
        },
    })
}

impl CheckpointDb {
    /// All runs, newest first; optionally only those of one stage.
    pub async fn list_runs(&self, stage: Option<Stage>) -> Result<Vec<RunSummary>> {
        let rows = match stage {
            Some(stage) => {
                let sql = format!("{} WHERE r.stage = ?1 ORDER BY r.id DESC", RUN_SUMMARY_SELECT);
                sqlx::query(&sql)
                    .bind(stage.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{} ORDER BY r.id DESC", RUN_SUMMARY_SELECT);
                sqlx::query(&sql).fetch_all(&self.pool).await?
            }
        };
        Ok(rows.iter().map(run_summary).collect())
    }

    /// Most recent run of `stage`, if any.
    pub async fn latest_run(&self, stage: Stage) -> Result<Option<RunSummary>> {
        Ok(self.list_runs(Some(stage)).await?.into_iter().next())
    }

    /// Every round written for `run_id`, in round order.
    pub async fn rounds(&self, run_id: RunId) -> Result<Vec<StoredRound>> {
        let rows = sqlx::query(
            r#"
            SELECT run_id, round, created_at, entries_json
            FROM checkpoints
            WHERE run_id = ?1
            ORDER BY round ASC
            "#,
        )
        .bind(run_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(stored_round).collect()
    }

    /// Last round written for `run_id`.
    pub async fn latest_round(&self, run_id: RunId) -> Result<Option<StoredRound>> {
        let row = sqlx::query(
            r#"
            SELECT run_id, round, created_at, entries_json
            FROM checkpoints
            WHERE run_id = ?1
            ORDER BY round DESC
            LIMIT 1
            "#,
        )
        .bind(run_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(stored_round).transpose()
    }

    /// Targets still failing after the last written round of `run_id`.
    /// Empty if the run has no rounds (nothing was attempted yet).
    pub async fn unresolved_targets(&self, run_id: RunId) -> Result<Vec<Target>> {
        Ok(self
            .latest_round(run_id)
            .await?
            .map(|r| r.record.unresolved())
            .unwrap_or_default())
    }
}
