//! `harvest checkpoints` – list checkpointed runs or show one run's rounds.

use anyhow::Result;
use harvest_core::checkpoint::{CheckpointDb, RunId, Stage};

pub async fn run_checkpoints(stage: Option<Stage>, run: Option<RunId>) -> Result<()> {
    let db = CheckpointDb::open_default().await?;
    match run {
        Some(run_id) => show_run(&db, run_id).await,
        None => list_runs(&db, stage).await,
    }
}

async fn list_runs(db: &CheckpointDb, stage: Option<Stage>) -> Result<()> {
    let runs = db.list_runs(stage).await?;
    if runs.is_empty() {
        println!("No checkpointed runs.");
        return Ok(());
    }
    println!(
        "{:<6} {:<10} {:<8} {:<7} {:<8} {}",
        "ID", "STAGE", "TARGETS", "ROUNDS", "FAILED", "STARTED"
    );
    for r in runs {
        let stage = r
            .stage
            .map(|s| s.to_string())
            .unwrap_or_else(|| "?".to_string());
        let failed = r
            .last_failures
            .map(|f| f.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<10} {:<8} {:<7} {:<8} {}",
            r.id, stage, r.target_count, r.rounds, failed, r.started_at
        );
    }
    Ok(())
}

async fn show_run(db: &CheckpointDb, run_id: RunId) -> Result<()> {
    let rounds = db.rounds(run_id).await?;
    if rounds.is_empty() {
        println!("No rounds recorded for run {}.", run_id);
        return Ok(());
    }
    println!("{:<6} {:<8} {:<8} {}", "ROUND", "OK", "FAILED", "WRITTEN");
    for r in &rounds {
        println!(
            "{:<6} {:<8} {:<8} {}",
            r.record.round,
            r.record.success_count(),
            r.record.failure_count(),
            r.created_at
        );
    }
    let unresolved = db.unresolved_targets(run_id).await?;
    if !unresolved.is_empty() {
        println!("Unresolved after the last round:");
        for t in unresolved {
            println!("  {}", t.url());
        }
    }
    Ok(())
}
