//! Types stored in the checkpoint database.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::fetch::{NetworkCause, Outcome};
use crate::target::Target;

/// Controller run identifier.
pub type RunId = i64;

/// Crawl stage a run belongs to, stored as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Search,
    ItemPage,
    Download,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Search => "search",
            Stage::ItemPage => "item_page",
            Stage::Download => "download",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "search" => Some(Stage::Search),
            "item_page" => Some(Stage::ItemPage),
            "download" => Some(Stage::Download),
            _ => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// An outcome as persisted. Payloads are reduced to their length and SHA-256.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeRecord {
    Success { status: u32, bytes: u64, sha256: String },
    HttpFailure { status: u32 },
    NetworkFailure { cause: NetworkCause },
    Skipped { reason: String },
}

impl OutcomeRecord {
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeRecord::Success { .. })
    }
}

impl From<&Outcome> for OutcomeRecord {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Success { body, status } => OutcomeRecord::Success {
                status: *status,
                bytes: body.len() as u64,
                sha256: hex::encode(Sha256::digest(body)),
            },
            Outcome::HttpFailure { status } => OutcomeRecord::HttpFailure { status: *status },
            Outcome::NetworkFailure(cause) => OutcomeRecord::NetworkFailure {
                cause: cause.clone(),
            },
            Outcome::Skipped { reason } => OutcomeRecord::Skipped {
                reason: reason.clone(),
            },
        }
    }
}

/// One (target, outcome) pair of a round, in batch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointEntry {
    pub url: String,
    pub key: String,
    pub outcome: OutcomeRecord,
}

/// Immutable snapshot of one round's outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    pub round: u32,
    pub entries: Vec<CheckpointEntry>,
}

impl CheckpointRecord {
    pub fn from_outcomes(round: u32, outcomes: &[(Target, Outcome)]) -> Self {
        let entries = outcomes
            .iter()
            .map(|(target, outcome)| CheckpointEntry {
                url: target.url().to_string(),
                key: target.key().to_string(),
                outcome: OutcomeRecord::from(outcome),
            })
            .collect();
        Self { round, entries }
    }

    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.entries.len() - self.success_count()
    }

    /// Targets of this round whose outcome was not a success, in batch order.
    pub fn unresolved(&self) -> Vec<Target> {
        self.entries
            .iter()
            .filter(|e| !e.outcome.is_success())
            .map(|e| Target::from_parts(e.url.clone(), e.key.clone()))
            .collect()
    }
}

/// Summary row for `harvest checkpoints`.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub id: RunId,
    pub stage: Option<Stage>,
    pub target_count: i64,
    pub started_at: i64,
    pub rounds: i64,
    /// Failures in the latest round (None when no round was written).
    pub last_failures: Option<i64>,
}

/// A round as read back from the database.
#[derive(Debug, Clone)]
pub struct StoredRound {
    pub run_id: RunId,
    pub created_at: i64,
    pub record: CheckpointRecord,
}
