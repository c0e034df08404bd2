//! Checkpoint store: one write-once record of outcomes per retry round.
//!
//! Records live in SQLite (via sqlx) under the XDG state directory. Each
//! controller run gets a row in `runs`; each of its rounds a row in
//! `checkpoints` holding the ordered (target, outcome) list as JSON. The latest
//! round of a run is enough to re-derive which targets were still failing.

mod db;
mod reads;
mod sink;
mod types;
mod writes;


pub use db::CheckpointDb;
pub use sink::{CheckpointSink, NoCheckpoints, RunCheckpoints};
pub use types::{
    CheckpointEntry, CheckpointRecord, OutcomeRecord, RunId, RunSummary, Stage, StoredRound,
};
