//! Batch scheduler: run one round of targets across a bounded worker pool.
//!
//! Target `i` gets identity `i mod N` and proxy `i mod P`, so the same batch
//! always gets the same identity assignment. Outcomes are joined back to their
//! targets by index; the call returns only when every target has one.

mod progress;
mod run;

pub use progress::{BatchProgress, ProgressStats};
pub use run::run_batch;
