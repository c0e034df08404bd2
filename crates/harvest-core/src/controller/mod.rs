//! Retry controller: bounded rounds over the failure set.
//!
//! Round 1 runs the whole (deduped) target list through the batch scheduler.
//! Each later round re-submits only the targets whose latest outcome was not a
//! success. Skipped counts as a failure. The controller stops when nothing is
//! left (`Succeeded`) or after `retry_budget` rounds (`GaveUp`); it never runs
//! a round past the budget.

mod run;
mod state;


pub use run::RetryController;
pub use state::{HarvestReport, RoundState, RoundSummary};
