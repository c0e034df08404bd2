use crate::target::Target;

/// Controller state machine. Working sets only change between rounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundState {
    /// Nothing attempted yet.
    Pending(Vec<Target>),
    /// About to run `round` (1-based) over `targets`.
    Retrying { round: u32, targets: Vec<Target> },
    /// Every target succeeded.
    Succeeded,
    /// Budget exhausted; `failed` never succeeded.
    GaveUp { failed: Vec<Target> },
}

impl RoundState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RoundState::Succeeded | RoundState::GaveUp { .. })
    }
}

/// Per-round counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub round: u32,
    pub attempted: usize,
    pub succeeded: usize,
}

/// Aggregate result of a controller run. Individual failure causes are not
/// surfaced here; they are in the checkpoint records and the log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    pub rounds: Vec<RoundSummary>,
    /// Targets fetched successfully (including ones whose consumer failed).
    pub succeeded: usize,
    /// Targets that exhausted the retry budget, in their last batch order.
    pub failed: Vec<Target>,
}

impl HarvestReport {
    pub fn rounds_run(&self) -> u32 {
        self.rounds.len() as u32
    }

    pub fn gave_up(&self) -> bool {
        !self.failed.is_empty()
    }
}
