use crate::error::PhaseKind;
use crate::model::LifelineUsage;

/// Snapshot of a running session, for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub index: usize,
    pub total: usize,
    pub accumulated_money: u64,
    pub guaranteed_money: u64,
    pub phase: PhaseKind,
    pub lifelines: LifelineUsage,
    /// What a correct answer to the current question is worth; `None` once finished.
    pub current_prize: Option<u64>,
}
