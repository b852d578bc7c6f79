use std::fmt;

use thiserror::Error;

use crate::model::{LifelineKind, QuestionError, SettingsError};

/// Coarse session phase, used to report where an operation was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    AwaitingSelection,
    AwaitingConfirmation,
    ResultShown,
    Terminal,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PhaseKind::AwaitingSelection => "awaiting a selection",
            PhaseKind::AwaitingConfirmation => "awaiting confirmation",
            PhaseKind::ResultShown => "showing a result",
            PhaseKind::Terminal => "finished",
        };
        f.write_str(label)
    }
}

/// Errors emitted by the quiz engine.
///
/// A rejected operation never changes session state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("{operation} is not allowed while the session is {phase}")]
    InvalidState {
        operation: &'static str,
        phase: PhaseKind,
    },

    #[error("no option has been selected")]
    NoSelection,

    #[error("{0} lifeline already used on this question")]
    AlreadyUsed(LifelineKind),

    #[error("option {index} is not available")]
    OutOfRange { index: usize },

    #[error(transparent)]
    InvalidQuestion(#[from] QuestionError),

    #[error(transparent)]
    InvalidSettings(#[from] SettingsError),
}
