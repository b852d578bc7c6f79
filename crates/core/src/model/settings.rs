use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ladder::ScoreLadder;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("checkpoint interval must be > 0")]
    InvalidCheckpointInterval,

    #[error("total questions must be > 0")]
    InvalidTotalQuestions,

    #[error("ladder tiers must all have the same, non-zero length")]
    UnevenLadder,

    #[error("ladder block length {ladder} does not match checkpoint interval {interval}")]
    LadderIntervalMismatch { ladder: usize, interval: usize },
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Tunables for a quiz session.
///
/// Defaults: 15 questions, a checkpoint every 5, a 2 second feedback delay and
/// the classic money ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSettings {
    total_questions: usize,
    checkpoint_interval: usize,
    feedback_delay_ms: u32,
    ladder: ScoreLadder,
}

impl QuizSettings {
    pub const DEFAULT_TOTAL_QUESTIONS: usize = 15;
    pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 5;
    pub const DEFAULT_FEEDBACK_DELAY_MS: u32 = 2_000;

    /// Build validated settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` for zero counts or a ladder whose block length
    /// differs from the checkpoint interval.
    pub fn new(
        total_questions: usize,
        checkpoint_interval: usize,
        feedback_delay_ms: u32,
        ladder: ScoreLadder,
    ) -> Result<Self, SettingsError> {
        let settings = Self {
            total_questions,
            checkpoint_interval,
            feedback_delay_ms,
            ladder,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Re-check invariants after deserializing.
    ///
    /// # Errors
    ///
    /// Same as [`QuizSettings::new`].
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.total_questions == 0 {
            return Err(SettingsError::InvalidTotalQuestions);
        }
        if self.checkpoint_interval == 0 {
            return Err(SettingsError::InvalidCheckpointInterval);
        }
        self.ladder.validate()?;
        if self.ladder.block_len() != self.checkpoint_interval {
            return Err(SettingsError::LadderIntervalMismatch {
                ladder: self.ladder.block_len(),
                interval: self.checkpoint_interval,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    #[must_use]
    pub fn checkpoint_interval(&self) -> usize {
        self.checkpoint_interval
    }

    #[must_use]
    pub fn feedback_delay(&self) -> Duration {
        Duration::milliseconds(i64::from(self.feedback_delay_ms))
    }

    #[must_use]
    pub fn ladder(&self) -> &ScoreLadder {
        &self.ladder
    }

    /// True when answering question `index` correctly banks the accumulated money.
    #[must_use]
    pub fn is_checkpoint(&self, index: usize) -> bool {
        (index + 1) % self.checkpoint_interval == 0
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            total_questions: Self::DEFAULT_TOTAL_QUESTIONS,
            checkpoint_interval: Self::DEFAULT_CHECKPOINT_INTERVAL,
            feedback_delay_ms: Self::DEFAULT_FEEDBACK_DELAY_MS,
            ladder: ScoreLadder::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let settings = QuizSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.feedback_delay(), Duration::milliseconds(2_000));
        assert!(settings.is_checkpoint(4));
        assert!(settings.is_checkpoint(14));
        assert!(!settings.is_checkpoint(5));
    }

    #[test]
    fn rejects_ladder_interval_mismatch() {
        let err = QuizSettings::new(15, 4, 2_000, ScoreLadder::default()).unwrap_err();
        assert_eq!(
            err,
            SettingsError::LadderIntervalMismatch {
                ladder: 5,
                interval: 4
            }
        );
    }

    #[test]
    fn rejects_zero_counts() {
        assert_eq!(
            QuizSettings::new(0, 5, 2_000, ScoreLadder::default()).unwrap_err(),
            SettingsError::InvalidTotalQuestions
        );
        assert_eq!(
            QuizSettings::new(15, 0, 2_000, ScoreLadder::default()).unwrap_err(),
            SettingsError::InvalidCheckpointInterval
        );
    }
}
