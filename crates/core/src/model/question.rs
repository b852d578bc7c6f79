use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::difficulty::Tier;
use crate::model::ids::QuestionId;

/// Number of answer options every question carries.
pub const OPTION_COUNT: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {id} has an empty statement")]
    EmptyStatement { id: QuestionId },

    #[error("question {id} has an empty option at index {index}")]
    EmptyOption { id: QuestionId, index: usize },

    #[error("question {id} marks option {index} as correct, expected 0 to 3")]
    CorrectOptionOutOfRange { id: QuestionId, index: usize },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question as supplied by a question source.
///
/// Immutable once loaded; the session only reads from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    id: QuestionId,
    statement: String,
    options: [String; OPTION_COUNT],
    correct_option: usize,
    #[serde(default)]
    difficulty_tier: Option<Tier>,
    #[serde(default)]
    hint: String,
}

impl QuestionRecord {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the statement or any option is blank, or the
    /// correct option index is not in `0..4`.
    pub fn new(
        id: QuestionId,
        statement: impl Into<String>,
        options: [String; OPTION_COUNT],
        correct_option: usize,
        hint: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let question = Self {
            id,
            statement: statement.into(),
            options,
            correct_option,
            difficulty_tier: None,
            hint: hint.into(),
        };
        question.validate()?;
        Ok(question)
    }

    /// Tag the question with its own difficulty metadata.
    #[must_use]
    pub fn with_difficulty_tier(mut self, tier: Tier) -> Self {
        self.difficulty_tier = Some(tier);
        self
    }

    /// Re-check invariants, e.g. after deserializing from an untrusted source.
    ///
    /// # Errors
    ///
    /// Same as [`QuestionRecord::new`].
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.statement.trim().is_empty() {
            return Err(QuestionError::EmptyStatement { id: self.id });
        }
        if let Some(index) = self.options.iter().position(|o| o.trim().is_empty()) {
            return Err(QuestionError::EmptyOption { id: self.id, index });
        }
        if self.correct_option >= OPTION_COUNT {
            return Err(QuestionError::CorrectOptionOutOfRange {
                id: self.id,
                index: self.correct_option,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn statement(&self) -> &str {
        &self.statement
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    #[must_use]
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn correct_option(&self) -> usize {
        self.correct_option
    }

    #[must_use]
    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_option
    }

    /// Difficulty the question was authored with. Not used for scoring.
    #[must_use]
    pub fn difficulty_tier(&self) -> Option<Tier> {
        self.difficulty_tier
    }

    #[must_use]
    pub fn hint(&self) -> &str {
        &self.hint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> [String; OPTION_COUNT] {
        ["a", "b", "c", "d"].map(String::from)
    }

    #[test]
    fn rejects_correct_option_outside_range() {
        let err = QuestionRecord::new(QuestionId::new(1), "Q?", options(), 4, "").unwrap_err();
        assert_eq!(
            err,
            QuestionError::CorrectOptionOutOfRange {
                id: QuestionId::new(1),
                index: 4
            }
        );
    }

    #[test]
    fn rejects_blank_statement_and_options() {
        let err = QuestionRecord::new(QuestionId::new(2), "  ", options(), 0, "").unwrap_err();
        assert!(matches!(err, QuestionError::EmptyStatement { .. }));

        let mut opts = options();
        opts[2] = String::new();
        let err = QuestionRecord::new(QuestionId::new(3), "Q?", opts, 0, "").unwrap_err();
        assert!(matches!(err, QuestionError::EmptyOption { index: 2, .. }));
    }

    #[test]
    fn deserialized_record_can_be_revalidated() {
        let json = r#"{
            "id": 9,
            "statement": "2 + 2?",
            "options": ["1", "2", "3", "4"],
            "correct_option": 7
        }"#;
        let record: QuestionRecord = serde_json::from_str(json).unwrap();
        assert!(record.hint().is_empty());
        assert!(record.difficulty_tier().is_none());
        assert!(record.validate().is_err());
    }
}
