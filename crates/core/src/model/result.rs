use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Won,
    LostWrongAnswer,
    Quit,
    NoQuestionsAvailable,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Won => "won",
            Outcome::LostWrongAnswer => "lost (wrong answer)",
            Outcome::Quit => "quit",
            Outcome::NoQuestionsAvailable => "no questions available",
        };
        f.write_str(label)
    }
}

/// Settlement of a finished session, handed to whoever records games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub outcome: Outcome,
    pub money_awarded: u64,
    /// Answers confirmed by the player, including a final wrong one. Skips are not counted.
    pub questions_answered: u32,
    pub final_question_index: usize,
}

impl SessionResult {
    #[must_use]
    pub fn is_win(&self) -> bool {
        self.outcome == Outcome::Won
    }
}
