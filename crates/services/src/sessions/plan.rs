use rand::Rng;
use rand::rng;
use rand::seq::SliceRandom;

use quiz_core::model::{DifficultyMode, QuestionRecord};

/// Questions chosen for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionPlan {
    pub questions: Vec<QuestionRecord>,
    /// How many records the source returned before trimming.
    pub fetched: usize,
    /// False when the source could not fill a whole session.
    pub complete: bool,
}

impl QuestionPlan {
    /// Whether a session should start from this plan.
    #[must_use]
    pub fn is_playable(&self, require_full_set: bool) -> bool {
        !self.questions.is_empty() && (self.complete || !require_full_set)
    }
}

/// Turns a fetched question list into a session-sized, optionally shuffled plan.
pub struct QuestionPlanner {
    total_questions: usize,
    shuffle: bool,
}

impl QuestionPlanner {
    #[must_use]
    pub fn new(total_questions: usize) -> Self {
        Self {
            total_questions,
            shuffle: false,
        }
    }

    /// Enable or disable shuffling before selection.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn build(&self, mode: DifficultyMode, fetched: Vec<QuestionRecord>) -> QuestionPlan {
        self.build_with_rng(mode, fetched, &mut rng())
    }

    /// Automatic mode shuffles only inside runs of equal difficulty so the
    /// easy-to-hard order from the source survives.
    pub fn build_with_rng<R: Rng + ?Sized>(
        &self,
        mode: DifficultyMode,
        mut fetched: Vec<QuestionRecord>,
        rng: &mut R,
    ) -> QuestionPlan {
        let fetched_len = fetched.len();

        if self.shuffle {
            match mode {
                DifficultyMode::Fixed(_) => fetched.as_mut_slice().shuffle(rng),
                DifficultyMode::Automatic => {
                    for run in fetched.chunk_by_mut(|a, b| a.difficulty_tier() == b.difficulty_tier())
                    {
                        run.shuffle(rng);
                    }
                }
            }
        }

        fetched.truncate(self.total_questions);
        QuestionPlan {
            complete: fetched.len() >= self.total_questions,
            questions: fetched,
            fetched: fetched_len,
        }
    }
}
