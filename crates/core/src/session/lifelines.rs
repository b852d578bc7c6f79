use rand::Rng;

use crate::error::QuizError;
use crate::model::{LifelineKind, LifelineUsage, OPTION_COUNT, QuestionRecord};

/// One-shot gating for the lifelines of the current question.
///
/// Reset whenever the session moves to a new question, so every question
/// grants each lifeline once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifelineController {
    usage: LifelineUsage,
    eliminated: [bool; OPTION_COUNT],
}

impl LifelineController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn usage(&self) -> LifelineUsage {
        self.usage
    }

    #[must_use]
    pub fn is_eliminated(&self, index: usize) -> bool {
        self.eliminated.get(index).copied().unwrap_or(false)
    }

    /// Option indices still presentable to the player.
    #[must_use]
    pub fn visible_options(&self) -> Vec<usize> {
        (0..OPTION_COUNT).filter(|&i| !self.eliminated[i]).collect()
    }

    /// # Errors
    ///
    /// Returns `QuizError::AlreadyUsed` if `kind` was spent on this question.
    pub fn ensure_available(&self, kind: LifelineKind) -> Result<(), QuizError> {
        if self.usage.is_used(kind) {
            return Err(QuizError::AlreadyUsed(kind));
        }
        Ok(())
    }

    pub(crate) fn use_skip(&mut self) -> Result<(), QuizError> {
        self.ensure_available(LifelineKind::Skip)?;
        self.usage.mark_used(LifelineKind::Skip);
        Ok(())
    }

    /// Hide two of the three wrong options, keeping one chosen uniformly at random.
    pub(crate) fn eliminate<R: Rng + ?Sized>(
        &mut self,
        question: &QuestionRecord,
        rng: &mut R,
    ) -> Result<[usize; 2], QuizError> {
        self.ensure_available(LifelineKind::Eliminate)?;

        let wrong: Vec<usize> = (0..OPTION_COUNT)
            .filter(|&i| !question.is_correct(i))
            .collect();
        let keep = wrong[rng.random_range(0..wrong.len())];
        let mut removed = [0_usize; 2];
        for (slot, index) in removed
            .iter_mut()
            .zip(wrong.into_iter().filter(|&i| i != keep))
        {
            *slot = index;
        }

        for &index in &removed {
            self.eliminated[index] = true;
        }
        self.usage.mark_used(LifelineKind::Eliminate);
        Ok(removed)
    }

    pub(crate) fn hint(&mut self, question: &QuestionRecord) -> Result<String, QuizError> {
        self.ensure_available(LifelineKind::Hint)?;
        self.usage.mark_used(LifelineKind::Hint);
        Ok(question.hint().to_owned())
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn question(correct: usize) -> QuestionRecord {
        QuestionRecord::new(
            QuestionId::new(1),
            "Capital of France?",
            ["Paris", "Rome", "Berlin", "Madrid"].map(String::from),
            correct,
            "It has a famous iron tower.",
        )
        .unwrap()
    }

    #[test]
    fn eliminate_keeps_correct_and_one_wrong() {
        let q = question(2);
        for seed in 0..32 {
            let mut controller = LifelineController::new();
            let mut rng = StdRng::seed_from_u64(seed);
            let removed = controller.eliminate(&q, &mut rng).unwrap();

            assert!(!removed.contains(&2));
            assert_ne!(removed[0], removed[1]);
            let visible = controller.visible_options();
            assert_eq!(visible.len(), 2);
            assert!(visible.contains(&2));
        }
    }

    #[test]
    fn eliminate_can_keep_any_wrong_option() {
        let q = question(0);
        let mut kept = [false; OPTION_COUNT];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let mut controller = LifelineController::new();
            controller.eliminate(&q, &mut rng).unwrap();
            for index in controller.visible_options() {
                kept[index] = true;
            }
        }
        assert_eq!(kept, [true; OPTION_COUNT]);
    }

    #[test]
    fn each_kind_is_one_shot() {
        let q = question(1);
        let mut controller = LifelineController::new();
        let mut rng = StdRng::seed_from_u64(1);

        controller.eliminate(&q, &mut rng).unwrap();
        assert_eq!(controller.hint(&q).unwrap(), "It has a famous iron tower.");
        assert_eq!(
            controller.eliminate(&q, &mut rng).unwrap_err(),
            QuizError::AlreadyUsed(LifelineKind::Eliminate)
        );
        assert_eq!(
            controller.hint(&q).unwrap_err(),
            QuizError::AlreadyUsed(LifelineKind::Hint)
        );
        assert!(controller.use_skip().is_ok());
    }

    #[test]
    fn reset_restores_all_lifelines() {
        let q = question(3);
        let mut controller = LifelineController::new();
        controller.eliminate(&q, &mut StdRng::seed_from_u64(3)).unwrap();
        controller.use_skip().unwrap();

        controller.reset();
        assert_eq!(controller.usage(), LifelineUsage::default());
        assert_eq!(controller.visible_options(), vec![0, 1, 2, 3]);
    }
}
