use serde::{Deserialize, Serialize};

use crate::model::{DifficultyMode, SettingsError, Tier};

//
// ─── LADDER ────────────────────────────────────────────────────────────────────
//

/// Money table indexed by tier and position inside a checkpoint block.
///
/// Every tier row has the same length, which is the checkpoint block length.
///
/// # Examples
///
/// ```
/// # use quiz_core::ScoreLadder;
/// # use quiz_core::model::{DifficultyMode, Tier};
/// let ladder = ScoreLadder::default();
/// assert_eq!(ladder.value(Tier::Medium, 4), Some(200_000));
/// // Question 11 (index 10) of an automatic session is the first hard one.
/// assert_eq!(ladder.prize(DifficultyMode::Automatic, 10), Some(300_000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLadder {
    easy: Vec<u64>,
    medium: Vec<u64>,
    hard: Vec<u64>,
}

impl ScoreLadder {
    /// Build a ladder from one row per tier.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::UnevenLadder` if the rows are empty or differ in length.
    pub fn new(easy: Vec<u64>, medium: Vec<u64>, hard: Vec<u64>) -> Result<Self, SettingsError> {
        let ladder = Self { easy, medium, hard };
        ladder.validate()?;
        Ok(ladder)
    }

    /// # Errors
    ///
    /// Returns `SettingsError::UnevenLadder` if the rows are empty or differ in length.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let len = self.easy.len();
        if len == 0 || self.medium.len() != len || self.hard.len() != len {
            return Err(SettingsError::UnevenLadder);
        }
        Ok(())
    }

    /// Number of positions in each tier row.
    #[must_use]
    pub fn block_len(&self) -> usize {
        self.easy.len()
    }

    #[must_use]
    pub fn row(&self, tier: Tier) -> &[u64] {
        match tier {
            Tier::Easy => &self.easy,
            Tier::Medium => &self.medium,
            Tier::Hard => &self.hard,
        }
    }

    #[must_use]
    pub fn value(&self, tier: Tier, position: usize) -> Option<u64> {
        self.row(tier).get(position).copied()
    }

    /// Tier used to score the question at `index`.
    ///
    /// Automatic mode climbs one tier per block and stays on hard after the third.
    /// Fixed mode never changes tier, so its block repeats for every segment.
    #[must_use]
    pub fn tier_for(&self, mode: DifficultyMode, index: usize) -> Tier {
        match mode {
            DifficultyMode::Automatic => {
                Tier::from_index_clamped(index.checked_div(self.block_len()).unwrap_or(0))
            }
            DifficultyMode::Fixed(tier) => tier,
        }
    }

    /// Money earned by a correct answer to the question at `index`.
    ///
    /// `None` only for a ladder with empty rows, which `validate` rejects.
    #[must_use]
    pub fn prize(&self, mode: DifficultyMode, index: usize) -> Option<u64> {
        let position = index.checked_rem(self.block_len())?;
        self.value(self.tier_for(mode, index), position)
    }
}

impl Default for ScoreLadder {
    fn default() -> Self {
        Self {
            easy: vec![1_000, 2_000, 3_000, 5_000, 10_000],
            medium: vec![20_000, 30_000, 50_000, 100_000, 200_000],
            hard: vec![300_000, 500_000, 750_000, 1_000_000, 2_000_000],
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn automatic_tiers_follow_blocks() {
        let ladder = ScoreLadder::default();
        for index in 0..5 {
            assert_eq!(ladder.tier_for(DifficultyMode::Automatic, index), Tier::Easy);
        }
        for index in 5..10 {
            assert_eq!(ladder.tier_for(DifficultyMode::Automatic, index), Tier::Medium);
        }
        for index in 10..15 {
            assert_eq!(ladder.tier_for(DifficultyMode::Automatic, index), Tier::Hard);
        }
        assert_eq!(ladder.tier_for(DifficultyMode::Automatic, 22), Tier::Hard);
    }

    #[test]
    fn fixed_mode_repeats_the_same_block() {
        let ladder = ScoreLadder::default();
        let mode = DifficultyMode::Fixed(Tier::Medium);
        assert_eq!(ladder.prize(mode, 0), Some(20_000));
        assert_eq!(ladder.prize(mode, 4), Some(200_000));
        assert_eq!(ladder.prize(mode, 5), Some(20_000));
        assert_eq!(ladder.prize(mode, 14), Some(200_000));
    }

    #[test]
    fn automatic_prizes_escalate() {
        let ladder = ScoreLadder::default();
        let prizes: Vec<u64> = (0..15)
            .filter_map(|i| ladder.prize(DifficultyMode::Automatic, i))
            .collect();
        assert!(prizes.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(prizes[4], 10_000);
        assert_eq!(prizes[9], 200_000);
        assert_eq!(prizes[14], 2_000_000);
    }

    #[test]
    fn rejects_uneven_rows() {
        let err = ScoreLadder::new(vec![1, 2], vec![3], vec![4, 5]).unwrap_err();
        assert_eq!(err, SettingsError::UnevenLadder);
        assert!(ScoreLadder::new(vec![], vec![], vec![]).is_err());
    }

    #[test]
    fn unvalidated_empty_ladder_has_no_prize() {
        let json = r#"{"easy": [], "medium": [], "hard": []}"#;
        let ladder: ScoreLadder = serde_json::from_str(json).unwrap();
        assert!(ladder.validate().is_err());
        assert_eq!(ladder.prize(DifficultyMode::Automatic, 3), None);
        assert_eq!(ladder.prize(DifficultyMode::Fixed(Tier::Hard), 0), None);
        assert_eq!(ladder.tier_for(DifficultyMode::Automatic, 3), Tier::Easy);
    }
}
