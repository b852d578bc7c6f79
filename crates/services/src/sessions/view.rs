use chrono::{DateTime, Utc};
use std::sync::Arc;

use quiz_core::model::{Outcome, PlayerId};
use storage::repository::{GameRecord, GameRecordRepository, PlayerTotals};

use crate::error::QuizServiceError;

/// Presentation-agnostic row for a player's game history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameHistoryItem {
    pub subject: String,
    pub grade: u8,
    pub outcome: Outcome,
    pub money_awarded: u64,
    pub questions_answered: u32,
    pub finished_at: DateTime<Utc>,
}

impl GameHistoryItem {
    #[must_use]
    pub fn from_record(record: &GameRecord) -> Self {
        Self {
            subject: record.subject.clone(),
            grade: record.grade,
            outcome: record.result.outcome,
            money_awarded: record.result.money_awarded,
            questions_answered: record.result.questions_answered,
            finished_at: record.finished_at,
        }
    }
}

/// Read side for recorded games.
#[derive(Clone)]
pub struct GameHistoryService {
    games: Arc<dyn GameRecordRepository>,
}

impl GameHistoryService {
    #[must_use]
    pub fn new(games: Arc<dyn GameRecordRepository>) -> Self {
        Self { games }
    }

    /// Load a player's most recent games, newest first.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` on repository failures.
    pub async fn list_recent(
        &self,
        player: PlayerId,
        limit: usize,
    ) -> Result<Vec<GameHistoryItem>, QuizServiceError> {
        let records = self.games.list_games(player, limit).await?;
        Ok(records.iter().map(GameHistoryItem::from_record).collect())
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` on repository failures.
    pub async fn totals(&self, player: PlayerId) -> Result<PlayerTotals, QuizServiceError> {
        Ok(self.games.player_totals(player).await?)
    }
}
