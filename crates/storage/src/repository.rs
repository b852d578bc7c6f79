use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{DifficultyMode, PlayerId, QuestionRecord, SessionResult, Tier};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

/// What a session asks its question source for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionQuery {
    pub subject: String,
    pub grade: u8,
    pub mode: DifficultyMode,
    pub limit: usize,
}

impl QuestionQuery {
    #[must_use]
    pub fn new(subject: impl Into<String>, grade: u8, mode: DifficultyMode, limit: usize) -> Self {
        Self {
            subject: subject.into(),
            grade,
            mode,
            limit,
        }
    }
}

/// Supplies ordered question lists for a subject, grade and difficulty mode.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch up to `query.limit` questions.
    ///
    /// Fixed modes return only questions tagged with that tier. Automatic mode
    /// returns questions ordered from easy to hard, drawing evenly from each
    /// tier while it can. Fewer than `limit` records is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn fetch_questions(
        &self,
        query: &QuestionQuery,
    ) -> Result<Vec<QuestionRecord>, StorageError>;
}

//
// ─── GAME RECORDS ──────────────────────────────────────────────────────────────
//

/// Persisted shape of a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub player: PlayerId,
    pub subject: String,
    pub grade: u8,
    pub mode: DifficultyMode,
    pub result: SessionResult,
    pub finished_at: DateTime<Utc>,
}

/// Running totals for a player across all recorded games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTotals {
    pub games_played: u32,
    pub games_won: u32,
    pub total_money: u64,
}

impl PlayerTotals {
    fn record(&mut self, result: &SessionResult) {
        self.games_played = self.games_played.saturating_add(1);
        if result.is_win() {
            self.games_won = self.games_won.saturating_add(1);
        }
        self.total_money = self.total_money.saturating_add(result.money_awarded);
    }
}

#[async_trait]
pub trait GameRecordRepository: Send + Sync {
    /// Store a finished game and fold it into the player's totals.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn append_game(&self, record: &GameRecord) -> Result<i64, StorageError>;

    /// Fetch a recorded game by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing.
    async fn get_game(&self, id: i64) -> Result<GameRecord, StorageError>;

    /// Most recent games for a player, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn list_games(&self, player: PlayerId, limit: usize)
    -> Result<Vec<GameRecord>, StorageError>;

    /// Totals for a player; zeroes if the player never finished a game.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn player_totals(&self, player: PlayerId) -> Result<PlayerTotals, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct GameLog {
    games: Vec<(i64, GameRecord)>,
    totals: HashMap<PlayerId, PlayerTotals>,
    next_id: i64,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<HashMap<(String, u8), Vec<QuestionRecord>>>>,
    games: Arc<Mutex<GameLog>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add questions to the bank for a subject and grade.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the bank lock is poisoned.
    pub fn insert_questions(
        &self,
        subject: &str,
        grade: u8,
        questions: impl IntoIterator<Item = QuestionRecord>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .entry((subject_key(subject), grade))
            .or_default()
            .extend(questions);
        Ok(())
    }
}

fn subject_key(subject: &str) -> String {
    subject.trim().to_lowercase()
}

/// Untagged questions sort after every tier.
fn tier_rank(question: &QuestionRecord) -> usize {
    question.difficulty_tier().map_or(Tier::ALL.len(), Tier::index)
}

/// An even share of `limit` from each tier, topped up from whatever is left
/// when a tier runs short. Order stays easy to hard.
fn automatic_selection(bank: &[QuestionRecord], limit: usize) -> Vec<QuestionRecord> {
    let share = limit.div_ceil(Tier::ALL.len());
    let mut ordered: Vec<&QuestionRecord> = bank.iter().collect();
    ordered.sort_by_key(|q| tier_rank(q));

    let mut taken = vec![false; ordered.len()];
    let mut per_tier = [0_usize; 3];
    let mut count = 0;
    for (slot, question) in ordered.iter().enumerate() {
        if let Some(tier) = question.difficulty_tier() {
            if per_tier[tier.index()] < share && count < limit {
                per_tier[tier.index()] += 1;
                taken[slot] = true;
                count += 1;
            }
        }
    }
    for flag in &mut taken {
        if count >= limit {
            break;
        }
        if !*flag {
            *flag = true;
            count += 1;
        }
    }

    ordered
        .into_iter()
        .zip(taken)
        .filter_map(|(q, taken)| taken.then(|| q.clone()))
        .collect()
}

#[async_trait]
impl QuestionSource for InMemoryRepository {
    async fn fetch_questions(
        &self,
        query: &QuestionQuery,
    ) -> Result<Vec<QuestionRecord>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let Some(bank) = guard.get(&(subject_key(&query.subject), query.grade)) else {
            return Ok(Vec::new());
        };

        let mut selected: Vec<QuestionRecord> = match query.mode {
            DifficultyMode::Fixed(tier) => bank
                .iter()
                .filter(|q| q.difficulty_tier() == Some(tier))
                .cloned()
                .collect(),
            DifficultyMode::Automatic => automatic_selection(bank, query.limit),
        };
        selected.truncate(query.limit);
        debug!(
            subject = %query.subject,
            grade = query.grade,
            found = selected.len(),
            "fetched questions"
        );
        Ok(selected)
    }
}

#[async_trait]
impl GameRecordRepository for InMemoryRepository {
    async fn append_game(&self, record: &GameRecord) -> Result<i64, StorageError> {
        let mut guard = self
            .games
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.next_id += 1;
        let id = guard.next_id;
        guard.games.push((id, record.clone()));
        guard
            .totals
            .entry(record.player)
            .or_default()
            .record(&record.result);
        Ok(id)
    }

    async fn get_game(&self, id: i64) -> Result<GameRecord, StorageError> {
        let guard = self
            .games
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .games
            .iter()
            .find(|(game_id, _)| *game_id == id)
            .map(|(_, record)| record.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn list_games(
        &self,
        player: PlayerId,
        limit: usize,
    ) -> Result<Vec<GameRecord>, StorageError> {
        let guard = self
            .games
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .games
            .iter()
            .rev()
            .filter(|(_, record)| record.player == player)
            .take(limit)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn player_totals(&self, player: PlayerId) -> Result<PlayerTotals, StorageError> {
        let guard = self
            .games
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.totals.get(&player).copied().unwrap_or_default())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionSource>,
    pub games: Arc<dyn GameRecordRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self::from_repository(repo)
    }

    #[must_use]
    pub fn from_repository(repo: InMemoryRepository) -> Self {
        let questions: Arc<dyn QuestionSource> = Arc::new(repo.clone());
        let games: Arc<dyn GameRecordRepository> = Arc::new(repo);
        Self { questions, games }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Outcome, QuestionId};
    use quiz_core::time::fixed_now;

    fn build_question(id: u64, tier: Tier) -> QuestionRecord {
        QuestionRecord::new(
            QuestionId::new(id),
            format!("Q{id}"),
            ["a", "b", "c", "d"].map(String::from),
            0,
            "",
        )
        .unwrap()
        .with_difficulty_tier(tier)
    }

    fn build_record(player: u64, outcome: Outcome, money: u64) -> GameRecord {
        GameRecord {
            player: PlayerId::new(player),
            subject: "math".into(),
            grade: 5,
            mode: DifficultyMode::Automatic,
            result: SessionResult {
                outcome,
                money_awarded: money,
                questions_answered: 3,
                final_question_index: 2,
            },
            finished_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn automatic_fetch_orders_easy_to_hard() {
        let repo = InMemoryRepository::new();
        repo.insert_questions(
            "Math",
            5,
            vec![
                build_question(1, Tier::Hard),
                build_question(2, Tier::Easy),
                build_question(3, Tier::Medium),
            ],
        )
        .unwrap();

        let query = QuestionQuery::new("math", 5, DifficultyMode::Automatic, 15);
        let fetched = repo.fetch_questions(&query).await.unwrap();
        let ids: Vec<u64> = fetched.iter().map(|q| q.id().value()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn automatic_fetch_balances_deep_tiers() {
        let repo = InMemoryRepository::new();
        let bank = Tier::ALL
            .iter()
            .enumerate()
            .flat_map(|(t, &tier)| (0..8).map(move |i| build_question(t as u64 * 100 + i, tier)));
        repo.insert_questions("math", 5, bank).unwrap();

        let query = QuestionQuery::new("math", 5, DifficultyMode::Automatic, 15);
        let fetched = repo.fetch_questions(&query).await.unwrap();
        let tiers: Vec<Tier> = fetched.iter().filter_map(QuestionRecord::difficulty_tier).collect();
        assert_eq!(tiers.len(), 15);
        assert!(tiers[..5].iter().all(|&t| t == Tier::Easy));
        assert!(tiers[5..10].iter().all(|&t| t == Tier::Medium));
        assert!(tiers[10..].iter().all(|&t| t == Tier::Hard));
    }

    #[tokio::test]
    async fn fixed_fetch_filters_by_tier_and_limit() {
        let repo = InMemoryRepository::new();
        repo.insert_questions(
            "math",
            5,
            (1..=6).map(|id| build_question(id, if id % 2 == 0 { Tier::Easy } else { Tier::Hard })),
        )
        .unwrap();

        let query = QuestionQuery::new("math", 5, DifficultyMode::Fixed(Tier::Easy), 2);
        let fetched = repo.fetch_questions(&query).await.unwrap();
        assert_eq!(fetched.len(), 2);
        assert!(fetched.iter().all(|q| q.difficulty_tier() == Some(Tier::Easy)));

        let other_grade = QuestionQuery::new("math", 6, DifficultyMode::Automatic, 15);
        assert!(repo.fetch_questions(&other_grade).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn appending_games_updates_totals() {
        let repo = InMemoryRepository::new();
        let first = repo
            .append_game(&build_record(1, Outcome::Won, 2_000_000))
            .await
            .unwrap();
        repo.append_game(&build_record(1, Outcome::LostWrongAnswer, 10_000))
            .await
            .unwrap();
        repo.append_game(&build_record(2, Outcome::Quit, 0))
            .await
            .unwrap();

        let totals = repo.player_totals(PlayerId::new(1)).await.unwrap();
        assert_eq!(
            totals,
            PlayerTotals {
                games_played: 2,
                games_won: 1,
                total_money: 2_010_000
            }
        );
        assert_eq!(
            repo.player_totals(PlayerId::new(9)).await.unwrap(),
            PlayerTotals::default()
        );

        let fetched = repo.get_game(first).await.unwrap();
        assert_eq!(fetched.result.outcome, Outcome::Won);
        assert!(matches!(
            repo.get_game(99).await,
            Err(StorageError::NotFound)
        ));

        let recent = repo.list_games(PlayerId::new(1), 10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].result.outcome, Outcome::LostWrongAnswer);
    }
}
