use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use quiz_core::QuizSession;
use quiz_core::model::{
    DifficultyMode, DifficultyTierMap, Outcome, PlayerId, QuestionRecord, QuizSettings,
    SessionResult,
};
use storage::repository::{GameRecord, GameRecordRepository, QuestionQuery, QuestionSource};

use super::plan::QuestionPlanner;
use crate::Clock;
use crate::error::QuizServiceError;

/// What the player picked on the start screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRequest {
    pub player: PlayerId,
    pub subject: String,
    pub grade: u8,
    /// External difficulty identifier, resolved through the tier map.
    pub difficulty: String,
}

/// A started quiz plus the context needed to record it.
#[derive(Debug)]
pub struct ActiveQuiz {
    request: QuizRequest,
    session: QuizSession,
    record_id: Option<i64>,
}

impl ActiveQuiz {
    #[must_use]
    pub fn request(&self) -> &QuizRequest {
        &self.request
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut QuizSession {
        &mut self.session
    }

    #[must_use]
    pub fn record_id(&self) -> Option<i64> {
        self.record_id
    }

    #[must_use]
    pub fn result(&self) -> Option<&SessionResult> {
        self.session.result()
    }
}

/// Orchestrates quiz start and result recording.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    questions: Arc<dyn QuestionSource>,
    games: Arc<dyn GameRecordRepository>,
    tier_map: DifficultyTierMap,
    settings: QuizSettings,
    shuffle: bool,
    require_full_set: bool,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        questions: Arc<dyn QuestionSource>,
        games: Arc<dyn GameRecordRepository>,
    ) -> Self {
        Self {
            clock,
            questions,
            games,
            tier_map: DifficultyTierMap::default(),
            settings: QuizSettings::default(),
            shuffle: false,
            require_full_set: true,
        }
    }

    #[must_use]
    pub fn with_tier_map(mut self, tier_map: DifficultyTierMap) -> Self {
        self.tier_map = tier_map;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: QuizSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// When set (the default), a source that cannot fill a whole session yields
    /// a session that ends immediately with `NoQuestionsAvailable`.
    #[must_use]
    pub fn with_require_full_set(mut self, require_full_set: bool) -> Self {
        self.require_full_set = require_full_set;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    /// Fetch questions and start a session for `request`.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::UnknownDifficulty` if the tier map does not know
    /// the requested difficulty, and propagates storage and construction errors.
    pub async fn start_quiz(&self, request: QuizRequest) -> Result<ActiveQuiz, QuizServiceError> {
        let (mode, fetched) = self.fetch(&request).await?;
        self.open(request, mode, fetched, &mut rng())
    }

    /// Same as [`Self::start_quiz`], but shuffles with `rng` so a seeded
    /// generator replays the same question order.
    ///
    /// # Errors
    ///
    /// Same as [`Self::start_quiz`].
    pub async fn start_quiz_with_rng<R: Rng + ?Sized>(
        &self,
        request: QuizRequest,
        rng: &mut R,
    ) -> Result<ActiveQuiz, QuizServiceError> {
        let (mode, fetched) = self.fetch(&request).await?;
        self.open(request, mode, fetched, rng)
    }

    async fn fetch(
        &self,
        request: &QuizRequest,
    ) -> Result<(DifficultyMode, Vec<QuestionRecord>), QuizServiceError> {
        let mode = self
            .tier_map
            .resolve(&request.difficulty)
            .ok_or_else(|| QuizServiceError::UnknownDifficulty(request.difficulty.clone()))?;

        let query = QuestionQuery::new(
            request.subject.clone(),
            request.grade,
            mode,
            self.settings.total_questions(),
        );
        let fetched = self.questions.fetch_questions(&query).await?;
        Ok((mode, fetched))
    }

    fn open<R: Rng + ?Sized>(
        &self,
        request: QuizRequest,
        mode: DifficultyMode,
        fetched: Vec<QuestionRecord>,
        rng: &mut R,
    ) -> Result<ActiveQuiz, QuizServiceError> {
        let plan = QuestionPlanner::new(self.settings.total_questions())
            .with_shuffle(self.shuffle)
            .build_with_rng(mode, fetched, rng);

        let session = if plan.is_playable(self.require_full_set) {
            QuizSession::new(plan.questions, mode, self.settings.clone())?
        } else {
            warn!(
                subject = %request.subject,
                grade = request.grade,
                fetched = plan.fetched,
                required = self.settings.total_questions(),
                "not enough questions to start a quiz"
            );
            QuizSession::unavailable(mode, self.settings.clone())
        };
        let session = session.with_clock(self.clock);

        info!(
            player = %request.player,
            subject = %request.subject,
            grade = request.grade,
            ?mode,
            questions = session.total_questions(),
            "quiz started"
        );

        Ok(ActiveQuiz {
            request,
            session,
            record_id: None,
        })
    }

    /// Persist the settlement of a finished quiz and update the player's totals.
    ///
    /// Idempotent: a quiz is recorded once. Sessions that never started
    /// (`NoQuestionsAvailable`) are not recorded and yield `None`.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::NotFinished` for a running quiz, or
    /// `QuizServiceError::Storage` if persistence fails.
    pub async fn record_result(
        &self,
        quiz: &mut ActiveQuiz,
    ) -> Result<Option<i64>, QuizServiceError> {
        if let Some(id) = quiz.record_id {
            return Ok(Some(id));
        }
        let result = *quiz.session.result().ok_or(QuizServiceError::NotFinished)?;
        if result.outcome == Outcome::NoQuestionsAvailable {
            return Ok(None);
        }

        let record = GameRecord {
            player: quiz.request.player,
            subject: quiz.request.subject.clone(),
            grade: quiz.request.grade,
            mode: quiz.session.mode(),
            result,
            finished_at: self.clock.now(),
        };
        let id = self.games.append_game(&record).await?;
        quiz.record_id = Some(id);
        info!(
            player = %record.player,
            id,
            money = result.money_awarded,
            "quiz result recorded"
        );
        Ok(Some(id))
    }
}
