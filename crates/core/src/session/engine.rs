use chrono::{DateTime, Utc};
use rand::Rng;
use std::fmt;
use tracing::{debug, info};

use crate::error::{PhaseKind, QuizError};
use crate::model::{
    DifficultyMode, LifelineEffect, LifelineKind, LifelineUsage, OPTION_COUNT, Outcome,
    QuestionRecord, QuizSettings, SessionResult,
};
use crate::time::{Clock, elapsed_between};

use super::lifelines::LifelineController;
use super::progress::SessionProgress;
use super::settlement::settle;

//
// ─── PHASES ────────────────────────────────────────────────────────────────────
//

/// Where a session is in its per-question cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingSelection,
    AwaitingConfirmation {
        choice: usize,
    },
    /// Answer evaluated; the session waits out the feedback delay before moving on.
    ResultShown {
        choice: usize,
        correct: bool,
        armed_at: DateTime<Utc>,
    },
    Terminal(Outcome),
}

impl Phase {
    #[must_use]
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::AwaitingSelection => PhaseKind::AwaitingSelection,
            Phase::AwaitingConfirmation { .. } => PhaseKind::AwaitingConfirmation,
            Phase::ResultShown { .. } => PhaseKind::ResultShown,
            Phase::Terminal(_) => PhaseKind::Terminal,
        }
    }
}

/// Returned by [`QuizSession::confirm_answer`] so the caller can show feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub correct_option: usize,
    pub accumulated_money: u64,
    pub guaranteed_money: u64,
}

/// Returned by [`QuizSession::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No feedback delay is armed.
    Idle,
    /// The feedback delay has not elapsed yet.
    Pending,
    /// Moved on to the question at `index`.
    Advanced { index: usize },
    Finished(SessionResult),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Single-player quiz session driven one call at a time.
///
/// The caller selects and confirms answers, activates lifelines, and polls
/// [`QuizSession::tick`] to let the feedback delay run out. Once terminal, the
/// session rejects every operation and exposes its [`SessionResult`].
pub struct QuizSession {
    questions: Vec<QuestionRecord>,
    mode: DifficultyMode,
    settings: QuizSettings,
    clock: Clock,
    current: usize,
    accumulated_money: u64,
    guaranteed_money: u64,
    phase: Phase,
    lifelines: LifelineController,
    answered: u32,
    result: Option<SessionResult>,
}

impl QuizSession {
    /// Create a session over `questions`, keeping at most `total_questions` of them.
    ///
    /// An empty list yields a session that is already terminal with
    /// `Outcome::NoQuestionsAvailable`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidSettings` or `QuizError::InvalidQuestion` for
    /// malformed input.
    pub fn new(
        mut questions: Vec<QuestionRecord>,
        mode: DifficultyMode,
        settings: QuizSettings,
    ) -> Result<Self, QuizError> {
        settings.validate()?;
        questions.truncate(settings.total_questions());
        for question in &questions {
            question.validate()?;
        }

        let mut session = Self {
            questions,
            mode,
            settings,
            clock: Clock::default_clock(),
            current: 0,
            accumulated_money: 0,
            guaranteed_money: 0,
            phase: Phase::AwaitingSelection,
            lifelines: LifelineController::new(),
            answered: 0,
            result: None,
        };

        if session.questions.is_empty() {
            session.finish(Outcome::NoQuestionsAvailable);
        } else {
            debug!(
                questions = session.questions.len(),
                ?mode,
                "quiz session started"
            );
        }
        Ok(session)
    }

    /// A session that ended before it began, for when no usable question set exists.
    #[must_use]
    pub fn unavailable(mode: DifficultyMode, settings: QuizSettings) -> Self {
        let mut session = Self {
            questions: Vec::new(),
            mode,
            settings,
            clock: Clock::default_clock(),
            current: 0,
            accumulated_money: 0,
            guaranteed_money: 0,
            phase: Phase::AwaitingSelection,
            lifelines: LifelineController::new(),
            answered: 0,
            result: None,
        };
        session.finish(Outcome::NoQuestionsAvailable);
        session
    }

    /// Use `clock` to stamp confirmed answers.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    //
    // ─── OPERATIONS ────────────────────────────────────────────────────────────
    //

    /// Record `index` as the pending choice for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` while a result is shown or after the
    /// session ended, and `QuizError::OutOfRange` for an index outside `0..4` or
    /// an option removed by the eliminate lifeline.
    pub fn select_option(&mut self, index: usize) -> Result<(), QuizError> {
        self.ensure_answerable("select_option")?;
        if index >= OPTION_COUNT || self.lifelines.is_eliminated(index) {
            return Err(QuizError::OutOfRange { index });
        }

        self.phase = Phase::AwaitingConfirmation { choice: index };
        debug!(question = self.current, choice = index, "option selected");
        Ok(())
    }

    /// Evaluate the pending choice and arm the feedback delay.
    ///
    /// A correct answer credits the ladder prize and, on a checkpoint question,
    /// banks it as guaranteed money.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoSelection` if nothing is selected, and
    /// `QuizError::InvalidState` while a result is shown or after the session ended.
    pub fn confirm_answer(&mut self) -> Result<AnswerFeedback, QuizError> {
        let choice = match self.phase {
            Phase::AwaitingConfirmation { choice } => choice,
            Phase::AwaitingSelection => return Err(QuizError::NoSelection),
            phase => {
                return Err(QuizError::InvalidState {
                    operation: "confirm_answer",
                    phase: phase.kind(),
                });
            }
        };

        let question = &self.questions[self.current];
        let correct = question.is_correct(choice);
        let correct_option = question.correct_option();
        self.answered = self.answered.saturating_add(1);

        if correct {
            let prize = self
                .settings
                .ladder()
                .prize(self.mode, self.current)
                .unwrap_or_default();
            // Fixed mode restarts its block each segment; the running total never drops.
            self.accumulated_money = self.accumulated_money.max(prize);
            self.bank_if_checkpoint();
        }

        self.phase = Phase::ResultShown {
            choice,
            correct,
            armed_at: self.clock.now(),
        };
        debug!(
            question = self.current,
            choice,
            correct,
            accumulated = self.accumulated_money,
            guaranteed = self.guaranteed_money,
            "answer confirmed"
        );

        Ok(AnswerFeedback {
            correct,
            correct_option,
            accumulated_money: self.accumulated_money,
            guaranteed_money: self.guaranteed_money,
        })
    }

    /// Let the feedback delay run out as of `now`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` after the session ended.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<TickOutcome, QuizError> {
        let (correct, armed_at) = match self.phase {
            Phase::ResultShown {
                correct, armed_at, ..
            } => (correct, armed_at),
            Phase::Terminal(_) => {
                return Err(QuizError::InvalidState {
                    operation: "tick",
                    phase: PhaseKind::Terminal,
                });
            }
            _ => return Ok(TickOutcome::Idle),
        };

        if elapsed_between(armed_at, now) < self.settings.feedback_delay() {
            return Ok(TickOutcome::Pending);
        }

        if correct {
            Ok(self.advance())
        } else {
            Ok(TickOutcome::Finished(self.finish(Outcome::LostWrongAnswer)))
        }
    }

    /// [`QuizSession::tick`] against the session's own clock.
    ///
    /// # Errors
    ///
    /// Same as [`QuizSession::tick`].
    pub fn poll(&mut self) -> Result<TickOutcome, QuizError> {
        let now = self.clock.now();
        self.tick(now)
    }

    /// Walk away with the guaranteed money.
    ///
    /// The feedback delay cannot be cancelled: quitting while a result is shown
    /// settles with the outcome the confirmed answer already decided. A wrong
    /// answer still loses, a correct final answer still wins.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` if the session already ended.
    pub fn quit(&mut self) -> Result<SessionResult, QuizError> {
        let outcome = match self.phase {
            Phase::Terminal(_) => {
                return Err(QuizError::InvalidState {
                    operation: "quit",
                    phase: PhaseKind::Terminal,
                });
            }
            Phase::ResultShown { correct: false, .. } => Outcome::LostWrongAnswer,
            Phase::ResultShown { correct: true, .. } if self.is_last_question() => Outcome::Won,
            _ => Outcome::Quit,
        };
        Ok(self.finish(outcome))
    }

    /// Activate a lifeline on the current question using the thread RNG.
    ///
    /// # Errors
    ///
    /// See [`QuizSession::activate_lifeline_with_rng`].
    pub fn activate_lifeline(&mut self, kind: LifelineKind) -> Result<LifelineEffect, QuizError> {
        let mut rng = rand::rng();
        self.activate_lifeline_with_rng(kind, &mut rng)
    }

    /// Activate a lifeline on the current question.
    ///
    /// `Skip` moves on without touching the accumulated money (and finishes the
    /// session as a win on the last question). `Eliminate` hides two wrong
    /// options. `Hint` returns the hint text.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` once an answer is confirmed or the
    /// session ended, and `QuizError::AlreadyUsed` if `kind` was already spent on
    /// this question.
    pub fn activate_lifeline_with_rng<R: Rng + ?Sized>(
        &mut self,
        kind: LifelineKind,
        rng: &mut R,
    ) -> Result<LifelineEffect, QuizError> {
        self.ensure_answerable("activate_lifeline")?;
        let question = &self.questions[self.current];

        let effect = match kind {
            LifelineKind::Skip => {
                self.lifelines.use_skip()?;
                debug!(question = self.current, "question skipped");
                self.bank_if_checkpoint();
                self.advance();
                LifelineEffect::Skipped
            }
            LifelineKind::Eliminate => {
                let removed = self.lifelines.eliminate(question, rng)?;
                if let Phase::AwaitingConfirmation { choice } = self.phase {
                    if removed.contains(&choice) {
                        self.phase = Phase::AwaitingSelection;
                    }
                }
                debug!(question = self.current, ?removed, "options eliminated");
                LifelineEffect::Eliminated { removed }
            }
            LifelineKind::Hint => {
                let hint = self.lifelines.hint(question)?;
                debug!(question = self.current, "hint revealed");
                LifelineEffect::Hint(hint)
            }
        };
        Ok(effect)
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn mode(&self) -> DifficultyMode {
        self.mode
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Terminal(_))
    }

    #[must_use]
    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    /// Number of questions in this session.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question being played; `None` once the session ended.
    #[must_use]
    pub fn current_question(&self) -> Option<&QuestionRecord> {
        if self.is_terminal() {
            None
        } else {
            self.questions.get(self.current)
        }
    }

    #[must_use]
    pub fn accumulated_money(&self) -> u64 {
        self.accumulated_money
    }

    #[must_use]
    pub fn guaranteed_money(&self) -> u64 {
        self.guaranteed_money
    }

    #[must_use]
    pub fn lifeline_usage(&self) -> LifelineUsage {
        self.lifelines.usage()
    }

    /// Option indices of the current question not removed by `Eliminate`.
    #[must_use]
    pub fn visible_options(&self) -> Vec<usize> {
        self.lifelines.visible_options()
    }

    /// What a correct answer to the current question is worth.
    #[must_use]
    pub fn prize_for_current(&self) -> Option<u64> {
        self.current_question()
            .and_then(|_| self.settings.ladder().prize(self.mode, self.current))
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            index: self.current,
            total: self.total_questions(),
            accumulated_money: self.accumulated_money,
            guaranteed_money: self.guaranteed_money,
            phase: self.phase.kind(),
            lifelines: self.lifelines.usage(),
            current_prize: self.prize_for_current(),
        }
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    fn ensure_answerable(&self, operation: &'static str) -> Result<(), QuizError> {
        match self.phase {
            Phase::AwaitingSelection | Phase::AwaitingConfirmation { .. } => Ok(()),
            phase => Err(QuizError::InvalidState {
                operation,
                phase: phase.kind(),
            }),
        }
    }

    fn bank_if_checkpoint(&mut self) {
        if self.settings.is_checkpoint(self.current) {
            self.guaranteed_money = self.accumulated_money;
            debug!(
                question = self.current,
                guaranteed = self.guaranteed_money,
                "checkpoint reached"
            );
        }
    }

    fn is_last_question(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    fn advance(&mut self) -> TickOutcome {
        if self.is_last_question() {
            return TickOutcome::Finished(self.finish(Outcome::Won));
        }

        self.current += 1;
        self.phase = Phase::AwaitingSelection;
        self.lifelines.reset();
        debug!(question = self.current, "advanced to next question");
        TickOutcome::Advanced {
            index: self.current,
        }
    }

    fn finish(&mut self, outcome: Outcome) -> SessionResult {
        let result = settle(
            outcome,
            self.accumulated_money,
            self.guaranteed_money,
            self.answered,
            self.current,
        );
        self.phase = Phase::Terminal(outcome);
        self.result = Some(result);
        info!(
            %outcome,
            money = result.money_awarded,
            answered = result.questions_answered,
            final_index = result.final_question_index,
            "quiz session finished"
        );
        result
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("questions_len", &self.questions.len())
            .field("mode", &self.mode)
            .field("current", &self.current)
            .field("accumulated_money", &self.accumulated_money)
            .field("guaranteed_money", &self.guaranteed_money)
            .field("phase", &self.phase)
            .field("answered", &self.answered)
            .finish_non_exhaustive()
    }
}
