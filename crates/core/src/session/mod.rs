mod engine;
mod lifelines;
mod progress;
mod settlement;

pub use engine::{AnswerFeedback, Phase, QuizSession, TickOutcome};
pub use lifelines::LifelineController;
pub use progress::SessionProgress;
pub use settlement::settle_money;
