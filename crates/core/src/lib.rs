#![forbid(unsafe_code)]

pub mod error;
pub mod ladder;
pub mod model;
pub mod session;
pub mod time;

pub use error::QuizError;
pub use ladder::ScoreLadder;
pub use session::{AnswerFeedback, Phase, QuizSession, SessionProgress, TickOutcome};
pub use time::Clock;
