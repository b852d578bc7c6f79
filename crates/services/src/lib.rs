#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;

pub use quiz_core::Clock;

pub use error::QuizServiceError;
pub use sessions::{
    ActiveQuiz, GameHistoryItem, GameHistoryService, QuizLoopService, QuizRequest,
};
