//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::QuizError;
use storage::repository::StorageError;

/// Errors emitted by quiz services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
    #[error("quiz is not finished yet")]
    NotFinished,
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
