#![forbid(unsafe_code)]

pub mod repository;
pub mod sample;

pub use repository::{
    GameRecord, GameRecordRepository, InMemoryRepository, PlayerTotals, QuestionQuery,
    QuestionSource, Storage, StorageError,
};
