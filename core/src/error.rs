use alloc::string::String;
use thiserror::Error;

use crate::{CardId, Score};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Input is locked until a new game starts")]
    Locked,
    #[error("Board is still loading")]
    NotReady,
    #[error("No card at index {0}")]
    InvalidIndex(usize),
    #[error("Game has not ended")]
    NotTerminal,
    #[error("Board was requested by a session that has since been replaced")]
    StaleBoard,
    #[error("Board has {actual} cards but the difficulty needs {expected}")]
    BoardSizeMismatch { expected: Score, actual: usize },
    #[error("Card id {0} appears more than once on the board")]
    DuplicateCardId(CardId),
    #[error("Unknown difficulty level")]
    UnknownDifficulty,
}

pub type Result<T> = core::result::Result<T, GameError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Card source unavailable: {0}")]
    Unavailable(String),
    #[error("Card source returned {actual} cards, {expected} were requested")]
    ShortRead { expected: Score, actual: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Stored value for {key:?} is malformed")]
    Malformed { key: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedbackError {
    #[error("Cue {0:?} is not available")]
    Missing(String),
    #[error("Playback failed: {0}")]
    Playback(String),
}
