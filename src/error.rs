use thiserror::Error;

/// Errors surfaced by the game core and its persistence adapters.
#[derive(Debug, Error)]
pub enum GameError {
    /// The word list is empty, or every selected length bucket is empty.
    #[error("word corpus is empty for the current length selection")]
    EmptyCorpus,

    #[error("level must be at least 1, got {0}")]
    InvalidLevel(u32),

    /// A startup resource (high score file, word list) could not be read.
    #[error("startup error: {0}")]
    Startup(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("statistics table error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
