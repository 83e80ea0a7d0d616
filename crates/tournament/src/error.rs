//! Errors raised while configuring or driving a tournament.

use seating_core::SeatingError;
use thiserror::Error;

pub type TournamentResult<T> = Result<T, TournamentError>;

#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("failed to read {path}: {source}")]
    ReadConfig {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ParseConfig(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Seating(#[from] SeatingError),

    #[error("console I/O failed: {0}")]
    Console(#[from] std::io::Error),

    #[error("block {0} is still in progress")]
    BlockInProgress(u32),

    #[error("no round is waiting for scores")]
    NoPendingRound,

    #[error("round expects {expected} scores, got {got}")]
    ScoreCountMismatch { expected: usize, got: usize },
}
