//! Error types for scheduling, score recording and model fitting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used throughout the crate.
pub type SeatingResult<T> = Result<T, SeatingError>;

/// Broad classification of a [`SeatingError`].
///
/// Only `InvalidInput` is ever returned to the caller as a hard failure;
/// the other two kinds are recovered where they occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    MalformedScore,
    ModelFitFailure,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeatingError {
    #[error("a tournament needs at least one player")]
    NoPlayers,

    #[error("player list has {got} entries but the design has dimension {expected}")]
    PlayerCountMismatch { expected: usize, got: usize },

    #[error("design is not balanced: {0}")]
    UnbalancedDesign(String),

    #[error("player {0} appears more than once")]
    DuplicatePlayer(String),

    #[error("round {round} has no score entries")]
    EmptyRound { round: u32 },

    #[error("round {round} must come after round {last}")]
    RoundOutOfOrder { round: u32, last: u32 },

    #[error("block {block} must not precede block {last}")]
    BlockOutOfOrder { block: u32, last: u32 },

    #[error("player {player} is scored twice in round {round}")]
    PlayerScoredTwice { player: String, round: u32 },

    #[error("seat {seat} is occupied twice in round {round}")]
    SeatTakenTwice { seat: u32, round: u32 },

    #[error("block and round numbers start at 1 (block {block}, round {round})")]
    NumberingOutOfRange { block: u32, round: u32 },

    #[error("seat numbers start at 1 (round {round})")]
    SeatOutOfRange { round: u32 },

    #[error("score for player {player} in round {round} is not finite")]
    NonFiniteScore { player: String, round: u32 },

    #[error("round entries do not match the seating plan: {0}")]
    SeatingMismatch(String),

    #[error("could not read score {0:?}")]
    MalformedScore(String),

    #[error("mixed model fit failed: {0}")]
    ModelFit(#[from] FitError),
}

impl SeatingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SeatingError::MalformedScore(_) => ErrorKind::MalformedScore,
            SeatingError::ModelFit(_) => ErrorKind::ModelFitFailure,
            _ => ErrorKind::InvalidInput,
        }
    }
}

/// Reasons the REML fit can give up.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum FitError {
    #[error("{observations} observations cannot support {parameters} fixed effects and a residual")]
    InsufficientData {
        observations: usize,
        parameters: usize,
    },

    #[error("all scores are identical")]
    ZeroVariance,

    #[error("fixed-effect system is singular")]
    Singular,

    #[error("REML criterion is not finite")]
    NonFinite,

    #[error("variance search did not converge within {iterations} iterations")]
    NoConvergence { iterations: u32 },
}
