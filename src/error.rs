use thiserror::Error;

use crate::state::{Choice, GameState, Player};

#[derive(Error, Debug)]
pub enum DuelError {
    #[error("Invalid move at (mine {mine}, theirs {theirs}): {reason}")]
    InvalidMove { mine: u8, theirs: u8, reason: String },

    #[error("Singular transition system: no pivot in column {column}")]
    SingularSystem { column: usize },

    #[error("{player} cannot take from an empty {choice} counter")]
    CounterUnderflow { player: Player, choice: Choice },

    #[error("State {state} is outside the bound {bound}")]
    StateOutOfRange { state: GameState, bound: u8 },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("State is not terminal")]
    NotTerminal,

    #[error("Game did not finish within {turns} turns")]
    TurnLimit { turns: u64 },

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DuelResult<T> = Result<T, DuelError>;
