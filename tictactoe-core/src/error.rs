use std::fmt;

use thiserror::Error;

/// Reason a cell index was refused by [`crate::Board::apply_move`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveRejection {
    OutOfRange,
    Occupied,
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveRejection::OutOfRange => f.write_str("cell is off the board"),
            MoveRejection::Occupied => f.write_str("cell is already occupied"),
        }
    }
}

/// Errors raised while building boards or playing moves.
///
/// All of them are caller errors: boards are values, so a failed operation
/// never leaves partial state behind.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum BoardError {
    #[error("unsupported board size {0}, expected 3 to 8")]
    InvalidConfiguration(usize),
    #[error("invalid position: {0}")]
    InvalidPosition(&'static str),
    #[error("invalid move {index}: {reason}")]
    InvalidMove { index: usize, reason: MoveRejection },
    #[error("the game is already over")]
    GameAlreadyOver,
}
