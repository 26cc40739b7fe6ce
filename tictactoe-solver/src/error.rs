use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tictactoe_core::BoardError;

/// Errors raised by the engine and its configuration.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error(transparent)]
    Board(#[from] BoardError),
    /// Search finished on a non-terminal board without a move. Indicates a
    /// bug in move generation or evaluation, never a normal condition.
    #[error("search produced no move for a non-terminal board")]
    NoMoveFound,
    #[error("opening strategy suggested unavailable cell {0}")]
    IllegalOpeningMove(usize),
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to read config file {}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
