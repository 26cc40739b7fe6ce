//! Generalized Tic-Tac-Toe solver.
//!
//! Alpha-beta minimax over [`tictactoe_core::Board`] with a transposition
//! table, plus a rule-based opening shortcut for boards too large to search
//! from the start.
//!
//! ```no_run
//! use tictactoe_core::Board;
//! use tictactoe_solver::Engine;
//!
//! let mut engine = Engine::new();
//! let board = Board::from_moves(3, &[4, 0]).unwrap();
//! let mov = engine.suggest_move(&board).unwrap();
//! println!("play {mov}");
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod search;
pub mod stats;
pub mod strategy;
pub mod table;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::SolverError;
pub use evaluation::{Evaluation, NodeType, SCORE_SCALE};
pub use search::{full_minimax, SearchLimits, SearchOutcome, Searcher};
pub use strategy::{BasicStrategy, OpeningStrategy};
pub use table::{Eviction, TableConfig, TranspositionTable};
