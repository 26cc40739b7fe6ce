//! Move suggestion: opening shortcut plus full search.
//!
//! Below a per-size count of played cells the engine asks its
//! [`OpeningStrategy`]; from there on it runs a complete alpha-beta search.
//! Larger boards need the shortcut for more plies because the branching
//! factor grows quadratically with the board size.

use log::debug;
use tictactoe_core::{Board, BoardError};

use crate::config::EngineConfig;
use crate::error::SolverError;
use crate::evaluation::Evaluation;
use crate::search::{SearchLimits, SearchOutcome, Searcher};
use crate::strategy::{BasicStrategy, OpeningStrategy};
use crate::table::TranspositionTable;

pub struct Engine<S = BasicStrategy> {
    searcher: Searcher,
    opening: S,
    config: EngineConfig,
    requests: u64,
}

impl Engine<BasicStrategy> {
    /// Engine with the default configuration and [`BasicStrategy`].
    pub fn new() -> Self {
        Self::build(EngineConfig::default(), BasicStrategy::new())
    }

    pub fn from_config(config: EngineConfig) -> Result<Self, SolverError> {
        let opening = match config.seed {
            Some(seed) => BasicStrategy::with_seed(seed),
            None => BasicStrategy::new(),
        };
        Self::with_strategy(config, opening)
    }
}

impl Default for Engine<BasicStrategy> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: OpeningStrategy> Engine<S> {
    /// Engine using a custom opening strategy.
    pub fn with_strategy(config: EngineConfig, opening: S) -> Result<Self, SolverError> {
        config.validate()?;
        Ok(Self::build(config, opening))
    }

    fn build(config: EngineConfig, opening: S) -> Self {
        let mut searcher = Searcher::new(TranspositionTable::new(config.table))
            .with_shuffle(config.shuffle)
            .with_limits(config.limits.to_limits());
        if let Some(seed) = config.seed {
            searcher = searcher.with_seed(seed);
        }
        Self {
            searcher,
            opening,
            config,
            requests: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    pub fn searcher_mut(&mut self) -> &mut Searcher {
        &mut self.searcher
    }

    /// Override the search limits from the configuration.
    pub fn set_limits(&mut self, limits: SearchLimits) {
        self.searcher.set_limits(limits);
    }

    pub fn clear_table(&mut self) {
        self.searcher.table_mut().clear();
    }

    /// Check if `board` is still below the opening threshold for its size.
    pub fn in_opening(&self, board: &Board) -> bool {
        board.played_count() < self.config.opening_threshold(board.size())
    }

    /// Best move for the side to move.
    ///
    /// Uses the opening strategy below the threshold and full search
    /// otherwise. Fails with [`BoardError::GameAlreadyOver`] on a finished game.
    pub fn suggest_move(&mut self, board: &Board) -> Result<usize, SolverError> {
        if board.is_terminal() {
            return Err(BoardError::GameAlreadyOver.into());
        }

        self.requests += 1;
        if let Some(every) = self.config.clear_table_every {
            if self.requests % u64::from(every) == 0 {
                debug!("clearing transposition table after {} requests", self.requests);
                self.clear_table();
            }
        }

        if self.in_opening(board) {
            let mov = self
                .opening
                .suggest_opening_move(board)
                .ok_or(SolverError::NoMoveFound)?;
            if !board.is_empty_cell(mov) {
                return Err(SolverError::IllegalOpeningMove(mov));
            }
            debug!(
                "opening move {} after {} of {} cells",
                mov,
                board.played_count(),
                board.cell_count()
            );
            return Ok(mov);
        }

        let outcome = self.searcher.search(board);
        debug!(
            "searched move {:?} score {} ({:?})",
            outcome.evaluation.best_move, outcome.evaluation.score, outcome.evaluation.node_type
        );
        outcome.evaluation.best_move.ok_or(SolverError::NoMoveFound)
    }

    /// Full search regardless of the opening threshold.
    pub fn analyze(&mut self, board: &Board) -> SearchOutcome {
        self.searcher.search(board)
    }

    /// Score, bound type and best move of `board` from full search.
    pub fn evaluate(&mut self, board: &Board) -> Evaluation {
        self.analyze(board).evaluation
    }
}
