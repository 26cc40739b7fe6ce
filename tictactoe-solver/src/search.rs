//! Minimax search with alpha-beta pruning and a transposition table.
//!
//! Scores are from X's point of view: X maximizes, O minimizes. A finished
//! game reached `depth` plies below the root scores
//! `outcome * (SCORE_SCALE - depth)`, which prefers faster wins and slower
//! losses without ever changing the sign of an outcome.
//!
//! Table entries store scores relative to their own node rather than the
//! root, so a table can be shared by searches from any positions in any
//! order.
//!
//! The search is single-threaded and owns its table through `&mut self`,
//! so one table is never shared by two running searches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::warn;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use tictactoe_core::{Board, Marker};

use crate::evaluation::{score_from_node, score_to_node, terminal_score, Evaluation, NodeType};
use crate::stats::SearchStats;
use crate::table::TranspositionTable;

/// Nodes between deadline and stop-flag checks.
const POLL_INTERVAL: u64 = 1024;

/// Optional bounds on a single search.
///
/// When a limit trips the search unwinds, stores nothing for unfinished
/// nodes, and reports the best root move among fully searched children.
#[derive(Clone, Debug, Default)]
pub struct SearchLimits {
    pub node_budget: Option<u64>,
    pub time_budget: Option<Duration>,
    /// Set from another thread (e.g. a Ctrl-C handler) to stop early.
    pub stop: Option<Arc<AtomicBool>>,
}

impl SearchLimits {
    pub fn is_unbounded(&self) -> bool {
        self.node_budget.is_none() && self.time_budget.is_none() && self.stop.is_none()
    }
}

/// Result of [`Searcher::search`].
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub evaluation: Evaluation,
    /// `false` if a limit stopped the search; the move is then best-so-far.
    pub completed: bool,
    pub stats: SearchStats,
}

/// Alpha-beta searcher owning its transposition table.
pub struct Searcher {
    table: TranspositionTable,
    rng: Xoshiro256PlusPlus,
    shuffle: bool,
    limits: SearchLimits,
    stats: SearchStats,
    deadline: Option<Instant>,
    aborted: bool,
}

impl Searcher {
    /// Searcher with shuffled move ordering seeded from the OS.
    pub fn new(table: TranspositionTable) -> Self {
        Self {
            table,
            rng: Xoshiro256PlusPlus::from_rng(&mut rand::rng()),
            shuffle: true,
            limits: SearchLimits::default(),
            stats: SearchStats::default(),
            deadline: None,
            aborted: false,
        }
    }

    /// Seed the move-ordering shuffle for reproducible searches.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        self
    }

    /// Disable shuffling to visit moves in ascending index order.
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn set_limits(&mut self, limits: SearchLimits) {
        self.limits = limits;
    }

    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    pub fn table(&self) -> &TranspositionTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TranspositionTable {
        &mut self.table
    }

    /// Statistics of the most recent search.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Search `board` from ply 0 with a full window.
    pub fn search(&mut self, board: &Board) -> SearchOutcome {
        self.stats = SearchStats::new();
        self.aborted = false;
        self.deadline = self.limits.time_budget.map(|budget| Instant::now() + budget);

        let mut evaluation = self.alpha_beta(board, 0, i32::MIN, i32::MAX);

        if self.aborted {
            warn!(
                "search stopped after {} nodes, returning best move so far",
                self.stats.nodes
            );
            if evaluation.best_move.is_none() {
                evaluation.best_move = self.fallback_move(board);
            }
        }

        self.stats.finish();
        self.stats.log_summary(self.table.len());

        SearchOutcome {
            evaluation,
            completed: !self.aborted,
            stats: self.stats.clone(),
        }
    }

    /// Alpha-beta minimax. `depth` is the ply below the search root.
    pub fn alpha_beta(
        &mut self,
        board: &Board,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
    ) -> Evaluation {
        if self.should_stop() {
            return Evaluation {
                score: 0,
                node_type: NodeType::classify(0, alpha, beta),
                depth,
                best_move: None,
            };
        }
        self.stats.nodes += 1;
        self.stats.max_depth = self.stats.max_depth.max(depth);

        // Entries hold node-relative scores; rebase to this ply.
        let key = board.key();
        let cached = self.table.get(&key).map(|entry| Evaluation {
            score: score_from_node(entry.score, depth),
            ..entry
        });

        if let Some(entry) = cached.filter(|entry| entry.depth <= depth) {
            self.stats.table_hits += 1;
            match entry.node_type {
                NodeType::Exact => {
                    self.stats.table_cutoffs += 1;
                    return entry;
                }
                NodeType::LowerBound => alpha = alpha.max(entry.score),
                NodeType::UpperBound => beta = beta.min(entry.score),
            }
            if alpha >= beta {
                self.stats.table_cutoffs += 1;
                return Evaluation {
                    score: entry.score,
                    node_type: NodeType::classify(entry.score, alpha, beta),
                    depth,
                    best_move: entry.best_move,
                };
            }
        }

        if let Some(outcome) = board.score() {
            self.stats.record_terminal(outcome);
            return Evaluation::terminal(outcome, depth);
        }

        // Window in effect for the children, after narrowing from the table.
        let (window_alpha, window_beta) = (alpha, beta);

        let maximizing = board.turn() == Marker::X;
        let mut best_score = if maximizing { i32::MIN } else { i32::MAX };
        let mut best_move = None;

        let moves = self.order_moves(board, cached.and_then(|entry| entry.best_move));

        for (i, &mov) in moves.iter().enumerate() {
            let child = board.apply_unchecked(mov);
            let score = self.alpha_beta(&child, depth + 1, alpha, beta).score;
            if self.aborted {
                break;
            }

            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_move = Some(mov);
                }
                alpha = alpha.max(best_score);
            } else {
                if score < best_score {
                    best_score = score;
                    best_move = Some(mov);
                }
                beta = beta.min(best_score);
            }

            if alpha >= beta {
                self.stats.branches_pruned += (moves.len() - i - 1) as u64;
                break;
            }
        }

        if self.aborted {
            let score = if best_move.is_some() { best_score } else { 0 };
            return Evaluation {
                score,
                node_type: NodeType::classify(score, window_alpha, window_beta),
                depth,
                best_move,
            };
        }

        let evaluation = Evaluation {
            score: best_score,
            node_type: NodeType::classify(best_score, window_alpha, window_beta),
            depth,
            best_move,
        };
        self.table.put(
            key,
            Evaluation {
                score: score_to_node(best_score, depth),
                ..evaluation
            },
        );
        evaluation
    }

    /// Available moves, shuffled if enabled, with the table move first.
    fn order_moves(&mut self, board: &Board, hint: Option<usize>) -> Vec<usize> {
        let mut moves = board.available_moves();
        if self.shuffle {
            moves.shuffle(&mut self.rng);
        }
        if let Some(pos) = hint.and_then(|hint| moves.iter().position(|&mov| mov == hint)) {
            moves[..=pos].rotate_right(1);
        }
        moves
    }

    /// Root move to report when the search stopped before finishing any child.
    fn fallback_move(&self, board: &Board) -> Option<usize> {
        self.table
            .peek(&board.key())
            .and_then(|entry| entry.best_move)
            .filter(|&mov| board.is_empty_cell(mov))
            .or_else(|| board.moves().next())
    }

    fn should_stop(&mut self) -> bool {
        if self.aborted {
            return true;
        }
        if self.limits.node_budget.is_some_and(|budget| self.stats.nodes >= budget) {
            self.aborted = true;
        } else if self.stats.nodes % POLL_INTERVAL == 0 {
            let expired = self.deadline.is_some_and(|deadline| Instant::now() >= deadline);
            let stopped = self
                .limits
                .stop
                .as_ref()
                .is_some_and(|stop| stop.load(Ordering::Relaxed));
            self.aborted = expired || stopped;
        }
        self.aborted
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(TranspositionTable::default())
    }
}

/// Plain minimax without pruning or caching, scored like [`Searcher`].
///
/// Exponential in the number of empty cells; meant for verification.
pub fn full_minimax(board: &Board, depth: u8) -> i32 {
    if let Some(outcome) = board.score() {
        return terminal_score(outcome, depth);
    }
    let scores = board
        .moves()
        .map(|mov| full_minimax(&board.apply_unchecked(mov), depth + 1));
    if board.turn() == Marker::X {
        scores.max().unwrap_or(0)
    } else {
        scores.min().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableConfig;

    fn searcher() -> Searcher {
        Searcher::new(TranspositionTable::new(TableConfig::unbounded())).with_seed(42)
    }

    #[test]
    fn test_empty_3x3_is_draw() {
        let board = Board::empty(3).unwrap();
        let outcome = searcher().search(&board);
        assert!(outcome.completed);
        assert_eq!(outcome.evaluation.score, 0);
        assert!(outcome.evaluation.is_exact());
        assert!(outcome.evaluation.best_move.is_some());
    }

    #[test]
    fn test_terminal_root_has_no_move() {
        let board = Board::from_moves(3, &[0, 3, 1, 4, 2]).unwrap();
        let outcome = searcher().search(&board);
        assert_eq!(outcome.evaluation, Evaluation::terminal(1, 0));
        assert_eq!(outcome.stats.nodes, 1);
    }

    #[test]
    fn test_root_entry_is_stored_exact() {
        let board = Board::from_moves(3, &[4, 0]).unwrap();
        let mut searcher = searcher();
        let outcome = searcher.search(&board);
        let stored = searcher.table().peek(&board.key()).copied().unwrap();
        assert_eq!(stored, outcome.evaluation);
        assert_eq!(stored.node_type, NodeType::Exact);
    }

    #[test]
    fn test_repeat_search_answers_from_table() {
        let board = Board::from_moves(3, &[4]).unwrap();
        let mut searcher = searcher();
        let first = searcher.search(&board);
        let second = searcher.search(&board);
        assert_eq!(first.evaluation, second.evaluation);
        assert_eq!(second.stats.nodes, 1);
        assert_eq!(second.stats.table_cutoffs, 1);
    }

    #[test]
    fn test_order_moves_puts_hint_first() {
        let board = Board::from_moves(3, &[4]).unwrap();
        let mut searcher = searcher().with_shuffle(false);
        assert_eq!(searcher.order_moves(&board, Some(6)), vec![6, 0, 1, 2, 3, 5, 7, 8]);
        assert_eq!(searcher.order_moves(&board, Some(4)), vec![0, 1, 2, 3, 5, 6, 7, 8]);
        assert_eq!(searcher.order_moves(&board, None), vec![0, 1, 2, 3, 5, 6, 7, 8]);
    }

    #[test]
    fn test_unshuffled_search_is_deterministic() {
        let board = Board::from_moves(4, &[5, 6, 9, 10, 0, 15]).unwrap();
        let run = || {
            Searcher::new(TranspositionTable::unbounded())
                .with_shuffle(false)
                .search(&board)
                .evaluation
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_seeded_search_is_deterministic() {
        let board = Board::from_moves(4, &[5, 6, 9, 10, 0, 15]).unwrap();
        let run = |seed| {
            Searcher::new(TranspositionTable::unbounded())
                .with_seed(seed)
                .search(&board)
                .evaluation
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn test_full_minimax_matches_on_small_positions() {
        for moves in [&[4][..], &[0, 4], &[0, 4, 8], &[1, 4, 7, 3]] {
            let board = Board::from_moves(3, moves).unwrap();
            let expected = full_minimax(&board, 0);
            assert_eq!(searcher().search(&board).evaluation.score, expected, "moves {moves:?}");
        }
    }

    #[test]
    fn test_table_shared_with_later_position() {
        // Searching the child first leaves entries scored from a deeper root.
        let parent = Board::from_moves(3, &[0, 4]).unwrap();
        let child = parent.apply_move(8).unwrap();
        let mut searcher = searcher();
        assert_eq!(searcher.search(&child).evaluation.score, full_minimax(&child, 0));
        assert_eq!(searcher.search(&parent).evaluation.score, full_minimax(&parent, 0));
    }

    #[test]
    fn test_stored_scores_are_node_relative() {
        // X: 0 4, O: 1 2, X to move. Cell 8 wins at ply 1.
        let board = Board::from_occupancy(3, 0b000_010_001, 0b000_000_110, Marker::X).unwrap();
        let mut searcher = searcher().with_shuffle(false);
        searcher.search(&board);

        // Cell 3 is searched first; X still forces a win from there.
        let child = board.apply_move(3).unwrap();
        let stored = searcher.table().peek(&child.key()).copied().unwrap();
        assert_eq!(stored.depth, 1);
        assert_eq!(stored.score, full_minimax(&child, 0));
    }

    #[test]
    fn test_node_budget_stops_search() {
        let board = Board::empty(4).unwrap();
        let mut searcher = searcher().with_limits(SearchLimits {
            node_budget: Some(50),
            ..Default::default()
        });
        let outcome = searcher.search(&board);
        assert!(!outcome.completed);
        assert!(outcome.stats.nodes <= 50);
        let mov = outcome.evaluation.best_move.unwrap();
        assert!(board.is_empty_cell(mov));
        assert!(searcher.table().peek(&board.key()).is_none());
    }

    #[test]
    fn test_stop_flag_before_start_returns_fallback() {
        let board = Board::from_moves(3, &[4]).unwrap();
        let stop = Arc::new(AtomicBool::new(true));
        let mut searcher = searcher().with_limits(SearchLimits {
            stop: Some(stop),
            ..Default::default()
        });
        let outcome = searcher.search(&board);
        assert!(!outcome.completed);
        assert_eq!(outcome.evaluation.best_move, Some(0));
        assert!(searcher.table().is_empty());
    }

    #[test]
    fn test_limits_reset_between_searches() {
        let board = Board::from_moves(3, &[4, 0, 8]).unwrap();
        let mut searcher = searcher().with_limits(SearchLimits {
            node_budget: Some(1),
            ..Default::default()
        });
        assert!(!searcher.search(&board).completed);

        searcher.set_limits(SearchLimits::default());
        let outcome = searcher.search(&board);
        assert!(outcome.completed);
        assert_eq!(outcome.evaluation.score, full_minimax(&board, 0));
    }
}
