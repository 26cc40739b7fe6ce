//! Cheap rule-based move selection for the opening.
//!
//! Full search is infeasible near the empty board on larger sizes, so the
//! engine hands those positions to an [`OpeningStrategy`] instead.
//! [`BasicStrategy`] follows a fixed priority list:
//! 1. If there is a move that wins the game, make that move.
//! 2. If the opponent could win on their next move, block that cell.
//! 3. If a center cell is available, take it.
//! 4. If a corner is available, take it.
//! 5. Extend the line that is closest to completion among those the
//!    opponent has not touched.
//! 6. Otherwise, make a random move.
//!
//! Each rule is a plain function of the board, so rules can be tested and
//! recombined on their own.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tictactoe_core::evaluate::has_line;
use tictactoe_core::Board;

/// Move picker consulted below the engine's opening threshold.
pub trait OpeningStrategy {
    /// Suggest an available cell of a non-terminal board.
    ///
    /// Returning `None` or an occupied cell is reported by the engine as an
    /// error.
    fn suggest_opening_move(&mut self, board: &Board) -> Option<usize>;
}

/// A single rule: returns a move among `moves` if it applies.
pub type Rule = fn(&Board, &[usize], &mut dyn RngCore) -> Option<usize>;

/// The default rule list, highest priority first.
pub const DEFAULT_RULES: [(&str, Rule); 6] = [
    ("win", win_now as Rule),
    ("block", block_now as Rule),
    ("center", take_center as Rule),
    ("corner", take_corner as Rule),
    ("extend", extend_best_line as Rule),
    ("random", random_move as Rule),
];

/// Prioritized rule list, first match wins.
pub struct BasicStrategy {
    rules: Vec<(&'static str, Rule)>,
    rng: Xoshiro256PlusPlus,
}

impl BasicStrategy {
    pub fn new() -> Self {
        Self::with_rng(Xoshiro256PlusPlus::from_rng(&mut rand::rng()))
    }

    /// Strategy with reproducible tie breaks.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(Xoshiro256PlusPlus::seed_from_u64(seed))
    }

    fn with_rng(rng: Xoshiro256PlusPlus) -> Self {
        Self {
            rules: DEFAULT_RULES.to_vec(),
            rng,
        }
    }

    /// Replace the rule list.
    pub fn with_rules(mut self, rules: Vec<(&'static str, Rule)>) -> Self {
        self.rules = rules;
        self
    }

    /// First matching rule and the move it picked.
    pub fn suggest(&mut self, board: &Board) -> Option<(&'static str, usize)> {
        let moves = board.available_moves();
        if moves.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find_map(|&(name, rule)| rule(board, &moves, &mut self.rng).map(|mov| (name, mov)))
    }
}

impl Default for BasicStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl OpeningStrategy for BasicStrategy {
    fn suggest_opening_move(&mut self, board: &Board) -> Option<usize> {
        let (rule, mov) = self.suggest(board)?;
        log::trace!("opening rule {rule} picked cell {mov}");
        Some(mov)
    }
}

/// Complete a line for the side to move.
pub fn win_now(board: &Board, moves: &[usize], _rng: &mut dyn RngCore) -> Option<usize> {
    let own = board.occupancy(board.turn());
    moves
        .iter()
        .copied()
        .find(|&mov| has_line(own | 1 << mov, board.size()))
}

/// Take the cell the opponent would complete a line with.
pub fn block_now(board: &Board, moves: &[usize], _rng: &mut dyn RngCore) -> Option<usize> {
    let opponent = board.occupancy(board.turn().opposite());
    moves
        .iter()
        .copied()
        .find(|&mov| has_line(opponent | 1 << mov, board.size()))
}

/// The center cell on odd sizes, one of the four central cells on even sizes.
pub fn take_center(board: &Board, moves: &[usize], rng: &mut dyn RngCore) -> Option<usize> {
    let size = board.size();
    let mut centers = if size % 2 == 1 {
        vec![board.index_of(size / 2, size / 2)]
    } else {
        let (lo, hi) = (size / 2 - 1, size / 2);
        vec![
            board.index_of(lo, lo),
            board.index_of(hi, lo),
            board.index_of(lo, hi),
            board.index_of(hi, hi),
        ]
    };
    centers.shuffle(rng);
    centers.into_iter().find(|cell| moves.contains(cell))
}

pub fn take_corner(board: &Board, moves: &[usize], rng: &mut dyn RngCore) -> Option<usize> {
    let last = board.size() - 1;
    let mut corners = [
        board.index_of(0, 0),
        board.index_of(last, 0),
        board.index_of(0, last),
        board.index_of(last, last),
    ];
    corners.shuffle(rng);
    corners.into_iter().find(|cell| moves.contains(cell))
}

/// Play into the open line holding the most of our markers.
pub fn extend_best_line(board: &Board, moves: &[usize], rng: &mut dyn RngCore) -> Option<usize> {
    let own = board.occupancy(board.turn());
    let opponent = board.occupancy(board.turn().opposite());

    let mut lines: Vec<u64> = board
        .winning_combinations()
        .iter()
        .copied()
        .filter(|&line| line & opponent == 0)
        .collect();
    lines.sort_by_key(|&line| std::cmp::Reverse((line & own).count_ones()));

    lines.into_iter().find_map(|line| {
        let mut cells: Vec<usize> = moves
            .iter()
            .copied()
            .filter(|&mov| line & (1 << mov) != 0)
            .collect();
        cells.shuffle(&mut *rng);
        cells.first().copied()
    })
}

pub fn random_move(_board: &Board, moves: &[usize], rng: &mut dyn RngCore) -> Option<usize> {
    moves.choose(rng).copied()
}
