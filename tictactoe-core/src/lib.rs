//! Generalized Tic-Tac-Toe game logic with bit-based board representation.
//!
//! # Board Encoding
//!
//! ```text
//! One u64 per marker: bit i is set when that marker occupies cell i.
//! The two words never share a set bit.
//!
//! Cells are numbered row-major, index = y * size + x.
//! For a 3x3 board:
//!   0 1 2
//!   3 4 5
//!   6 7 8
//! ```
//!
//! Supported sizes are 3 through 8; an 8x8 board uses all 64 bits.
//!
//! Boards are immutable values. [`Board::apply_move`] returns a new board and
//! leaves the receiver untouched, so boards can be shared freely across
//! threads and used directly as cache keys (see [`Board::key`]).

pub mod combinations;
mod error;
pub mod evaluate;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use error::{BoardError, MoveRejection};

/// Smallest supported board size.
pub const MIN_SIZE: usize = 3;
/// Largest supported board size (64 cells = one u64 per marker).
pub const MAX_SIZE: usize = 8;
/// Cell count of the largest supported board.
pub const MAX_CELLS: usize = MAX_SIZE * MAX_SIZE;

/// Player marker. `X` always moves first and is the maximizing side.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Marker {
    X = 0,
    O = 1,
}

impl Marker {
    /// The other marker.
    #[inline]
    pub fn opposite(self) -> Marker {
        match self {
            Marker::X => Marker::O,
            Marker::O => Marker::X,
        }
    }

    /// Slot of this marker in [`Board`]'s occupancy array.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Both markers, first player first.
    pub fn all() -> impl Iterator<Item = Marker> {
        [Marker::X, Marker::O].into_iter()
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::X => f.write_str("X"),
            Marker::O => f.write_str("O"),
        }
    }
}

/// Game-theoretic identity of a position.
///
/// Two boards reached through different move orders share a key, since the
/// last move played does not affect the value of a position.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct BoardKey {
    pub size: u8,
    pub x: u64,
    pub o: u64,
    pub turn: Marker,
}

/// Immutable board state.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawBoard")]
pub struct Board {
    size: u8,
    occupancy: [u64; 2],
    turn: Marker,
    last_move: Option<u8>,
}

impl Board {
    /// Create an empty board with `X` to move.
    pub fn empty(size: usize) -> Result<Board, BoardError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(BoardError::InvalidConfiguration(size));
        }
        Ok(Board {
            size: size as u8,
            occupancy: [0, 0],
            turn: Marker::X,
            last_move: None,
        })
    }

    /// Build a board from raw occupancy words.
    ///
    /// `turn` is taken as given; it is not derived from the marker counts,
    /// which lets callers set up arbitrary study positions.
    pub fn from_occupancy(size: usize, x: u64, o: u64, turn: Marker) -> Result<Board, BoardError> {
        let board = Board::empty(size)?;
        if x & o != 0 {
            return Err(BoardError::InvalidPosition("markers overlap"));
        }
        if (x | o) & !board.cells_mask() != 0 {
            return Err(BoardError::InvalidPosition("occupancy outside the board"));
        }
        Ok(Board {
            occupancy: [x, o],
            turn,
            ..board
        })
    }

    /// Replay a move sequence from the empty board.
    pub fn from_moves(size: usize, moves: &[usize]) -> Result<Board, BoardError> {
        moves
            .iter()
            .try_fold(Board::empty(size)?, |board, &index| board.apply_move(index))
    }

    /// Number of rows (and columns).
    #[inline]
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Total number of cells, `size * size`.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.size() * self.size()
    }

    /// Mask with one bit set per cell of this board.
    #[inline]
    pub fn cells_mask(&self) -> u64 {
        let cells = self.cell_count();
        if cells == 64 {
            u64::MAX
        } else {
            (1u64 << cells) - 1
        }
    }

    /// Marker to move next.
    #[inline]
    pub fn turn(&self) -> Marker {
        self.turn
    }

    /// Most recently played cell, `None` for boards not reached by a move.
    #[inline]
    pub fn last_move(&self) -> Option<usize> {
        self.last_move.map(usize::from)
    }

    /// Occupancy bits of one marker.
    #[inline]
    pub fn occupancy(&self, marker: Marker) -> u64 {
        self.occupancy[marker.index()]
    }

    /// Union of both markers' occupancy.
    #[inline]
    pub fn occupied(&self) -> u64 {
        self.occupancy[0] | self.occupancy[1]
    }

    /// Number of cells already played.
    #[inline]
    pub fn played_count(&self) -> usize {
        self.occupied().count_ones() as usize
    }

    /// Check if every cell is taken.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.played_count() == self.cell_count()
    }

    /// Check if a cell is on the board and unoccupied.
    #[inline]
    pub fn is_empty_cell(&self, index: usize) -> bool {
        index < self.cell_count() && self.occupied() & (1u64 << index) == 0
    }

    /// Marker occupying the cell at `index`, if any.
    pub fn marker_at(&self, index: usize) -> Option<Marker> {
        if index >= self.cell_count() {
            return None;
        }
        let bit = 1u64 << index;
        Marker::all().find(|&marker| self.occupancy(marker) & bit != 0)
    }

    /// Marker occupying the cell at column `x`, row `y`, if any.
    pub fn marker_at_xy(&self, x: usize, y: usize) -> Option<Marker> {
        if x >= self.size() || y >= self.size() {
            return None;
        }
        self.marker_at(self.index_of(x, y))
    }

    /// Cell index of column `x`, row `y`.
    #[inline]
    pub fn index_of(&self, x: usize, y: usize) -> usize {
        y * self.size() + x
    }

    /// Column and row of a cell index.
    #[inline]
    pub fn coordinates_of(&self, index: usize) -> (usize, usize) {
        (index % self.size(), index / self.size())
    }

    /// Iterate over unoccupied cells in ascending index order.
    #[inline]
    pub fn moves(&self) -> Moves {
        Moves {
            remaining: !self.occupied() & self.cells_mask(),
        }
    }

    /// Unoccupied cells in ascending index order.
    pub fn available_moves(&self) -> Vec<usize> {
        self.moves().collect()
    }

    /// Cache key for this position (excludes the last move).
    #[inline]
    pub fn key(&self) -> BoardKey {
        BoardKey {
            size: self.size,
            x: self.occupancy[0],
            o: self.occupancy[1],
            turn: self.turn,
        }
    }

    /// Winning line masks for this board's size.
    #[inline]
    pub fn winning_combinations(&self) -> &'static [u64] {
        combinations::for_size(self.size())
    }

    /// Marker that completed a line, checking `X` first.
    #[inline]
    pub fn winner(&self) -> Option<Marker> {
        evaluate::winner(self)
    }

    /// Terminal score: `1` X won, `-1` O won, `0` draw, `None` game continues.
    #[inline]
    pub fn score(&self) -> Option<i32> {
        evaluate::score(self)
    }

    /// Check if the game has ended.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.score().is_some()
    }

    /// Play `index` for the side to move and return the resulting board.
    ///
    /// Fails with [`BoardError::GameAlreadyOver`] on a terminal board and with
    /// [`BoardError::InvalidMove`] when the cell is off the board or taken.
    pub fn apply_move(&self, index: usize) -> Result<Board, BoardError> {
        if self.is_terminal() {
            return Err(BoardError::GameAlreadyOver);
        }
        if index >= self.cell_count() {
            return Err(BoardError::InvalidMove {
                index,
                reason: MoveRejection::OutOfRange,
            });
        }
        if !self.is_empty_cell(index) {
            return Err(BoardError::InvalidMove {
                index,
                reason: MoveRejection::Occupied,
            });
        }
        Ok(self.apply_unchecked(index))
    }

    /// Play `index` without legality checks.
    ///
    /// The caller guarantees the board is not terminal and the cell is empty
    /// and on the board. Used by search, where moves come from [`Board::moves`].
    #[inline]
    pub fn apply_unchecked(&self, index: usize) -> Board {
        debug_assert!(self.is_empty_cell(index));
        let mut occupancy = self.occupancy;
        occupancy[self.turn.index()] |= 1u64 << index;
        Board {
            size: self.size,
            occupancy,
            turn: self.turn.opposite(),
            last_move: Some(index as u8),
        }
    }
}

/// Iterator over empty cells, lowest index first.
#[derive(Clone, Copy, Debug)]
pub struct Moves {
    remaining: u64,
}

impl Iterator for Moves {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.remaining.trailing_zeros() as usize;
        self.remaining &= self.remaining - 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Moves {}

/// Unvalidated serialized form of [`Board`].
#[derive(Deserialize)]
struct RawBoard {
    size: u8,
    occupancy: [u64; 2],
    turn: Marker,
    last_move: Option<u8>,
}

impl TryFrom<RawBoard> for Board {
    type Error = BoardError;

    fn try_from(raw: RawBoard) -> Result<Board, BoardError> {
        let board = Board::from_occupancy(
            raw.size as usize,
            raw.occupancy[0],
            raw.occupancy[1],
            raw.turn,
        )?;
        if let Some(index) = raw.last_move {
            if board.marker_at(index as usize).is_none() {
                return Err(BoardError::InvalidPosition("last move is not occupied"));
            }
        }
        Ok(Board {
            last_move: raw.last_move,
            ..board
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_opposite() {
        assert_eq!(Marker::X.opposite(), Marker::O);
        assert_eq!(Marker::O.opposite(), Marker::X);
        assert_eq!(Marker::X.opposite().opposite(), Marker::X);
    }

    #[test]
    fn test_empty_rejects_unsupported_sizes() {
        for size in [0, 1, 2, 9, 16] {
            assert_eq!(
                Board::empty(size),
                Err(BoardError::InvalidConfiguration(size))
            );
        }
    }

    #[test]
    fn test_empty_board_all_sizes() {
        for size in MIN_SIZE..=MAX_SIZE {
            let board = Board::empty(size).unwrap();
            assert_eq!(board.cell_count(), size * size);
            assert_eq!(board.available_moves().len(), size * size);
            assert_eq!(board.turn(), Marker::X);
            assert_eq!(board.last_move(), None);
            assert_eq!(board.occupied(), 0);
            assert_eq!(board.score(), None);
        }
    }

    #[test]
    fn test_cells_mask_covers_full_word_on_8x8() {
        assert_eq!(Board::empty(8).unwrap().cells_mask(), u64::MAX);
        assert_eq!(Board::empty(3).unwrap().cells_mask(), 0b1_1111_1111);
    }

    #[test]
    fn test_apply_move_sets_bit_and_flips_turn() {
        let board = Board::empty(3).unwrap();
        let next = board.apply_move(4).unwrap();

        assert_eq!(next.marker_at(4), Some(Marker::X));
        assert_eq!(next.turn(), Marker::O);
        assert_eq!(next.last_move(), Some(4));
        assert_eq!(next.occupancy(Marker::X), 1 << 4);
        assert_eq!(next.occupancy(Marker::O), 0);

        let after = next.apply_move(0).unwrap();
        assert_eq!(after.marker_at(0), Some(Marker::O));
        assert_eq!(after.turn(), Marker::X);
    }

    #[test]
    fn test_apply_move_leaves_receiver_unchanged() {
        let board = Board::from_moves(4, &[0, 5, 10]).unwrap();
        let before = board;
        let _ = board.apply_move(15).unwrap();
        assert_eq!(board, before);
        assert_eq!(board.occupancy(Marker::X), before.occupancy(Marker::X));
        assert_eq!(board.turn(), Marker::O);
    }

    #[test]
    fn test_apply_move_rejects_occupied_and_out_of_range() {
        let board = Board::from_moves(3, &[4]).unwrap();
        assert_eq!(
            board.apply_move(4),
            Err(BoardError::InvalidMove {
                index: 4,
                reason: MoveRejection::Occupied
            })
        );
        assert_eq!(
            board.apply_move(9),
            Err(BoardError::InvalidMove {
                index: 9,
                reason: MoveRejection::OutOfRange
            })
        );
    }

    #[test]
    fn test_apply_move_after_win_is_game_over() {
        // X: 0 1 2, O: 3 4
        let board = Board::from_moves(3, &[0, 3, 1, 4, 2]).unwrap();
        assert_eq!(board.winner(), Some(Marker::X));
        assert_eq!(board.apply_move(8), Err(BoardError::GameAlreadyOver));
    }

    #[test]
    fn test_apply_move_on_full_board_is_game_over() {
        // X O X / X O O / O X X - draw
        let board = Board::from_moves(3, &[0, 1, 2, 4, 3, 5, 7, 6, 8]).unwrap();
        assert!(board.is_full());
        assert_eq!(board.score(), Some(0));
        assert_eq!(board.apply_move(0), Err(BoardError::GameAlreadyOver));
    }

    #[test]
    fn test_marker_at_xy_matches_index() {
        let board = Board::from_moves(5, &[7, 13]).unwrap();
        assert_eq!(board.marker_at_xy(2, 1), Some(Marker::X));
        assert_eq!(board.marker_at_xy(3, 2), Some(Marker::O));
        assert_eq!(board.marker_at_xy(0, 0), None);
        assert_eq!(board.marker_at_xy(5, 0), None);
        assert_eq!(board.marker_at(25), None);
    }

    #[test]
    fn test_coordinates_roundtrip() {
        let board = Board::empty(6).unwrap();
        for index in 0..board.cell_count() {
            let (x, y) = board.coordinates_of(index);
            assert_eq!(board.index_of(x, y), index);
        }
    }

    #[test]
    fn test_moves_iterates_empty_cells_in_order() {
        let board = Board::from_moves(3, &[0, 8, 4]).unwrap();
        assert_eq!(board.available_moves(), vec![1, 2, 3, 5, 6, 7]);
        assert_eq!(board.moves().len(), 6);
    }

    #[test]
    fn test_key_ignores_move_order() {
        let a = Board::from_moves(3, &[0, 4, 8]).unwrap();
        let b = Board::from_moves(3, &[8, 4, 0]).unwrap();
        assert_ne!(a, b); // last move differs
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_key_distinguishes_turn() {
        let a = Board::from_occupancy(3, 0b11, 0b1000, Marker::X).unwrap();
        let b = Board::from_occupancy(3, 0b11, 0b1000, Marker::O).unwrap();
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_from_occupancy_validation() {
        assert_eq!(
            Board::from_occupancy(3, 0b1, 0b1, Marker::X),
            Err(BoardError::InvalidPosition("markers overlap"))
        );
        assert_eq!(
            Board::from_occupancy(3, 1 << 9, 0, Marker::X),
            Err(BoardError::InvalidPosition("occupancy outside the board"))
        );
        assert!(Board::from_occupancy(8, 1 << 63, 1, Marker::O).is_ok());
    }

    #[test]
    fn test_serde_rejects_overlapping_occupancy() {
        let json = r#"{"size":3,"occupancy":[3,1],"turn":"X","last_move":null}"#;
        assert!(serde_json::from_str::<Board>(json).is_err());

        let board = Board::from_moves(3, &[4, 0]).unwrap();
        let text = serde_json::to_string(&board).unwrap();
        assert_eq!(serde_json::from_str::<Board>(&text).unwrap(), board);
    }
}
