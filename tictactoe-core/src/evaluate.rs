//! Terminal-state evaluation.

use crate::{Board, Marker};

/// Score of a position won by `X`.
pub const X_WINS: i32 = 1;
/// Score of a full board with no completed line.
pub const DRAW: i32 = 0;
/// Score of a position won by `O`.
pub const O_WINS: i32 = -1;

/// Check if `bits` contain a complete line on a board of `size`.
#[inline]
pub fn has_line(bits: u64, size: usize) -> bool {
    crate::combinations::for_size(size)
        .iter()
        .any(|&line| bits & line == line)
}

/// Marker that completed a line. `X` is checked before `O`.
pub fn winner(board: &Board) -> Option<Marker> {
    Marker::all().find(|&marker| has_line(board.occupancy(marker), board.size()))
}

/// `X_WINS`, `O_WINS`, `DRAW` for a full board without a line, `None` while
/// the game continues. A full board with a completed line is a win.
pub fn score(board: &Board) -> Option<i32> {
    match winner(board) {
        Some(Marker::X) => Some(X_WINS),
        Some(Marker::O) => Some(O_WINS),
        None if board.is_full() => Some(DRAW),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_in_progress() {
        let board = Board::from_moves(3, &[0, 4]).unwrap();
        assert_eq!(score(&board), None);
        assert_eq!(winner(&board), None);
    }

    #[test]
    fn test_score_x_column() {
        let board = Board::from_occupancy(4, 0x1111, 0b0110, Marker::O).unwrap();
        assert_eq!(score(&board), Some(X_WINS));
    }

    #[test]
    fn test_score_o_diagonal() {
        let board = Board::from_occupancy(3, 0b000_001_011, 0b001_010_100, Marker::X).unwrap();
        assert_eq!(winner(&board), Some(Marker::O));
        assert_eq!(score(&board), Some(O_WINS));
    }

    #[test]
    fn test_full_board_with_line_is_win() {
        // X X X / O O X / X O O
        let x = 0b001_100_111;
        let o = 0b110_011_000;
        let board = Board::from_occupancy(3, x, o, Marker::O).unwrap();
        assert!(board.is_full());
        assert_eq!(score(&board), Some(X_WINS));
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        // X O X / X O O / O X X
        let x = 0b110_001_101;
        let o = 0b001_110_010;
        let board = Board::from_occupancy(3, x, o, Marker::O).unwrap();
        assert_eq!(score(&board), Some(DRAW));
    }

    #[test]
    fn test_x_checked_before_o() {
        // Not reachable by play, but the order must be fixed.
        let board = Board::from_occupancy(3, 0b111, 0b111_000, Marker::X).unwrap();
        assert_eq!(winner(&board), Some(Marker::X));
    }
}
