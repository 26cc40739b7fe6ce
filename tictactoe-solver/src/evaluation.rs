//! Search result records.

use serde::{Deserialize, Serialize};
use tictactoe_core::MAX_CELLS;

/// Terminal scores are scaled by `SCORE_SCALE - depth`, so faster wins and
/// slower losses score further from zero.
pub const SCORE_SCALE: i32 = 100;

// Depth never exceeds the cell count, so the scale factor stays positive.
const _: () = assert!((MAX_CELLS as i32) < SCORE_SCALE);

/// How a stored score relates to the true minimax value.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    /// The true minimax value.
    Exact,
    /// The true value is at least the score (beta cutoff).
    LowerBound,
    /// The true value is at most the score (alpha fail-low).
    UpperBound,
}

impl NodeType {
    /// Classify `score` against the search window it was computed in.
    #[inline]
    pub fn classify(score: i32, alpha: i32, beta: i32) -> NodeType {
        if score <= alpha {
            NodeType::UpperBound
        } else if score >= beta {
            NodeType::LowerBound
        } else {
            NodeType::Exact
        }
    }
}

/// Score of a position together with the move that achieves it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Evaluation {
    pub score: i32,
    pub node_type: NodeType,
    /// Ply from the search root at which this was computed.
    pub depth: u8,
    /// Recommended move; `None` at terminal nodes.
    pub best_move: Option<usize>,
}

impl Evaluation {
    /// Exact evaluation of a finished game reached at `depth`.
    #[inline]
    pub fn terminal(outcome: i32, depth: u8) -> Evaluation {
        Evaluation {
            score: terminal_score(outcome, depth),
            node_type: NodeType::Exact,
            depth,
            best_move: None,
        }
    }

    #[inline]
    pub fn is_exact(&self) -> bool {
        self.node_type == NodeType::Exact
    }

    /// `1` if X wins with best play, `-1` if O does, `0` for a draw.
    #[inline]
    pub fn outcome(&self) -> i32 {
        self.score.signum()
    }
}

/// Depth-weighted score of a terminal outcome (`1`, `0` or `-1`).
#[inline]
pub fn terminal_score(outcome: i32, depth: u8) -> i32 {
    debug_assert!((depth as i32) < SCORE_SCALE);
    outcome * (SCORE_SCALE - depth as i32)
}

/// Re-anchor a score computed at ply `depth` to the node itself.
///
/// A win `k` plies below the node scores `SCORE_SCALE - k` whatever the
/// root was, so the result can be stored and reused by later searches.
#[inline]
pub fn score_to_node(score: i32, depth: u8) -> i32 {
    score + score.signum() * depth as i32
}

/// Inverse of [`score_to_node`] for a node reached at ply `depth`.
#[inline]
pub fn score_from_node(score: i32, depth: u8) -> i32 {
    score - score.signum() * depth as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(NodeType::classify(-5, -5, 10), NodeType::UpperBound);
        assert_eq!(NodeType::classify(10, -5, 10), NodeType::LowerBound);
        assert_eq!(NodeType::classify(0, -5, 10), NodeType::Exact);
        assert_eq!(NodeType::classify(0, i32::MIN, i32::MAX), NodeType::Exact);
    }

    #[test]
    fn test_terminal_score_prefers_fast_wins() {
        assert_eq!(terminal_score(1, 0), 100);
        assert_eq!(terminal_score(-1, 3), -97);
        assert_eq!(terminal_score(0, 7), 0);
        assert!(terminal_score(1, 1) > terminal_score(1, 5));
        assert!(terminal_score(-1, 1) < terminal_score(-1, 5));
        assert!(terminal_score(1, MAX_CELLS as u8) > 0);
    }

    #[test]
    fn test_node_relative_scores() {
        // Win found 3 plies below a node at ply 2.
        let score = terminal_score(1, 5);
        assert_eq!(score_to_node(score, 2), 97);
        // Same node reached at ply 0 and ply 4 by other searches.
        assert_eq!(score_from_node(97, 0), 97);
        assert_eq!(score_from_node(97, 4), terminal_score(1, 7));
        assert_eq!(score_from_node(score_to_node(-96, 3), 3), -96);
        assert_eq!(score_to_node(0, 6), 0);
    }

    #[test]
    fn test_outcome_sign() {
        assert_eq!(Evaluation::terminal(1, 9).outcome(), 1);
        assert_eq!(Evaluation::terminal(-1, 4).outcome(), -1);
        assert_eq!(Evaluation::terminal(0, 9).outcome(), 0);
    }
}
