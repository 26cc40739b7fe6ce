//! Winning line masks.
//!
//! Every row, column and both diagonals of a board, as bitmasks with exactly
//! `size` bits set. There are `2 * size + 2` of them. Each size is generated
//! on first use and kept for the life of the process.

use std::sync::OnceLock;

use crate::{MAX_SIZE, MIN_SIZE};

const SIZE_COUNT: usize = MAX_SIZE - MIN_SIZE + 1;

static CACHE: [OnceLock<Box<[u64]>>; SIZE_COUNT] = [const { OnceLock::new() }; SIZE_COUNT];

/// Winning combinations for `size`.
///
/// # Panics
///
/// If `size` is outside `MIN_SIZE..=MAX_SIZE`. Boards are validated on
/// construction, so `Board::winning_combinations` never hits this.
pub fn for_size(size: usize) -> &'static [u64] {
    assert!(
        (MIN_SIZE..=MAX_SIZE).contains(&size),
        "no winning combinations for board size {size}"
    );
    CACHE[size - MIN_SIZE].get_or_init(|| generate(size))
}

/// Rows, then columns, then the main diagonal, then the anti-diagonal.
fn generate(size: usize) -> Box<[u64]> {
    let mut lines = Vec::with_capacity(2 * size + 2);
    let row = (1u64 << size) - 1;

    for y in 0..size {
        lines.push(row << (y * size));
    }
    for x in 0..size {
        lines.push((0..size).fold(0u64, |acc, y| acc | 1u64 << (y * size + x)));
    }
    lines.push((0..size).fold(0u64, |acc, i| acc | 1u64 << (i * (size + 1))));
    lines.push((0..size).fold(0u64, |acc, i| acc | 1u64 << ((i + 1) * (size - 1))));

    lines.into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_3x3_lines() {
        assert_eq!(
            for_size(3),
            &[
                0b000_000_111, // Row 0: cells 0,1,2
                0b000_111_000, // Row 1: cells 3,4,5
                0b111_000_000, // Row 2: cells 6,7,8
                0b001_001_001, // Col 0: cells 0,3,6
                0b010_010_010, // Col 1: cells 1,4,7
                0b100_100_100, // Col 2: cells 2,5,8
                0b100_010_001, // Main diagonal: cells 0,4,8
                0b001_010_100, // Anti-diagonal: cells 2,4,6
            ]
        );
    }

    #[test]
    fn test_line_count_and_width_all_sizes() {
        for size in MIN_SIZE..=MAX_SIZE {
            let lines = for_size(size);
            assert_eq!(lines.len(), 2 * size + 2);
            for &line in lines {
                assert_eq!(line.count_ones() as usize, size, "size {size}: {line:#b}");
            }
        }
    }

    #[test]
    fn test_lines_are_distinct_and_on_board() {
        for size in MIN_SIZE..=MAX_SIZE {
            let lines = for_size(size);
            let cells = size * size;
            for (i, &a) in lines.iter().enumerate() {
                if cells < 64 {
                    assert_eq!(a >> cells, 0);
                }
                for &b in &lines[i + 1..] {
                    assert_ne!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_8x8_anti_diagonal() {
        let anti = for_size(8)[17];
        let expected = [7, 14, 21, 28, 35, 42, 49, 56]
            .iter()
            .fold(0u64, |acc, &i| acc | 1 << i);
        assert_eq!(anti, expected);
    }

    #[test]
    fn test_cache_returns_same_slice() {
        assert!(std::ptr::eq(for_size(5), for_size(5)));
    }

    #[test]
    #[should_panic]
    fn test_unsupported_size_panics() {
        for_size(9);
    }
}
