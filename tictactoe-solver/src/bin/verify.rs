//! Cross-check alpha-beta against unpruned minimax on random positions.
//!
//! Every position is searched twice: once with a fresh table and once with a
//! table shared across all positions in generation order. Both scores must
//! equal the unpruned minimax value.

use anyhow::{bail, ensure, Result};
use clap::Parser;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tictactoe_core::{Board, Marker};
use tictactoe_solver::{full_minimax, Searcher, TranspositionTable};

#[derive(Parser, Debug)]
#[command(name = "verify", about = "Compare alpha-beta with unpruned minimax")]
struct Args {
    /// Number of random positions
    #[arg(short, long, default_value_t = 200)]
    positions: usize,

    /// Board side length
    #[arg(short, long, default_value_t = 3)]
    size: usize,

    /// Cells played before a position is checked
    #[arg(long, default_value_t = 0)]
    min_played: usize,

    #[arg(long, default_value_t = 1)]
    seed: u64,
}

/// Random non-terminal position with at least `min_played` cells filled.
fn random_position(rng: &mut StdRng, size: usize, min_played: usize) -> Result<Option<Board>> {
    let mut board = Board::empty(size)?;
    let cells = board.cell_count();
    let target = rng.random_range(min_played.min(cells)..=cells);
    while board.played_count() < target && !board.is_terminal() {
        let moves = board.available_moves();
        let Some(&mov) = moves.choose(rng) else { break };
        board = board.apply_move(mov)?;
    }
    Ok((!board.is_terminal()).then_some(board))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    ensure!(
        args.min_played < args.size * args.size,
        "--min-played must leave at least one empty cell"
    );
    // Unpruned minimax is exponential in the empty cells.
    let empty = (args.size * args.size).saturating_sub(args.min_played);
    ensure!(
        empty <= 11,
        "{} empty cells is too many for unpruned minimax; raise --min-played",
        empty
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut boards = Vec::with_capacity(args.positions);
    while boards.len() < args.positions {
        if let Some(board) = random_position(&mut rng, args.size, args.min_played)? {
            boards.push(board);
        }
    }

    let mut shared = Searcher::new(TranspositionTable::unbounded()).with_seed(args.seed);
    let mut mismatches = 0usize;

    for (i, board) in boards.iter().enumerate() {
        let expected = full_minimax(board, 0);
        let fresh = Searcher::new(TranspositionTable::unbounded())
            .with_seed(args.seed.wrapping_add(i as u64))
            .search(board)
            .evaluation;
        let reused = shared.search(board).evaluation;

        debug!(
            "position {}: {} played, minimax {} fresh {} shared {}",
            i,
            board.played_count(),
            expected,
            fresh.score,
            reused.score
        );
        if fresh.score != expected || reused.score != expected {
            mismatches += 1;
            println!(
                "MISMATCH x={:#x} o={:#x} turn={}: minimax {} fresh {} shared {}",
                board.occupancy(Marker::X),
                board.occupancy(Marker::O),
                board.turn(),
                expected,
                fresh.score,
                reused.score
            );
        }
        if let Some(mov) = fresh.best_move {
            let child = board.apply_move(mov)?;
            if full_minimax(&child, 1) != expected {
                mismatches += 1;
                println!("MISMATCH best move {} does not achieve {}", mov, expected);
            }
        }
    }

    info!("checked {} positions on {}x{}", boards.len(), args.size, args.size);
    println!(
        "{} positions, {} mismatches, shared table holds {} entries",
        boards.len(),
        mismatches,
        shared.table().len()
    );

    if mismatches > 0 {
        bail!("{} mismatches", mismatches);
    }
    Ok(())
}
