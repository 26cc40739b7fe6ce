//! Tic-Tac-Toe Solver
//!
//! Evaluates a position given as a move list and prints the recommended move.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde::Serialize;
use tictactoe_core::Board;
use tictactoe_solver::stats::SearchStats;
use tictactoe_solver::{full_minimax, Engine, EngineConfig, Evaluation};

#[derive(Parser, Debug)]
#[command(name = "solver", about = "Alpha-beta solver for generalized Tic-Tac-Toe")]
struct Args {
    /// Board side length (3 to 8)
    #[arg(short, long, default_value_t = 3)]
    size: usize,

    /// Cells played so far, X first, as comma-separated indices (row-major)
    #[arg(short, long, value_delimiter = ',')]
    moves: Vec<usize>,

    /// TOML engine configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for move ordering and opening tie breaks
    #[arg(long)]
    seed: Option<u64>,

    /// Search moves in index order
    #[arg(long)]
    no_shuffle: bool,

    /// Stop after this many search nodes
    #[arg(long)]
    node_budget: Option<u64>,

    /// Stop after this many milliseconds
    #[arg(long)]
    time_ms: Option<u64>,

    /// Search even below the opening threshold
    #[arg(long)]
    full: bool,

    /// Also run unpruned minimax and compare scores
    #[arg(long)]
    no_prune: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report {
    size: usize,
    moves: Vec<usize>,
    turn: String,
    /// `opening`, `search` or `terminal`
    source: &'static str,
    best_move: Option<usize>,
    evaluation: Option<Evaluation>,
    completed: bool,
    nodes: u64,
    elapsed_ms: u128,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.no_shuffle {
        config.shuffle = false;
    }
    if args.node_budget.is_some() {
        config.limits.node_budget = args.node_budget;
    }
    if args.time_ms.is_some() {
        config.limits.time_budget_ms = args.time_ms;
    }

    let board = Board::from_moves(args.size, &args.moves).with_context(|| {
        format!(
            "replaying moves {:?} on a {}x{} board",
            args.moves, args.size, args.size
        )
    })?;

    // Set up SIGINT handler to stop the search early
    let stop = Arc::new(AtomicBool::new(false));
    let s = stop.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, stopping search...");
        s.store(true, Ordering::SeqCst);
    })
    .context("installing Ctrl-C handler")?;

    let mut limits = config.limits.to_limits();
    limits.stop = Some(stop);
    let mut engine = Engine::from_config(config).context("building engine")?;
    engine.set_limits(limits);

    let mut report = Report {
        size: board.size(),
        moves: args.moves.clone(),
        turn: board.turn().to_string(),
        source: "terminal",
        best_move: None,
        evaluation: None,
        completed: true,
        nodes: 0,
        elapsed_ms: 0,
    };
    let mut stats: Option<SearchStats> = None;

    if board.is_terminal() {
        report.evaluation = Some(engine.evaluate(&board));
    } else if !args.full && engine.in_opening(&board) {
        report.source = "opening";
        report.best_move = Some(engine.suggest_move(&board)?);
    } else {
        report.source = "search";
        let outcome = engine.analyze(&board);
        report.best_move = outcome.evaluation.best_move;
        report.evaluation = Some(outcome.evaluation);
        report.completed = outcome.completed;
        report.nodes = outcome.stats.nodes;
        report.elapsed_ms = outcome.stats.elapsed().as_millis();
        stats = Some(outcome.stats);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report).context("serializing report")?);
    } else {
        print_report(&board, &report);
        if let Some(stats) = &stats {
            println!();
            stats.print_summary();
            println!("Table entries: {}", engine.searcher().table().len());
        }
    }

    if args.no_prune && report.source == "search" && report.completed {
        info!("running unpruned minimax for comparison");
        let expected = full_minimax(&board, 0);
        let score = report.evaluation.map(|e| e.score).unwrap_or_default();
        if expected == score {
            println!("\nUnpruned minimax agrees: {}", expected);
        } else {
            anyhow::bail!("unpruned minimax scored {expected}, alpha-beta scored {score}");
        }
    }

    Ok(())
}

fn print_report(board: &Board, report: &Report) {
    println!("Tic-Tac-Toe Solver");
    println!("==================");
    println!(
        "Board: {}x{}, {} of {} cells played, {} to move",
        board.size(),
        board.size(),
        board.played_count(),
        board.cell_count(),
        board.turn()
    );
    println!();

    match report.source {
        "terminal" => match board.winner() {
            Some(marker) => println!("Game over: {} wins.", marker),
            None => println!("Game over: draw."),
        },
        "opening" => {
            if let Some(mov) = report.best_move {
                let (x, y) = board.coordinates_of(mov);
                println!("Opening move: {} (x={}, y={})", mov, x, y);
            }
        }
        _ => {
            if let Some(mov) = report.best_move {
                let (x, y) = board.coordinates_of(mov);
                println!("Best move: {} (x={}, y={})", mov, x, y);
            }
            if let Some(evaluation) = report.evaluation {
                let verdict = match evaluation.outcome() {
                    1 => "X wins with optimal play",
                    -1 => "O wins with optimal play",
                    _ => "draw with optimal play",
                };
                println!("Score: {} ({:?}), {}", evaluation.score, evaluation.node_type, verdict);
            }
            if !report.completed {
                println!("Search was stopped early; the move is the best found so far.");
            }
        }
    }
}
