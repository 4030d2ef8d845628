use std::{path::PathBuf, time::Instant};

use polytris_engine::{BitGrid, GameConfig, GameSession, GameStats, PieceCatalog};
use polytris_evaluator::dellacherie::DellacherieEvaluator;
use polytris_search::{
    MoveStrategy,
    greedy::GreedyStrategy,
    move_selector::{MoveSelector, SearchConfig},
};
use serde::Serialize;

use crate::util;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, derive_more::FromStr)]
#[serde(rename_all = "lowercase")]
pub(crate) enum StrategyKind {
    #[default]
    Tree,
    Greedy,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Number of columns
    #[arg(long, default_value_t = 10)]
    width: usize,
    /// Number of rows
    #[arg(long, default_value_t = 20)]
    height: usize,
    /// Number of cells of every piece
    #[arg(long, default_value_t = 4)]
    cells: usize,
    /// Number of pieces revealed ahead of the one being played
    #[arg(long, default_value_t = 0)]
    known_ahead: usize,
    /// Lookahead depth of the tree search, in moves
    #[arg(long, default_value_t = 1)]
    depth: usize,
    /// Expand the search tree on all available cores
    #[arg(long, default_value_t = false)]
    multithreading: bool,
    /// Move selection strategy: "tree" or "greedy"
    #[arg(long, default_value = "tree")]
    strategy: StrategyKind,
    /// Seed of the piece generator (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after this many moves
    #[arg(long)]
    max_moves: Option<usize>,
    /// Print a progress line every N moves (0 disables)
    #[arg(long, default_value_t = 1000)]
    progress_interval: usize,
    /// Write a JSON summary of the session to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SessionSummary<'a> {
    config: &'a GameConfig,
    strategy: StrategyKind,
    depth: usize,
    seed: u64,
    game_over: bool,
    elapsed_secs: f64,
    final_grid: &'a BitGrid,
    stats: &'a GameStats,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        width,
        height,
        cells,
        known_ahead,
        depth,
        multithreading,
        strategy,
        seed,
        max_moves,
        progress_interval,
        output,
    } = arg;

    let config = GameConfig {
        width: *width,
        height: *height,
        cell_count: *cells,
        known_ahead: *known_ahead,
    };
    let seed = seed.unwrap_or_else(rand::random);
    let mut session = GameSession::new(config, seed)?;
    let mut player: Box<dyn MoveStrategy> = match strategy {
        StrategyKind::Tree => Box::new(MoveSelector::new(
            SearchConfig::new(*depth, *multithreading)?,
            Box::new(DellacherieEvaluator),
        )),
        StrategyKind::Greedy => Box::new(GreedyStrategy::new(Box::new(DellacherieEvaluator))),
    };

    eprintln!(
        "Playing {width}x{height} with {} pieces of {cells} cells, {known_ahead} known ahead",
        session.catalog().len()
    );
    match strategy {
        StrategyKind::Tree => eprintln!(
            "Strategy: tree search, depth {depth}, multithreading {}",
            if *multithreading { "on" } else { "off" }
        ),
        StrategyKind::Greedy => eprintln!("Strategy: greedy"),
    }
    eprintln!("Seed: {seed}");

    let started = Instant::now();
    while session.session_state().is_playing()
        && max_moves.is_none_or(|max| session.stats().moves() < max)
    {
        session.reveal_next_piece();
        let transformation = player.decide_move(session.state(), session.catalog())?;
        let result = session.play(transformation)?;
        if result.game_over {
            break;
        }

        let stats = session.stats();
        if *progress_interval > 0 && stats.moves() % progress_interval == 0 {
            eprintln!(
                "Played {} - Cleared {}",
                stats.moves(),
                stats.total_cleared_lines()
            );
        }
    }
    let elapsed = started.elapsed();

    let game_over = session.session_state().is_game_over();
    eprintln!(
        "{} after {:.2}s",
        if game_over { "Game over" } else { "Stopped" },
        elapsed.as_secs_f64()
    );
    print_report(&session);

    if let Some(path) = output {
        let summary = SessionSummary {
            config: session.config(),
            strategy: *strategy,
            depth: *depth,
            seed,
            game_over,
            elapsed_secs: elapsed.as_secs_f64(),
            final_grid: session.state().grid(),
            stats: session.stats(),
        };
        util::write_json_file("session summary", path, &summary)?;
        eprintln!("Summary written to {}", path.display());
    }

    Ok(())
}

fn print_report(session: &GameSession) {
    let stats = session.stats();
    println!("{}", session.state().grid());
    println!("Moves played:  {}", stats.moves());
    println!("Lines cleared: {}", stats.total_cleared_lines());
    println!(
        "Lines per move: {:.3}",
        lines_per_move(stats.total_cleared_lines(), stats.moves())
    );

    println!();
    println!("Pieces played:");
    print_piece_counts(session.catalog(), stats.piece_counts());

    println!();
    println!("Lines cleared at once:");
    for (i, count) in stats.line_cleared_counter().iter().enumerate() {
        println!("  {:>2}: {count}", i + 1);
    }
}

fn print_piece_counts(catalog: &PieceCatalog, counts: &[usize]) {
    for (index, (piece, count)) in catalog.pieces().iter().zip(counts).enumerate() {
        let rows = piece
            .variant(0)
            .rows()
            .iter()
            .map(|bits| format!("{bits:b}"))
            .collect::<Vec<_>>()
            .join("/");
        println!("  #{index:<2} [{rows}]: {count}");
    }
}

#[expect(clippy::cast_precision_loss)]
fn lines_per_move(lines: usize, moves: usize) -> f64 {
    if moves == 0 {
        0.0
    } else {
        lines as f64 / moves as f64
    }
}
