//! Play command - AI vs AI game from the opening position
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_agents(), play_out(), report_result(), save_snapshot()
//! - Level 3: build_agent(), announce_captures()
//! - Level 4: utilities

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use xiangqi_core::{
    play_game_with, Agent, Board, Event, GameOutcome, GameRecord, Heuristics, MinimaxAI,
    MoveChoice, RandomAI, SearchOptions, SubscriptionId,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Which picker drives a side
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AgentKind {
    Minimax,
    Random,
}

#[derive(Args)]
pub struct PlayArgs {
    /// Minimax search depth in plies
    #[arg(long, default_value = "2")]
    pub depth: u32,

    /// Stop after this many moves
    #[arg(long, default_value = "200")]
    pub max_plies: usize,

    /// Player for Red
    #[arg(long, value_enum, default_value = "minimax")]
    pub red: AgentKind,

    /// Player for Black
    #[arg(long, value_enum, default_value = "random")]
    pub black: AgentKind,

    /// Per-move search budget in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Add square bonuses to material evaluation
    #[arg(long)]
    pub positional: bool,

    /// Only print the final position
    #[arg(long)]
    pub quiet: bool,

    /// Write the final position as a JSON snapshot
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Build one agent per side
/// 2. Play the game out
/// 3. Report and optionally save
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let mut rng = create_rng(seed);
    let (mut red, mut black) = build_agents(&args, &mut rng);

    tracing::info!(
        "Starting game: {:?} (Red) vs {:?} (Black), depth={}, max_plies={}",
        args.red,
        args.black,
        args.depth,
        args.max_plies
    );

    let record = play_out(Board::new(), red.as_mut(), black.as_mut(), &args);

    report_result(&record);

    if let Some(path) = &args.save {
        save_snapshot(&record.board, path)?;
    }

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_agents(args: &PlayArgs, rng: &mut ChaCha8Rng) -> (Box<dyn Agent>, Box<dyn Agent>) {
    let options = search_options(args.depth, args.timeout_ms, args.positional);
    let red = build_agent(args.red, &options, rng);
    let black = build_agent(args.black, &options, rng);
    (red, black)
}

/// Alternate agents until the game ends or the ply limit is hit
fn play_out(
    mut board: Board,
    red: &mut dyn Agent,
    black: &mut dyn Agent,
    args: &PlayArgs,
) -> GameRecord {
    let subscription = announce_captures(&mut board);
    let quiet = args.quiet;

    let mut record = play_game_with(board, red, black, args.max_plies, |mv, board| {
        if !quiet {
            println!("{:>3}. {} {}", board.head() + 1, mv.side, MoveChoice::from(*mv));
            println!("{}", board);
        }
    });

    record.board.unsubscribe(subscription);
    record
}

fn report_result(record: &GameRecord) {
    let plies = record.moves.len();
    println!("\n=== Result ===");
    println!("{}", record.board);
    match record.outcome {
        GameOutcome::Won(side) => println!("{} wins after {} plies", side, plies),
        GameOutcome::Resigned(side) => println!("{} resigns after {} plies", side, plies),
        GameOutcome::Unfinished => println!("No result after {} plies", plies),
    }
    let captures = record.moves.iter().filter(|mv| mv.is_capture()).count();
    println!("Captures: {}", captures);
}

fn save_snapshot(board: &Board, path: &Path) -> Result<()> {
    board
        .dump()
        .save(path)
        .with_context(|| format!("Failed to save snapshot: {}", path.display()))?;
    tracing::info!("Saved snapshot to {}", path.display());
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn build_agent(kind: AgentKind, options: &SearchOptions, rng: &mut ChaCha8Rng) -> Box<dyn Agent> {
    match kind {
        AgentKind::Minimax => Box::new(MinimaxAI::new(options.clone())),
        AgentKind::Random => Box::new(RandomAI::with_seed(rng.gen())),
    }
}

/// Log every capture while the game is played
fn announce_captures(board: &mut Board) -> SubscriptionId {
    board.subscribe(|event| {
        if let Event::Eat(piece) = event {
            tracing::info!("{} {} captured at {}", piece.side, piece.name(), piece.position);
        }
    })
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
pub fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

pub fn search_options(depth: u32, timeout_ms: Option<u64>, positional: bool) -> SearchOptions {
    let mut options = SearchOptions::default()
        .with_depth(depth)
        .with_heuristics(Heuristics::default().with_positional(positional));
    if let Some(ms) = timeout_ms {
        options = options.with_timeout(Duration::from_millis(ms));
    }
    options
}
