//! Suggest command - search a saved position
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_board(), pick(), report()

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use xiangqi_core::{random_move, search, Board, DumpedBoard, MoveChoice, SearchReport, Side};

use crate::play::{create_rng, search_options};

#[derive(Args)]
pub struct SuggestArgs {
    /// Snapshot JSON file to search from
    #[arg(long, value_name = "FILE")]
    pub snapshot: PathBuf,

    /// Minimax search depth in plies
    #[arg(long, default_value = "2")]
    pub depth: u32,

    /// Search budget in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Add square bonuses to material evaluation
    #[arg(long)]
    pub positional: bool,

    /// Pick uniformly at random instead of searching
    #[arg(long)]
    pub random: bool,

    /// Output the suggestion as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON shape of a suggestion
#[derive(Serialize)]
struct Suggestion {
    turn: Side,
    choice: Option<MoveChoice>,
    value: Option<i32>,
    nodes: Option<u64>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: SuggestArgs, seed: Option<u64>) -> Result<()> {
    let board = load_board(&args.snapshot)?;
    let suggestion = pick(&board, &args, seed);
    report(&board, &suggestion, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn load_board(path: &Path) -> Result<Board> {
    let snapshot = DumpedBoard::load(path)
        .with_context(|| format!("Failed to load snapshot: {}", path.display()))?;
    let board = snapshot
        .to_board()
        .with_context(|| format!("Invalid snapshot: {}", path.display()))?;
    Ok(board)
}

fn pick(board: &Board, args: &SuggestArgs, seed: Option<u64>) -> Suggestion {
    if args.random {
        let mut rng = create_rng(seed);
        return Suggestion {
            turn: board.turn(),
            choice: random_move(board, &mut rng),
            value: None,
            nodes: None,
        };
    }

    let options = search_options(args.depth, args.timeout_ms, args.positional);
    let SearchReport { choice, value, nodes } = search(board, &options);
    Suggestion {
        turn: board.turn(),
        choice,
        value: Some(value),
        nodes: Some(nodes),
    }
}

fn report(board: &Board, suggestion: &Suggestion, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(suggestion).context("Failed to encode suggestion")?;
        println!("{}", text);
        return Ok(());
    }

    println!("{}", board);
    match suggestion.choice {
        Some(choice) => {
            let piece = board
                .piece_at(choice.from)
                .map(|p| p.name())
                .unwrap_or("?");
            print!("{} to move: {} {}", suggestion.turn, piece, choice);
            if let (Some(value), Some(nodes)) = (suggestion.value, suggestion.nodes) {
                print!(" (value {}, {} nodes)", value, nodes);
            }
            println!();
        }
        None if board.is_end() => println!("Game is over"),
        None => println!("{} has no safe move and resigns", suggestion.turn),
    }
    Ok(())
}
