//! Xiangqi Core - Rules engine and AI
//!
//! This crate provides the core game logic for Xiangqi (Chinese chess):
//! - Board geometry (9x10 grid, palaces, river)
//! - Piece kinds and per-kind move generation
//! - Board state with turn handling, undo/redo history and events
//! - JSON snapshots for saving and restoring games
//! - Material evaluation and fixed-depth minimax search

pub mod position;
pub mod pieces;
pub mod rules;
pub mod error;
pub mod history;
pub mod events;
pub mod board;
pub mod snapshot;
pub mod eval;
pub mod ai;

// Re-exports for convenient access
pub use position::{Direction, Position, FILES, RANKS};
pub use pieces::{get_rule, Piece, PieceId, PieceKind, PieceRule, Side, PIECE_RULES};
pub use rules::{filter_bounds, filter_facing, legal_destinations, Occupancy};
pub use error::{BoardError, Rejection};
pub use history::{History, Move};
pub use events::{Event, SubscriptionId};
pub use board::{standard_layout, Board, GameState};
pub use snapshot::{DumpedBoard, DumpedPiece};
pub use eval::{evaluate, Heuristics};
pub use ai::{
    minimax_move, play_game, play_game_with, random_move, search, Agent, GameOutcome, GameRecord,
    MinimaxAI, MoveChoice, RandomAI, SearchInput, SearchOptions, SearchReport,
};
