//! Error types
//!
//! `BoardError` is fatal: a board is never built from an inconsistent
//! configuration. `Rejection` is the non-fatal outcome of an operation that
//! left the board untouched.

use crate::pieces::{PieceId, Side};
use crate::position::Position;

/// Construction-time invariant violation
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("invalid history cursor {head} for history of length {len}")]
    InvalidHistoryCursor { head: i32, len: usize },

    #[error("position {0} is off the board")]
    OutOfBounds(Position),

    #[error("two pieces occupy {0}")]
    Overlap(Position),

    #[error("{0} has more than one King")]
    DuplicateKing(Side),

    #[error("too many pieces: {0}")]
    TooManyPieces(usize),

    #[error("history entry {index} does not match the pieces")]
    HistoryMismatch { index: usize },
}

/// Operation refused; the board is unchanged
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("no piece with id {0}")]
    UnknownPiece(PieceId),

    #[error("no piece at {0}")]
    NoPieceAt(Position),

    #[error("game is over")]
    GameOver,

    #[error("not {side}'s turn ({turn} to move)")]
    NotYourTurn { side: Side, turn: Side },

    #[error("illegal move {from} -> {to}")]
    IllegalMove { from: Position, to: Position },

    #[error("nothing to undo")]
    EmptyHistory,

    #[error("nothing to redo")]
    NoRedo,

    #[error("recorded move {from} -> {to} does not match the board")]
    HistoryMismatch { from: Position, to: Position },
}
