//! Move log with a head cursor
//!
//! Moves after `head` are the redo branch. Recording a new move while a redo
//! branch exists discards that branch first.

use serde::{Deserialize, Serialize};

use crate::error::BoardError;
use crate::pieces::{PieceKind, Side};
use crate::position::Position;

/// A recorded move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub kind: PieceKind,
    pub side: Side,
    pub from: Position,
    pub to: Position,
    /// Kind of the captured piece, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eat: Option<PieceKind>,
}

impl Move {
    pub fn is_capture(&self) -> bool {
        self.eat.is_some()
    }
}

/// Linear history with a cursor; `head` is -1 when nothing has been played
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct History {
    moves: Vec<Move>,
    head: i32,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            moves: Vec::new(),
            head: -1,
        }
    }

    /// Rebuild from a stored log and cursor, refusing an out-of-range cursor
    pub fn from_parts(moves: Vec<Move>, head: i32) -> Result<Self, BoardError> {
        if head < -1 || head >= moves.len() as i32 {
            return Err(BoardError::InvalidHistoryCursor {
                head,
                len: moves.len(),
            });
        }
        Ok(Self { moves, head })
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn head(&self) -> i32 {
        self.head
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.head >= 0
    }

    pub fn can_redo(&self) -> bool {
        ((self.head + 1) as usize) < self.moves.len()
    }

    /// Move at the cursor (the one `undo` would revert)
    pub fn current(&self) -> Option<&Move> {
        if self.head < 0 {
            return None;
        }
        self.moves.get(self.head as usize)
    }

    /// Move after the cursor (the one `redo` would replay)
    pub fn upcoming(&self) -> Option<&Move> {
        self.moves.get((self.head + 1) as usize)
    }

    /// Append a move, truncating any redo branch
    pub fn record(&mut self, mv: Move) {
        let keep = (self.head + 1) as usize;
        if keep < self.moves.len() {
            self.moves.truncate(keep);
        }
        self.moves.push(mv);
        self.head = self.moves.len() as i32 - 1;
    }

    /// Step the cursor back, returning the move to revert
    pub fn step_back(&mut self) -> Option<Move> {
        let mv = *self.current()?;
        self.head -= 1;
        Some(mv)
    }

    /// Step the cursor forward, returning the move to replay
    pub fn step_forward(&mut self) -> Option<Move> {
        let mv = *self.upcoming()?;
        self.head += 1;
        Some(mv)
    }

    pub fn clear(&mut self) {
        self.moves.clear();
        self.head = -1;
    }
}
