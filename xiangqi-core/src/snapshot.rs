//! DumpedBoard - serializable board snapshot

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::board::Board;
use crate::error::BoardError;
use crate::history::Move;
use crate::pieces::{PieceKind, Side};
use crate::position::Position;

/// A piece as stored in a snapshot (no identity, no previous position)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpedPiece {
    pub kind: PieceKind,
    pub side: Side,
    pub position: Position,
}

/// Everything needed to rebuild a board
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpedBoard {
    pub turn: Side,
    pub pieces: Vec<DumpedPiece>,
    pub history: Vec<Move>,
    pub head: i32,
}

impl DumpedBoard {
    /// Rebuild a board (see [`Board::load`])
    pub fn to_board(&self) -> Result<Board, BoardError> {
        Board::load(self)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = self.to_json()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Pieces sorted by position, for order-insensitive comparison
    pub fn sorted_pieces(&self) -> Vec<DumpedPiece> {
        let mut pieces = self.pieces.clone();
        pieces.sort_by_key(|p| p.position);
        pieces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let snapshot = Board::new().dump();
        let json = snapshot.to_json().unwrap();
        assert!(json.contains(r#""turn": "Red""#));
        assert!(json.contains(r#""head": -1"#));
        assert!(json.contains(r#""kind": "Cannon""#));

        let parsed = DumpedBoard::from_json(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_file_roundtrip() {
        let mut board = Board::new();
        board.move_from(Position::new(2, 8), Position::new(5, 8)).unwrap();
        let snapshot = board.dump();

        let path = std::env::temp_dir().join(format!("xiangqi-snapshot-{}.json", std::process::id()));
        snapshot.save(&path).unwrap();
        let loaded = DumpedBoard::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.history.len(), 1);
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(DumpedBoard::from_json("{\"turn\": \"Green\"}").is_err());
    }
}
