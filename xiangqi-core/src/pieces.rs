//! Sides, piece kinds and the kind-keyed rule table

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::position::Position;
use crate::rules::{self, Generator};

/// Player side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Red,
    Black,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Red => Side::Black,
            Side::Black => Side::Red,
        }
    }

    /// +1 for Red, -1 for Black (evaluation sign)
    pub fn sign(self) -> i32 {
        match self {
            Side::Red => 1,
            Side::Black => -1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Red => write!(f, "Red"),
            Side::Black => write!(f, "Black"),
        }
    }
}

/// Piece kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    King,
    Advisor,
    Bishop,
    Knight,
    Rook,
    Cannon,
    Pawn,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::King,
        PieceKind::Advisor,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Rook,
        PieceKind::Cannon,
        PieceKind::Pawn,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn rule(self) -> &'static PieceRule {
        get_rule(self)
    }
}

/// Static description of a piece kind
#[derive(Clone)]
pub struct PieceRule {
    pub kind: PieceKind,
    /// FEN letter (lowercase; uppercase for Red)
    pub fen: char,
    pub red_name: &'static str,
    pub black_name: &'static str,
    pub generate: Generator,
}

impl PieceRule {
    const fn new(
        kind: PieceKind,
        fen: char,
        red_name: &'static str,
        black_name: &'static str,
        generate: Generator,
    ) -> Self {
        Self {
            kind,
            fen,
            red_name,
            black_name,
            generate,
        }
    }
}

impl fmt::Debug for PieceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PieceRule")
            .field("kind", &self.kind)
            .field("fen", &self.fen)
            .finish()
    }
}

/// All 7 kinds, indexed by `PieceKind as usize`
pub static PIECE_RULES: [PieceRule; 7] = [
    PieceRule::new(PieceKind::King, 'k', "帥", "將", rules::king_moves),
    PieceRule::new(PieceKind::Advisor, 'a', "仕", "士", rules::advisor_moves),
    PieceRule::new(PieceKind::Bishop, 'b', "相", "象", rules::bishop_moves),
    PieceRule::new(PieceKind::Knight, 'n', "傌", "馬", rules::knight_moves),
    PieceRule::new(PieceKind::Rook, 'r', "俥", "車", rules::rook_moves),
    PieceRule::new(PieceKind::Cannon, 'c', "炮", "砲", rules::cannon_moves),
    PieceRule::new(PieceKind::Pawn, 'p', "兵", "卒", rules::pawn_moves),
];

/// Get rule from kind
pub fn get_rule(kind: PieceKind) -> &'static PieceRule {
    &PIECE_RULES[kind.index()]
}

/// Stable identity of a piece within one board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u32);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A piece on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    pub id: PieceId,
    pub kind: PieceKind,
    pub side: Side,
    pub position: Position,
    /// Where the piece stood before its last move; cleared by undo
    pub prev_position: Option<Position>,
}

impl Piece {
    pub fn new(id: PieceId, kind: PieceKind, side: Side, position: Position) -> Self {
        Self {
            id,
            kind,
            side,
            position,
            prev_position: None,
        }
    }

    pub fn is_king(&self) -> bool {
        self.kind == PieceKind::King
    }

    /// FEN letter, uppercase for Red
    pub fn fen_char(&self) -> char {
        let c = get_rule(self.kind).fen;
        match self.side {
            Side::Red => c.to_ascii_uppercase(),
            Side::Black => c,
        }
    }

    /// Traditional character name
    pub fn name(&self) -> &'static str {
        let rule = get_rule(self.kind);
        match self.side {
            Side::Red => rule.red_name,
            Side::Black => rule.black_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_table_order() {
        for kind in PieceKind::ALL {
            assert_eq!(get_rule(kind).kind, kind);
        }
    }

    #[test]
    fn test_fen_char_and_name() {
        let rook = Piece::new(PieceId(0), PieceKind::Rook, Side::Red, Position::new(1, 10));
        assert_eq!(rook.fen_char(), 'R');
        assert_eq!(rook.name(), "俥");
    }

    #[test]
    fn test_opponent() {
        assert_eq!(Side::Red.opponent(), Side::Black);
        assert_eq!(Side::Black.opponent().sign(), 1);
    }
}
