//! Static position evaluation
//!
//! Scores are from Red's point of view: positive favours Red, negative
//! favours Black. A captured King simply drops out of the material sum, so
//! King capture dominates every other term.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::pieces::{PieceKind, Side};
use crate::position::{Position, FILES, RANKS};

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heuristics {
    /// Base value per piece kind, indexed by `PieceKind::index`
    pub piece_values: [i32; 7],
    /// Add the per-square bonus tables on top of material
    pub positional: bool,
}

impl Default for Heuristics {
    fn default() -> Self {
        let mut values = [0i32; 7];
        values[PieceKind::King.index()] = 10000;
        values[PieceKind::Rook.index()] = 900;
        values[PieceKind::Cannon.index()] = 450;
        values[PieceKind::Knight.index()] = 400;
        values[PieceKind::Advisor.index()] = 200;
        values[PieceKind::Bishop.index()] = 200;
        values[PieceKind::Pawn.index()] = 100;

        Self {
            piece_values: values,
            positional: false,
        }
    }
}

impl Heuristics {
    pub fn value(&self, kind: PieceKind) -> i32 {
        self.piece_values[kind.index()]
    }

    pub fn with_value(mut self, kind: PieceKind, value: i32) -> Self {
        self.piece_values[kind.index()] = value;
        self
    }

    pub fn with_positional(mut self, positional: bool) -> Self {
        self.positional = positional;
        self
    }
}

// ============================================================================
// POSITIONAL TABLES
// ============================================================================

/// Bonus per square from Red's side: row 0 is Black's back rank (y = 1)
type BonusTable = [[i32; FILES as usize]; RANKS as usize];

const KING_TABLE: BonusTable = [
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   1,   1,   1,   0,   0,   0],
    [  0,   0,   0,   2,   2,   2,   0,   0,   0],
    [  0,   0,   0,  11,  15,  11,   0,   0,   0],
];

const ADVISOR_TABLE: BonusTable = [
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,  20,   0,  20,   0,   0,   0],
    [  0,   0,   0,   0,  23,   0,   0,   0,   0],
    [  0,   0,   0,  20,   0,  20,   0,   0,   0],
];

const BISHOP_TABLE: BonusTable = [
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,  20,   0,   0,   0,  20,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [ 18,   0,   0,   0,  23,   0,   0,   0,  18],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,  20,   0,   0,   0,  20,   0,   0],
];

const ROOK_TABLE: BonusTable = [
    [  6,   8,   7,  13,  14,  13,   7,   8,   6],
    [  6,  12,   9,  16,  33,  16,   9,  12,   6],
    [  6,   8,   7,  14,  16,  14,   7,   8,   6],
    [  6,  13,  13,  16,  16,  16,  13,  13,   6],
    [  8,  11,  11,  14,  15,  14,  11,  11,   8],
    [  8,  12,  12,  14,  15,  14,  12,  12,   8],
    [  4,   9,   4,  12,  14,  12,   4,   9,   4],
    [ -2,   8,   4,  12,  12,  12,   4,   8,  -2],
    [  0,   8,   6,  12,   0,  12,   6,   8,   0],
    [ -6,   6,   4,  12,   0,  12,   4,   6,  -6],
];

const KNIGHT_TABLE: BonusTable = [
    [  0,   0,   0,   6,   0,   6,   0,   0,   0],
    [  0,   6,  13,   7,   4,   7,  13,   6,   0],
    [  2,   8,   9,  13,   9,  13,   9,   8,   2],
    [  3,  18,  10,  17,  10,  17,  10,  18,   3],
    [  0,  10,   9,  13,  14,  13,   9,  10,   0],
    [  0,   8,  11,  12,  13,  12,  11,   8,   0],
    [  2,   4,   8,   5,   8,   5,   8,   4,   2],
    [  3,   2,   4,   5,   2,   5,   4,   2,   3],
    [ -5,   0,   2,   3, -12,   3,   2,   0,  -5],
    [ -2,  -5,   0,  -2,   0,  -2,   0,  -5,  -2],
];

const CANNON_TABLE: BonusTable = [
    [  4,   4,   0,  -5,  -6,  -5,   0,   4,   4],
    [  2,   2,   0,  -4,  -7,  -4,   0,   2,   2],
    [  1,   1,   0,  -5,  -4,  -5,   0,   1,   1],
    [  0,   3,   3,   2,   4,   2,   3,   3,   0],
    [  0,   0,   0,   0,   4,   0,   0,   0,   0],
    [ -1,   0,   3,   0,   4,   0,   3,   0,  -1],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  1,   0,   4,   3,   5,   3,   4,   0,   1],
    [  0,   1,   2,   2,   2,   2,   2,   1,   0],
    [  0,   0,   1,   3,   3,   3,   1,   0,   0],
];

const PAWN_TABLE: BonusTable = [
    [  9,   9,   9,  11,  13,  11,   9,   9,   9],
    [ 19,  24,  34,  42,  44,  42,  34,  24,  19],
    [ 19,  24,  32,  37,  37,  37,  32,  24,  19],
    [ 19,  23,  27,  29,  30,  29,  27,  23,  19],
    [ 14,  18,  20,  27,  29,  27,  20,  18,  14],
    [  7,   0,  13,   0,  16,   0,  13,   0,   7],
    [  7,   0,   7,   0,  15,   0,   7,   0,   7],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
    [  0,   0,   0,   0,   0,   0,   0,   0,   0],
];

fn bonus_table(kind: PieceKind) -> &'static BonusTable {
    match kind {
        PieceKind::King => &KING_TABLE,
        PieceKind::Advisor => &ADVISOR_TABLE,
        PieceKind::Bishop => &BISHOP_TABLE,
        PieceKind::Knight => &KNIGHT_TABLE,
        PieceKind::Rook => &ROOK_TABLE,
        PieceKind::Cannon => &CANNON_TABLE,
        PieceKind::Pawn => &PAWN_TABLE,
    }
}

/// Square bonus for a piece; Black reads the table upside down
pub fn positional_bonus(kind: PieceKind, side: Side, pos: Position) -> i32 {
    let row = match side {
        Side::Red => pos.y - 1,
        Side::Black => RANKS - pos.y,
    };
    bonus_table(kind)[row as usize][(pos.x - 1) as usize]
}

// ============================================================================
// EVALUATION
// ============================================================================

/// Material (plus optional square bonuses), positive for Red
pub fn evaluate(board: &Board, heuristics: &Heuristics) -> i32 {
    board
        .pieces()
        .iter()
        .map(|piece| {
            let mut value = heuristics.value(piece.kind);
            if heuristics.positional {
                value += positional_bonus(piece.kind, piece.side, piece.position);
            }
            match piece.side {
                Side::Red => value,
                Side::Black => -value,
            }
        })
        .sum()
}
