//! Move generation per piece kind and the cross-cutting legality filters
//!
//! Each generator is a pure function of (side, origin, occupancy) and never
//! emits a destination held by a friendly piece. Callers compose the raw
//! output as `filter_facing(filter_bounds(raw))`; see [`legal_destinations`].

use crate::pieces::{get_rule, Piece, Side};
use crate::position::{Direction, Position};

/// Move generator signature shared by all piece kinds
pub type Generator = fn(Side, Position, &dyn Occupancy) -> Vec<Position>;

/// Read-only view of board occupancy used by the generators
pub trait Occupancy {
    /// Side of the piece standing on `pos`, if any
    fn side_at(&self, pos: Position) -> Option<Side>;

    /// Position of `side`'s King, if it is still on the board
    fn king_position(&self, side: Side) -> Option<Position>;

    fn is_occupied(&self, pos: Position) -> bool {
        self.side_at(pos).is_some()
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Empty or held by the opponent
fn can_land(side: Side, pos: Position, board: &dyn Occupancy) -> bool {
    board.side_at(pos) != Some(side)
}

/// Slide from `origin` in `direction`, emitting empty cells and a capturable
/// first blocker
fn slide(side: Side, origin: Position, direction: Direction, board: &dyn Occupancy, out: &mut Vec<Position>) {
    let mut current = origin;
    loop {
        current = current.step(direction, 1);
        if !current.is_valid() {
            break;
        }
        match board.side_at(current) {
            None => out.push(current),
            Some(owner) => {
                if owner != side {
                    out.push(current);
                }
                break; // Blocked
            }
        }
    }
}

// ============================================================================
// GENERATORS
// ============================================================================

pub fn king_moves(side: Side, origin: Position, board: &dyn Occupancy) -> Vec<Position> {
    Direction::ORTHOGONAL
        .iter()
        .map(|&dir| origin.step(dir, 1))
        .filter(|dest| dest.in_palace(side) && can_land(side, *dest, board))
        .collect()
}

pub fn advisor_moves(side: Side, origin: Position, board: &dyn Occupancy) -> Vec<Position> {
    Direction::DIAGONAL
        .iter()
        .map(|&(v, h)| origin.diagonal(v, h))
        .filter(|dest| dest.in_palace(side) && can_land(side, *dest, board))
        .collect()
}

pub fn bishop_moves(side: Side, origin: Position, board: &dyn Occupancy) -> Vec<Position> {
    let mut result = Vec::with_capacity(4);
    for &(v, h) in &Direction::DIAGONAL {
        let eye = origin.diagonal(v, h);
        if board.is_occupied(eye) {
            continue;
        }
        let dest = eye.diagonal(v, h);
        if dest.on_own_half(side) && can_land(side, dest, board) {
            result.push(dest);
        }
    }
    result
}

pub fn knight_moves(side: Side, origin: Position, board: &dyn Occupancy) -> Vec<Position> {
    let mut result = Vec::with_capacity(8);
    for &dir in &Direction::ORTHOGONAL {
        let leg = origin.step(dir, 1);
        if board.is_occupied(leg) {
            continue; // Hobbled
        }
        for side_step in dir.perpendicular() {
            let dest = origin.step(dir, 2).step(side_step, 1);
            if can_land(side, dest, board) {
                result.push(dest);
            }
        }
    }
    result
}

pub fn rook_moves(side: Side, origin: Position, board: &dyn Occupancy) -> Vec<Position> {
    let mut result = Vec::with_capacity(17);
    for &dir in &Direction::ORTHOGONAL {
        slide(side, origin, dir, board, &mut result);
    }
    result
}

pub fn cannon_moves(side: Side, origin: Position, board: &dyn Occupancy) -> Vec<Position> {
    let mut result = Vec::with_capacity(17);
    for &dir in &Direction::ORTHOGONAL {
        let mut current = origin;
        let mut screened = false;
        loop {
            current = current.step(dir, 1);
            if !current.is_valid() {
                break;
            }
            match (board.side_at(current), screened) {
                (None, false) => result.push(current),
                (None, true) => {}
                (Some(_), false) => screened = true,
                (Some(owner), true) => {
                    if owner != side {
                        result.push(current);
                    }
                    break;
                }
            }
        }
    }
    result
}

pub fn pawn_moves(side: Side, origin: Position, board: &dyn Occupancy) -> Vec<Position> {
    let mut candidates = vec![origin.step(Direction::forward(side), 1)];
    if origin.has_crossed_river(side) {
        candidates.push(origin.step(Direction::Left, 1));
        candidates.push(origin.step(Direction::Right, 1));
    }
    candidates.retain(|dest| can_land(side, *dest, board));
    candidates
}

// ============================================================================
// FILTERS
// ============================================================================

/// Drop every destination that is off the board
pub fn filter_bounds(candidates: Vec<Position>) -> Vec<Position> {
    candidates.into_iter().filter(Position::is_valid).collect()
}

/// Drop every destination after which the two Kings would face each other
/// on an open file.
pub fn filter_facing(mover: &Piece, board: &dyn Occupancy, candidates: Vec<Position>) -> Vec<Position> {
    let opposing_king = board.king_position(mover.side.opponent());
    let own_king = board.king_position(mover.side);
    candidates
        .into_iter()
        .filter(|&dest| !exposes_kings(mover, dest, own_king, opposing_king, board))
        .collect()
}

/// Would moving `mover` to `dest` leave the Kings face to face?
fn exposes_kings(
    mover: &Piece,
    dest: Position,
    own_king: Option<Position>,
    opposing_king: Option<Position>,
    board: &dyn Occupancy,
) -> bool {
    let opposing_king = match opposing_king {
        Some(pos) => pos,
        None => return false,
    };
    if dest == opposing_king {
        return false; // Capturing the King ends the game
    }
    let own_king = if mover.is_king() {
        dest
    } else {
        match own_king {
            Some(pos) => pos,
            None => return false,
        }
    };
    if own_king.x != opposing_king.x {
        return false;
    }

    // Occupancy after the move: origin vacated, destination filled
    let blockers = Position::between_on_file(own_king, opposing_king)
        .filter(|&pos| pos == dest || (pos != mover.position && board.is_occupied(pos)))
        .count();
    blockers == 0
}

/// Fully filtered destinations for `piece` against `board`
pub fn legal_destinations(piece: &Piece, board: &dyn Occupancy) -> Vec<Position> {
    let raw = (get_rule(piece.kind).generate)(piece.side, piece.position, board);
    filter_facing(piece, board, filter_bounds(raw))
}

// ============================================================================
// TESTS
// ============================================================================
