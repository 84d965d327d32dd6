//! Board geometry: file/rank coordinates, directions, palace and river

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pieces::Side;

/// Number of files (x runs 1..=9, left to right)
pub const FILES: i8 = 9;
/// Number of ranks (y runs 1..=10, Black's baseline first)
pub const RANKS: i8 = 10;

/// Last rank on Black's side of the river
const RIVER_BLACK_EDGE: i8 = 5;

/// Files spanned by both palaces
const PALACE_FILES: std::ops::RangeInclusive<i8> = 4..=6;

/// Board coordinate.
///
/// Origin (1, 1) is the top-left corner as seen by Red, so Black starts on
/// ranks 1-4 and Red on ranks 7-10.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i8,
    pub y: i8,
}

impl Position {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Check if this position is on the board
    pub fn is_valid(&self) -> bool {
        (1..=FILES).contains(&self.x) && (1..=RANKS).contains(&self.y)
    }

    /// Move `distance` cells in `direction`. The result may be off the board.
    pub fn step(&self, direction: Direction, distance: i8) -> Position {
        let (dx, dy) = direction.vector();
        Position::new(self.x + dx * distance, self.y + dy * distance)
    }

    /// One diagonal step, composed of one step along each of two directions
    pub fn diagonal(&self, first: Direction, second: Direction) -> Position {
        self.step(first, 1).step(second, 1)
    }

    /// Inside the 3x3 palace belonging to `side`
    pub fn in_palace(&self, side: Side) -> bool {
        let ranks = match side {
            Side::Black => 1..=3,
            Side::Red => 8..=10,
        };
        PALACE_FILES.contains(&self.x) && ranks.contains(&self.y)
    }

    /// On `side`'s half of the board (has not crossed the river)
    pub fn on_own_half(&self, side: Side) -> bool {
        match side {
            Side::Black => self.y <= RIVER_BLACK_EDGE,
            Side::Red => self.y > RIVER_BLACK_EDGE,
        }
    }

    pub fn has_crossed_river(&self, side: Side) -> bool {
        !self.on_own_half(side)
    }

    /// Positions strictly between two positions on the same file, top to bottom.
    /// Empty when the positions do not share a file.
    pub fn between_on_file(a: Position, b: Position) -> impl Iterator<Item = Position> {
        let (lo, hi) = if a.y <= b.y { (a.y, b.y) } else { (b.y, a.y) };
        let same_file = a.x == b.x;
        let x = a.x;
        ((lo + 1)..hi).filter(move |_| same_file).map(move |y| Position::new(x, y))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Orthogonal direction. `Up` points toward Black's baseline (y = 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ORTHOGONAL: [Direction; 4] =
        [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    /// The four diagonals as (vertical, horizontal) pairs
    pub const DIAGONAL: [(Direction, Direction); 4] = [
        (Direction::Up, Direction::Left),
        (Direction::Up, Direction::Right),
        (Direction::Down, Direction::Left),
        (Direction::Down, Direction::Right),
    ];

    pub fn vector(self) -> (i8, i8) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    /// The two directions at right angles to this one
    pub fn perpendicular(self) -> [Direction; 2] {
        match self {
            Direction::Up | Direction::Down => [Direction::Left, Direction::Right],
            Direction::Left | Direction::Right => [Direction::Up, Direction::Down],
        }
    }

    /// Direction in which `side`'s pawns advance
    pub fn forward(side: Side) -> Direction {
        match side {
            Side::Red => Direction::Up,
            Side::Black => Direction::Down,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Position::new(1, 1).is_valid());
        assert!(Position::new(9, 10).is_valid());
        assert!(!Position::new(0, 5).is_valid());
        assert!(!Position::new(10, 5).is_valid());
        assert!(!Position::new(5, 11).is_valid());
    }

    #[test]
    fn test_step() {
        let p = Position::new(5, 5);
        assert_eq!(p.step(Direction::Up, 1), Position::new(5, 4));
        assert_eq!(p.step(Direction::Left, 3), Position::new(2, 5));
        assert_eq!(p.diagonal(Direction::Down, Direction::Right), Position::new(6, 6));
        // Stepping is plain arithmetic; validity is checked separately
        assert!(!Position::new(1, 1).step(Direction::Up, 1).is_valid());
    }

    #[test]
    fn test_palace_and_river() {
        assert!(Position::new(5, 10).in_palace(Side::Red));
        assert!(!Position::new(5, 10).in_palace(Side::Black));
        assert!(Position::new(4, 1).in_palace(Side::Black));
        assert!(!Position::new(3, 1).in_palace(Side::Black));

        assert!(Position::new(1, 6).on_own_half(Side::Red));
        assert!(Position::new(1, 5).has_crossed_river(Side::Red));
        assert!(Position::new(1, 5).on_own_half(Side::Black));
        assert!(Position::new(1, 6).has_crossed_river(Side::Black));
    }

    #[test]
    fn test_between_on_file() {
        let between: Vec<_> = Position::between_on_file(Position::new(5, 1), Position::new(5, 4)).collect();
        assert_eq!(between, vec![Position::new(5, 2), Position::new(5, 3)]);
        assert_eq!(Position::between_on_file(Position::new(5, 1), Position::new(4, 4)).count(), 0);
    }
}
