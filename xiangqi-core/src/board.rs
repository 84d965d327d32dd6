//! Board: piece set, side to move, move history and event channel

use rustc_hash::FxHashMap;
use std::fmt;

use crate::error::{BoardError, Rejection};
use crate::events::{Event, EventChannel, SubscriptionId};
use crate::history::{History, Move};
use crate::pieces::{Piece, PieceId, PieceKind, Side};
use crate::position::{Position, FILES, RANKS};
use crate::rules::{self, Occupancy};
use crate::snapshot::{DumpedBoard, DumpedPiece};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Upper bound on pieces in any legal position
const MAX_PIECES: usize = 32;

/// Black's opening layout; Red mirrors it at y' = RANKS + 1 - y
const BLACK_LAYOUT: [(PieceKind, i8, i8); 16] = [
    (PieceKind::Pawn, 1, 4),
    (PieceKind::Pawn, 3, 4),
    (PieceKind::Pawn, 5, 4),
    (PieceKind::Pawn, 7, 4),
    (PieceKind::Pawn, 9, 4),
    (PieceKind::Cannon, 2, 3),
    (PieceKind::Cannon, 8, 3),
    (PieceKind::Rook, 1, 1),
    (PieceKind::Rook, 9, 1),
    (PieceKind::Knight, 2, 1),
    (PieceKind::Knight, 8, 1),
    (PieceKind::Bishop, 3, 1),
    (PieceKind::Bishop, 7, 1),
    (PieceKind::Advisor, 4, 1),
    (PieceKind::Advisor, 6, 1),
    (PieceKind::King, 5, 1),
];

/// Standard 32-piece opening, Black first
pub fn standard_layout() -> Vec<(PieceKind, Side, Position)> {
    let black = BLACK_LAYOUT
        .iter()
        .map(|&(kind, x, y)| (kind, Side::Black, Position::new(x, y)));
    let red = BLACK_LAYOUT
        .iter()
        .map(|&(kind, x, y)| (kind, Side::Red, Position::new(x, RANKS + 1 - y)));
    black.chain(red).collect()
}

/// Board lifecycle; `Terminal` once a King has been captured
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Terminal,
}

// ============================================================================
// BOARD
// ============================================================================

/// A Xiangqi board.
///
/// Every mutating operation takes `&mut self`, so at most one logical
/// operation is in flight per board. Searches work on clones.
pub struct Board {
    turn: Side,
    /// Authoritative piece list, in creation order
    pieces: Vec<Piece>,
    /// Position -> occupant index for generator queries
    occupancy: FxHashMap<Position, (PieceId, Side)>,
    history: History,
    next_id: u32,
    events: EventChannel,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Clones start with an empty event channel
impl Clone for Board {
    fn clone(&self) -> Self {
        Self {
            turn: self.turn,
            pieces: self.pieces.clone(),
            occupancy: self.occupancy.clone(),
            history: self.history.clone(),
            next_id: self.next_id,
            events: EventChannel::new(),
        }
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("turn", &self.turn)
            .field("pieces", &self.pieces.len())
            .field("history", &self.history.len())
            .field("head", &self.history.head())
            .field("events", &self.events)
            .finish()
    }
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Standard opening position, Red to move
    pub fn new() -> Self {
        let mut board = Self::empty(Side::Red);
        for (kind, side, pos) in standard_layout() {
            board.spawn(kind, side, pos);
        }
        board
    }

    fn empty(turn: Side) -> Self {
        Self {
            turn,
            pieces: Vec::with_capacity(MAX_PIECES),
            occupancy: FxHashMap::default(),
            history: History::new(),
            next_id: 0,
            events: EventChannel::new(),
        }
    }

    /// Build an arbitrary position with an empty history
    pub fn from_pieces(turn: Side, setup: &[(PieceKind, Side, Position)]) -> Result<Self, BoardError> {
        if setup.len() > MAX_PIECES {
            return Err(BoardError::TooManyPieces(setup.len()));
        }

        let mut board = Self::empty(turn);
        let mut kings = [0usize; 2];
        for &(kind, side, pos) in setup {
            if !pos.is_valid() {
                return Err(BoardError::OutOfBounds(pos));
            }
            if board.occupancy.contains_key(&pos) {
                return Err(BoardError::Overlap(pos));
            }
            if kind == PieceKind::King {
                let count = &mut kings[side as usize];
                *count += 1;
                if *count > 1 {
                    return Err(BoardError::DuplicateKing(side));
                }
            }
            board.spawn(kind, side, pos);
        }
        Ok(board)
    }

    /// Rebuild a board from a snapshot. Turn, history and head are restored
    /// verbatim; pieces get fresh ids.
    ///
    /// Every recorded move must be replayable against the pieces: walking the
    /// log back to the start and forward to its end has to find the named
    /// mover, an empty square to leave or enter, and the recorded victim.
    pub fn load(snapshot: &DumpedBoard) -> Result<Self, BoardError> {
        let setup: Vec<_> = snapshot
            .pieces
            .iter()
            .map(|p| (p.kind, p.side, p.position))
            .collect();
        let mut board = Self::from_pieces(snapshot.turn, &setup)?;
        board.history = History::from_parts(snapshot.history.clone(), snapshot.head)?;
        board.check_history()?;
        Ok(board)
    }

    /// Serializable snapshot of the full board state
    pub fn dump(&self) -> DumpedBoard {
        DumpedBoard {
            turn: self.turn,
            pieces: self
                .pieces
                .iter()
                .map(|p| DumpedPiece {
                    kind: p.kind,
                    side: p.side,
                    position: p.position,
                })
                .collect(),
            history: self.history.moves().to_vec(),
            head: self.history.head(),
        }
    }

    /// Back to the opening layout with Red to move; history is discarded
    pub fn reset(&mut self) {
        self.pieces.clear();
        self.occupancy.clear();
        for (kind, side, pos) in standard_layout() {
            self.spawn(kind, side, pos);
        }
        self.turn = Side::Red;
        self.history.clear();

        if self.events.has_subscribers() {
            let event = Event::Reset(self.dump());
            self.events.emit(&event);
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Side to move
    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn piece_at(&self, pos: Position) -> Option<&Piece> {
        let &(id, _) = self.occupancy.get(&pos)?;
        self.piece(id)
    }

    pub fn side_pieces(&self, side: Side) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.iter().filter(move |p| p.side == side)
    }

    pub fn king(&self, side: Side) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.is_king() && p.side == side)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn head(&self) -> i32 {
        self.history.head()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Terminal once fewer than two Kings remain
    pub fn is_end(&self) -> bool {
        self.pieces.iter().filter(|p| p.is_king()).count() < 2
    }

    pub fn state(&self) -> GameState {
        if self.is_end() {
            GameState::Terminal
        } else {
            GameState::Playing
        }
    }

    /// The side whose King survives, once the game has ended
    pub fn winner(&self) -> Option<Side> {
        if !self.is_end() {
            return None;
        }
        self.pieces.iter().find(|p| p.is_king()).map(|p| p.side)
    }

    // ========================================================================
    // EVENTS
    // ========================================================================

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event) + Send + 'static,
    {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    /// Legal destinations for a piece against the current occupancy
    pub fn legal_destinations(&self, id: PieceId) -> Vec<Position> {
        match self.piece(id) {
            Some(piece) => rules::legal_destinations(piece, self),
            None => Vec::new(),
        }
    }

    /// Every legal move of one piece, with the captured kind filled in
    pub fn next_moves(&self, id: PieceId) -> Vec<Move> {
        let piece = match self.piece(id) {
            Some(p) => p,
            None => return Vec::new(),
        };
        rules::legal_destinations(piece, self)
            .into_iter()
            .map(|to| Move {
                kind: piece.kind,
                side: piece.side,
                from: piece.position,
                to,
                eat: self.piece_at(to).map(|p| p.kind),
            })
            .collect()
    }

    /// Every legal move for `side`, piece by piece in board order
    pub fn legal_moves(&self, side: Side) -> Vec<Move> {
        self.side_pieces(side)
            .flat_map(|piece| self.next_moves(piece.id))
            .collect()
    }

    /// Could any piece of `side`'s opponent move onto `side`'s King?
    pub fn is_king_threatened(&self, side: Side) -> bool {
        let king_pos = match self.king_position(side) {
            Some(pos) => pos,
            None => return false,
        };
        self.side_pieces(side.opponent())
            .any(|piece| rules::legal_destinations(piece, self).contains(&king_pos))
    }

    // ========================================================================
    // APPLY MOVE
    // ========================================================================

    /// Move a piece to `to`, capturing whatever opposing piece stands there.
    ///
    /// Refused (board unchanged) when the game is over, it is not the
    /// piece's turn, or `to` is not a legal destination.
    pub fn move_piece(&mut self, id: PieceId, to: Position) -> Result<Move, Rejection> {
        let piece = match self.piece(id) {
            Some(p) => *p,
            None => return reject(Rejection::UnknownPiece(id)),
        };
        if self.is_end() {
            return reject(Rejection::GameOver);
        }
        if piece.side != self.turn {
            return reject(Rejection::NotYourTurn {
                side: piece.side,
                turn: self.turn,
            });
        }
        if !rules::legal_destinations(&piece, self).contains(&to) {
            return reject(Rejection::IllegalMove {
                from: piece.position,
                to,
            });
        }

        let eaten = self.remove_at(to);
        if let Some(victim) = eaten {
            self.events.emit(&Event::Eat(victim));
        }
        let moved = match self.relocate(id, to, Some(piece.position)) {
            Some(moved) => moved,
            None => return reject(Rejection::UnknownPiece(id)),
        };

        let mv = Move {
            kind: piece.kind,
            side: piece.side,
            from: piece.position,
            to,
            eat: eaten.map(|p| p.kind),
        };
        self.history.record(mv);
        self.events.emit(&Event::Move { piece: moved, eaten });

        // The winner keeps the turn once a King falls
        if !self.is_end() {
            self.switch_turn();
        }
        Ok(mv)
    }

    /// Move whatever piece stands on `from`
    pub fn move_from(&mut self, from: Position, to: Position) -> Result<Move, Rejection> {
        match self.occupancy.get(&from) {
            Some(&(id, _)) => self.move_piece(id, to),
            None => reject(Rejection::NoPieceAt(from)),
        }
    }

    /// Hand the move to the other side
    pub fn switch_turn(&mut self) {
        self.set_turn(self.turn.opponent());
    }

    /// Remove a piece outright (position setup, not a game move)
    pub fn remove_piece(&mut self, id: PieceId) -> Option<Piece> {
        let pos = self.piece(id)?.position;
        self.remove_at(pos)
    }

    // ========================================================================
    // UNDO / REDO
    // ========================================================================

    /// Revert the move at the history cursor
    pub fn undo(&mut self) -> Result<Move, Rejection> {
        self.revert().or_else(reject)
    }

    /// Replay the move after the history cursor
    pub fn redo(&mut self) -> Result<Move, Rejection> {
        self.replay().or_else(reject)
    }

    fn revert(&mut self) -> Result<Move, Rejection> {
        let mv = *self.history.current().ok_or(Rejection::EmptyHistory)?;
        let mover = self.played_mover(&mv)?;

        self.history.step_back();
        // The turn passed to the opponent when the move was made
        self.set_turn(mv.side);
        self.relocate(mover, mv.from, None);
        if let Some(kind) = mv.eat {
            self.spawn(kind, mv.side.opponent(), mv.to);
        }

        self.events.emit(&Event::Undo(mv));
        Ok(mv)
    }

    fn replay(&mut self) -> Result<Move, Rejection> {
        let mv = *self.history.upcoming().ok_or(Rejection::NoRedo)?;
        let mover = self.pending_mover(&mv)?;

        self.history.step_forward();
        if mv.eat.is_some() {
            if let Some(victim) = self.remove_at(mv.to) {
                self.events.emit(&Event::Eat(victim));
            }
        }
        self.relocate(mover, mv.to, Some(mv.from));

        let next = if self.is_end() { mv.side } else { mv.side.opponent() };
        self.set_turn(next);

        self.events.emit(&Event::Redo(mv));
        Ok(mv)
    }

    /// The piece that made `mv`, found on `to` with `from` vacated
    fn played_mover(&self, mv: &Move) -> Result<PieceId, Rejection> {
        let piece = self.piece_at(mv.to).ok_or(Rejection::NoPieceAt(mv.to))?;
        if piece.kind != mv.kind || piece.side != mv.side || self.occupancy.contains_key(&mv.from) {
            return Err(Rejection::HistoryMismatch { from: mv.from, to: mv.to });
        }
        Ok(piece.id)
    }

    /// The piece about to make `mv`, found on `from` with `to` holding
    /// exactly the recorded victim
    fn pending_mover(&self, mv: &Move) -> Result<PieceId, Rejection> {
        let piece = self.piece_at(mv.from).ok_or(Rejection::NoPieceAt(mv.from))?;
        let target = self.piece_at(mv.to).map(|p| (p.kind, p.side));
        let victim = mv.eat.map(|kind| (kind, mv.side.opponent()));
        if piece.kind != mv.kind || piece.side != mv.side || target != victim {
            return Err(Rejection::HistoryMismatch { from: mv.from, to: mv.to });
        }
        Ok(piece.id)
    }

    /// Walk a scratch copy to both ends of the log
    fn check_history(&self) -> Result<(), BoardError> {
        let mut scratch = self.clone();
        for index in (0..=self.history.head()).rev() {
            if scratch.revert().is_err() {
                return Err(BoardError::HistoryMismatch { index: index as usize });
            }
        }
        for index in 0..self.history.len() {
            if scratch.replay().is_err() {
                return Err(BoardError::HistoryMismatch { index });
            }
        }
        Ok(())
    }

    // ========================================================================
    // INTERNAL
    // ========================================================================

    fn spawn(&mut self, kind: PieceKind, side: Side, pos: Position) -> PieceId {
        let id = PieceId(self.next_id);
        self.next_id += 1;
        self.pieces.push(Piece::new(id, kind, side, pos));
        self.occupancy.insert(pos, (id, side));
        id
    }

    fn remove_at(&mut self, pos: Position) -> Option<Piece> {
        let (id, _) = self.occupancy.remove(&pos)?;
        let index = self.pieces.iter().position(|p| p.id == id)?;
        Some(self.pieces.remove(index))
    }

    /// Move a piece's bookkeeping to `to`; the caller has already cleared `to`
    fn relocate(&mut self, id: PieceId, to: Position, prev: Option<Position>) -> Option<Piece> {
        let piece = self.pieces.iter_mut().find(|p| p.id == id)?;
        self.occupancy.remove(&piece.position);
        piece.position = to;
        piece.prev_position = prev;
        self.occupancy.insert(to, (id, piece.side));
        Some(*piece)
    }

    fn set_turn(&mut self, side: Side) {
        if self.turn != side {
            self.turn = side;
            self.events.emit(&Event::Switch(side));
        }
    }
}

fn reject<T>(rejection: Rejection) -> Result<T, Rejection> {
    tracing::warn!("{}", rejection);
    Err(rejection)
}

impl Occupancy for Board {
    fn side_at(&self, pos: Position) -> Option<Side> {
        self.occupancy.get(&pos).map(|&(_, side)| side)
    }

    fn king_position(&self, side: Side) -> Option<Position> {
        self.king(side).map(|p| p.position)
    }
}

/// Grid with FEN letters, Black at the top
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for x in 1..=FILES {
            write!(f, " {}", x)?;
        }
        writeln!(f)?;
        for y in 1..=RANKS {
            write!(f, "{:02}", y)?;
            for x in 1..=FILES {
                let c = self
                    .piece_at(Position::new(x, y))
                    .map(Piece::fen_char)
                    .unwrap_or('.');
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn p(x: i8, y: i8) -> Position {
        Position::new(x, y)
    }

    fn same_state(a: &Board, b: &Board) -> bool {
        let (da, db) = (a.dump(), b.dump());
        da.turn == db.turn
            && da.history == db.history
            && da.head == db.head
            && da.sorted_pieces() == db.sorted_pieces()
    }

    #[test]
    fn test_standard_layout() {
        let board = Board::new();
        assert_eq!(board.pieces().len(), 32);
        assert_eq!(board.turn(), Side::Red);
        assert_eq!(board.head(), -1);
        assert_eq!(board.state(), GameState::Playing);
        assert_eq!(board.winner(), None);
        assert_eq!(board.piece_at(p(5, 10)).map(|k| (k.kind, k.side)), Some((PieceKind::King, Side::Red)));
        assert_eq!(board.piece_at(p(2, 3)).map(|k| (k.kind, k.side)), Some((PieceKind::Cannon, Side::Black)));
        assert_eq!(board.side_pieces(Side::Red).filter(|p| p.kind == PieceKind::Pawn).count(), 5);
    }

    #[test]
    fn test_opening_pawn_has_one_move() {
        let board = Board::new();
        let pawn = board.piece_at(p(1, 7)).unwrap().id;
        assert_eq!(board.legal_destinations(pawn), vec![p(1, 6)]);
    }

    #[test]
    fn test_opening_cannon_moves() {
        let board = Board::new();
        let cannon = board.piece_at(p(2, 8)).unwrap().id;
        let mut moves = board.legal_destinations(cannon);
        moves.sort();
        // Up to the screen at (2,3)'s front, a jump onto the Knight at (2,1),
        // sideways along rank 8, and down onto the empty (2,9)
        assert_eq!(
            moves,
            vec![
                p(1, 8),
                p(2, 1),
                p(2, 4),
                p(2, 5),
                p(2, 6),
                p(2, 7),
                p(2, 9),
                p(3, 8),
                p(4, 8),
                p(5, 8),
                p(6, 8),
                p(7, 8),
            ]
        );
    }

    #[test]
    fn test_move_switches_turn_and_records() {
        let mut board = Board::new();
        let mv = board.move_from(p(2, 8), p(5, 8)).unwrap();
        assert_eq!(mv.kind, PieceKind::Cannon);
        assert_eq!(mv.eat, None);
        assert_eq!(board.turn(), Side::Black);
        assert_eq!(board.head(), 0);
        assert_eq!(board.piece_at(p(5, 8)).unwrap().prev_position, Some(p(2, 8)));
    }

    #[test]
    fn test_illegal_moves_leave_board_unchanged() {
        let mut board = Board::new();
        let before = board.dump();

        assert_eq!(
            board.move_from(p(1, 7), p(1, 5)),
            Err(Rejection::IllegalMove { from: p(1, 7), to: p(1, 5) })
        );
        assert_eq!(
            board.move_from(p(1, 4), p(1, 5)),
            Err(Rejection::NotYourTurn { side: Side::Black, turn: Side::Red })
        );
        assert_eq!(board.move_from(p(5, 5), p(5, 6)), Err(Rejection::NoPieceAt(p(5, 5))));
        assert_eq!(board.move_piece(PieceId(999), p(5, 6)), Err(Rejection::UnknownPiece(PieceId(999))));

        assert_eq!(board.dump(), before);
    }

    #[test]
    fn test_capture_and_undo_respawns() {
        let mut board = Board::new();
        let before = board.clone();

        // Cannon jumps the Black cannon screen onto the Knight
        let mv = board.move_from(p(2, 8), p(2, 1)).unwrap();
        assert_eq!(mv.eat, Some(PieceKind::Knight));
        assert_eq!(board.pieces().len(), 31);

        let cannon_id = board.piece_at(p(2, 1)).unwrap().id;
        board.undo().unwrap();
        assert_eq!(board.dump().sorted_pieces(), before.dump().sorted_pieces());
        assert_eq!(board.head(), -1);
        assert_eq!(board.turn(), Side::Red);
        assert_eq!(board.pieces().len(), 32);
        assert_eq!(board.piece_at(p(2, 8)).unwrap().id, cannon_id);
        assert_eq!(board.piece_at(p(2, 8)).unwrap().prev_position, None);
        let respawned = board.piece_at(p(2, 1)).unwrap();
        assert_eq!((respawned.kind, respawned.side), (PieceKind::Knight, Side::Black));
    }

    #[test]
    fn test_undo_then_redo_restores_post_move_state() {
        let mut board = Board::new();
        board.move_from(p(2, 8), p(2, 1)).unwrap();
        let after = board.clone();

        board.undo().unwrap();
        assert_eq!(board.head(), -1);
        board.redo().unwrap();

        assert!(same_state(&board, &after));
        assert_eq!(board.turn(), Side::Black);
        assert_eq!(board.piece_at(p(2, 1)).unwrap().prev_position, Some(p(2, 8)));
    }

    #[test]
    fn test_undo_redo_on_empty_history() {
        let mut board = Board::new();
        assert_eq!(board.undo(), Err(Rejection::EmptyHistory));
        assert_eq!(board.redo(), Err(Rejection::NoRedo));
        assert_eq!(board.head(), -1);
    }

    #[test]
    fn test_new_move_discards_redo_branch() {
        let mut board = Board::new();
        board.move_from(p(2, 8), p(5, 8)).unwrap();
        board.move_from(p(2, 3), p(5, 3)).unwrap();
        board.undo().unwrap();
        assert!(board.can_redo());

        board.move_from(p(8, 3), p(5, 3)).unwrap();
        assert!(!board.can_redo());
        assert_eq!(board.history().len(), 2);
        assert_eq!(board.history().moves()[1].from, p(8, 3));
        assert_eq!(board.redo(), Err(Rejection::NoRedo));
    }

    #[test]
    fn test_king_capture_ends_game() {
        let mut board = Board::from_pieces(
            Side::Red,
            &[
                (PieceKind::King, Side::Red, p(4, 10)),
                (PieceKind::Rook, Side::Red, p(5, 5)),
                (PieceKind::King, Side::Black, p(5, 1)),
                (PieceKind::Pawn, Side::Black, p(1, 4)),
            ],
        )
        .unwrap();

        let mv = board.move_from(p(5, 5), p(5, 1)).unwrap();
        assert_eq!(mv.eat, Some(PieceKind::King));
        assert_eq!(board.state(), GameState::Terminal);
        assert_eq!(board.winner(), Some(Side::Red));
        // The winner keeps the turn and nothing else may move
        assert_eq!(board.turn(), Side::Red);
        assert_eq!(board.move_from(p(1, 4), p(1, 5)), Err(Rejection::GameOver));
        assert_eq!(board.turn(), Side::Red);

        // Undo hands the turn back to the capturer and restores the King
        board.undo().unwrap();
        assert!(!board.is_end());
        assert_eq!(board.turn(), Side::Red);
        assert_eq!(board.king(Side::Black).unwrap().position, p(5, 1));

        board.redo().unwrap();
        assert!(board.is_end());
        assert_eq!(board.turn(), Side::Red);
    }

    #[test]
    fn test_removed_king_is_terminal() {
        let mut board = Board::new();
        let black_king = board.king(Side::Black).unwrap().id;
        board.remove_piece(black_king);
        assert!(board.is_end());
        assert_eq!(board.move_from(p(1, 7), p(1, 6)), Err(Rejection::GameOver));
        assert_eq!(board.turn(), Side::Red);
    }

    #[test]
    fn test_reset_restores_opening() {
        let mut board = Board::new();
        board.move_from(p(2, 8), p(2, 1)).unwrap();
        board.reset();

        let fresh = Board::new();
        assert!(same_state(&board, &fresh));
        assert!(!board.can_undo());
    }

    #[test]
    fn test_dump_load_roundtrip() {
        let mut board = Board::new();
        board.move_from(p(2, 8), p(5, 8)).unwrap();
        board.move_from(p(8, 3), p(8, 7)).unwrap();
        board.move_from(p(5, 8), p(5, 4)).unwrap();
        board.undo().unwrap();

        let loaded = Board::load(&board.dump()).unwrap();
        assert!(same_state(&board, &loaded));
        assert!(loaded.can_redo());
    }

    #[test]
    fn test_load_rejects_inconsistent_snapshots() {
        let mut snapshot = Board::new().dump();
        snapshot.head = -2;
        assert_eq!(
            Board::load(&snapshot).unwrap_err(),
            BoardError::InvalidHistoryCursor { head: -2, len: 0 }
        );

        let mut overlap = Board::new().dump();
        overlap.pieces[1].position = overlap.pieces[0].position;
        assert!(matches!(Board::load(&overlap), Err(BoardError::Overlap(_))));

        let mut off_board = Board::new().dump();
        off_board.pieces[0].position = p(0, 0);
        assert_eq!(Board::load(&off_board).unwrap_err(), BoardError::OutOfBounds(p(0, 0)));

        let two_kings = [
            (PieceKind::King, Side::Red, p(4, 10)),
            (PieceKind::King, Side::Red, p(6, 10)),
        ];
        assert_eq!(
            Board::from_pieces(Side::Red, &two_kings).unwrap_err(),
            BoardError::DuplicateKing(Side::Red)
        );
    }

    #[test]
    fn test_load_rejects_history_that_does_not_match_pieces() {
        let rook_move = |to: Position, eat: Option<PieceKind>| Move {
            kind: PieceKind::Rook,
            side: Side::Red,
            from: p(1, 10),
            to,
            eat,
        };

        // Claims the Rook already sits on (1,7), where the opening has a Pawn
        let mut played = Board::new().dump();
        played.history = vec![rook_move(p(1, 7), None)];
        played.head = 0;
        played.turn = Side::Black;
        assert_eq!(Board::load(&played).unwrap_err(), BoardError::HistoryMismatch { index: 0 });

        // Redo branch that would take a friendly Pawn
        let mut friendly = Board::new().dump();
        friendly.history = vec![rook_move(p(1, 7), Some(PieceKind::Pawn))];
        assert_eq!(Board::load(&friendly).unwrap_err(), BoardError::HistoryMismatch { index: 0 });

        // Redo branch naming a capture on an empty square
        let mut phantom = Board::new().dump();
        phantom.history = vec![rook_move(p(1, 9), Some(PieceKind::Knight))];
        assert_eq!(Board::load(&phantom).unwrap_err(), BoardError::HistoryMismatch { index: 0 });

        // A consistent redo branch still loads
        let mut quiet = Board::new().dump();
        quiet.history = vec![rook_move(p(1, 9), None)];
        let mut board = Board::load(&quiet).unwrap();
        board.redo().unwrap();
        assert_eq!(board.piece_at(p(1, 9)).map(|r| r.kind), Some(PieceKind::Rook));
    }

    #[test]
    fn test_undo_redo_refuse_records_that_do_not_match() {
        let mut board = Board::new();
        board.move_from(p(2, 8), p(2, 1)).unwrap();
        board.undo().unwrap();

        // The recorded victim is gone from (2,1)
        let knight = board.piece_at(p(2, 1)).unwrap().id;
        board.remove_piece(knight);
        let before = board.dump();
        assert_eq!(
            board.redo(),
            Err(Rejection::HistoryMismatch { from: p(2, 8), to: p(2, 1) })
        );
        assert_eq!(board.dump(), before);

        // The Cannon that made the capture is gone
        let mut board = Board::new();
        board.move_from(p(2, 8), p(2, 1)).unwrap();
        let cannon = board.piece_at(p(2, 1)).unwrap().id;
        board.remove_piece(cannon);
        assert_eq!(board.undo(), Err(Rejection::NoPieceAt(p(2, 1))));

        // Every square still holds at most one piece
        let mut squares: Vec<_> = board.pieces().iter().map(|p| p.position).collect();
        squares.sort();
        squares.dedup();
        assert_eq!(squares.len(), board.pieces().len());
    }

    #[test]
    fn test_events_follow_operations() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut board = Board::new();
        let sink = Arc::clone(&seen);
        let id = board.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        board.move_from(p(2, 8), p(2, 1)).unwrap();
        {
            let events = seen.lock().unwrap();
            assert_eq!(events.len(), 3);
            assert!(matches!(events[0], Event::Eat(piece) if piece.kind == PieceKind::Knight));
            assert!(matches!(events[1], Event::Move { eaten: Some(_), .. }));
            assert_eq!(events[2], Event::Switch(Side::Black));
        }

        board.undo().unwrap();
        assert!(matches!(seen.lock().unwrap().last(), Some(Event::Undo(_))));

        // Clones never notify the original's subscribers
        let mut scratch = board.clone();
        let count = seen.lock().unwrap().len();
        scratch.move_from(p(1, 7), p(1, 6)).unwrap();
        assert_eq!(seen.lock().unwrap().len(), count);

        assert!(board.unsubscribe(id));
        board.reset();
        assert_eq!(seen.lock().unwrap().len(), count);
    }

    #[test]
    fn test_display_grid() {
        let text = Board::new().to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[1], "01 r n b a k a b n r");
        assert_eq!(lines[10], "10 R N B A K A B N R");
    }
}
