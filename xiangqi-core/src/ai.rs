//! Move pickers: fixed-depth minimax and uniform random

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

use crate::board::Board;
use crate::eval::{evaluate, Heuristics};
use crate::history::Move;
use crate::pieces::Side;
use crate::position::Position;
use crate::snapshot::DumpedBoard;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Value of a layer whose side has no King-safe move, from Red's view
pub const LOSS_VALUE: i32 = 1_000_000;

/// Default search depth in plies
pub const DEFAULT_DEPTH: u32 = 2;

// ============================================================================
// TYPES
// ============================================================================

/// A move picked by an AI, as origin and destination squares
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveChoice {
    pub from: Position,
    pub to: Position,
}

impl fmt::Display for MoveChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

impl From<Move> for MoveChoice {
    fn from(mv: Move) -> Self {
        Self { from: mv.from, to: mv.to }
    }
}

/// Search parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Plies to look ahead. `search` treats 0 as 1: the root is always
    /// expanded.
    pub depth: u32,
    /// Wall-clock budget; nodes past the deadline evaluate statically
    pub timeout: Option<Duration>,
    pub heuristics: Heuristics,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            timeout: None,
            heuristics: Heuristics::default(),
        }
    }
}

impl SearchOptions {
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_heuristics(mut self, heuristics: Heuristics) -> Self {
        self.heuristics = heuristics;
        self
    }
}

/// Outcome of one search
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    /// `None` when the side to move has no King-safe move (resignation)
    pub choice: Option<MoveChoice>,
    /// Minimax value of the choice, positive for Red
    pub value: i32,
    /// Nodes visited, root included
    pub nodes: u64,
}

/// Anything a picker can search from. The picker always works on its own
/// board, so the input is never mutated.
pub trait SearchInput {
    /// A private board to search on; `None` if the input is not a valid position
    fn to_search_board(&self) -> Option<Board>;
}

impl SearchInput for Board {
    fn to_search_board(&self) -> Option<Board> {
        Some(self.clone())
    }
}

impl SearchInput for DumpedBoard {
    fn to_search_board(&self) -> Option<Board> {
        match Board::load(self) {
            Ok(board) => Some(board),
            Err(err) => {
                tracing::warn!("Cannot search invalid snapshot: {}", err);
                None
            }
        }
    }
}

// ============================================================================
// MINIMAX
// ============================================================================

struct Searcher<'a> {
    heuristics: &'a Heuristics,
    deadline: Option<Instant>,
    nodes: u64,
}

impl Searcher<'_> {
    fn expired(&self) -> bool {
        self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }

    /// Red layer: maximize
    fn max_search(&mut self, board: &mut Board, depth: u32) -> i32 {
        self.layer(board, depth, Side::Red, false).0
    }

    /// Black layer: minimize
    fn min_search(&mut self, board: &mut Board, depth: u32) -> i32 {
        self.layer(board, depth, Side::Black, false).0
    }

    fn child(&mut self, board: &mut Board, depth: u32, side: Side) -> i32 {
        match side {
            Side::Red => self.max_search(board, depth),
            Side::Black => self.min_search(board, depth),
        }
    }

    /// Expand every legal move of `side`, keeping the first strictly best
    fn layer(&mut self, board: &mut Board, depth: u32, side: Side, root: bool) -> (i32, Option<MoveChoice>) {
        self.nodes += 1;
        if !root && (depth == 0 || board.is_end() || self.expired()) {
            return (evaluate(board, self.heuristics), None);
        }

        let mut best: Option<(i32, MoveChoice)> = None;
        for mv in board.legal_moves(side) {
            if board.move_from(mv.from, mv.to).is_err() {
                continue;
            }

            // A move that ends the game is never refused for King safety
            let value = if !board.is_end() && board.is_king_threatened(side) {
                None
            } else {
                Some(self.child(board, depth.saturating_sub(1), side.opponent()))
            };

            if let Err(err) = board.undo() {
                tracing::error!("Search lost track of the board: {}", err);
                break;
            }

            let value = match value {
                Some(v) => v,
                None => continue,
            };
            if root {
                tracing::trace!("{} {} -> {}: {}", mv.kind.rule().fen, mv.from, mv.to, value);
            }

            let better = match best {
                None => true,
                Some((current, _)) => match side {
                    Side::Red => value > current,
                    Side::Black => value < current,
                },
            };
            if better {
                best = Some((value, MoveChoice::from(mv)));
            }
        }

        match best {
            Some((value, choice)) => (value, Some(choice)),
            None if root => (evaluate(board, self.heuristics), None),
            None => (-LOSS_VALUE * side.sign(), None),
        }
    }
}

/// Run a minimax search for the side to move
pub fn search<I: SearchInput + ?Sized>(input: &I, options: &SearchOptions) -> SearchReport {
    let mut board = match input.to_search_board() {
        Some(board) => board,
        None => {
            return SearchReport {
                choice: None,
                value: 0,
                nodes: 0,
            }
        }
    };

    let start = Instant::now();
    let mut searcher = Searcher {
        heuristics: &options.heuristics,
        deadline: options.timeout.map(|timeout| start + timeout),
        nodes: 0,
    };
    let side = board.turn();
    let depth = options.depth.max(1);
    let (value, choice) = searcher.layer(&mut board, depth, side, true);

    tracing::debug!(
        "{} searched depth {} in {:?}: {} nodes, value {}, choice {:?}",
        side,
        depth,
        start.elapsed(),
        searcher.nodes,
        value,
        choice
    );

    SearchReport {
        choice,
        value,
        nodes: searcher.nodes,
    }
}

/// Best move for the side to move, or `None` to resign
pub fn minimax_move<I: SearchInput + ?Sized>(input: &I, options: &SearchOptions) -> Option<MoveChoice> {
    search(input, options).choice
}

// ============================================================================
// RANDOM
// ============================================================================

/// Uniform over the side to move's pieces that can move, then uniform over
/// that piece's destinations. `None` only when no such piece exists; a board
/// whose game has ended still yields a candidate.
pub fn random_move<I, R>(input: &I, rng: &mut R) -> Option<MoveChoice>
where
    I: SearchInput + ?Sized,
    R: Rng + ?Sized,
{
    let board = input.to_search_board()?;
    let movable: Vec<_> = board
        .side_pieces(board.turn())
        .map(|piece| (piece.position, board.legal_destinations(piece.id)))
        .filter(|(_, destinations)| !destinations.is_empty())
        .collect();

    let (from, destinations) = movable.choose(rng)?;
    let to = destinations.choose(rng)?;
    Some(MoveChoice { from: *from, to: *to })
}

// ============================================================================
// AGENTS
// ============================================================================

/// Something that picks moves for a game loop
pub trait Agent {
    fn choose(&mut self, board: &Board) -> Option<MoveChoice>;
}

/// How a played game stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    /// A King was captured
    Won(Side),
    /// The side to move had no move to offer
    Resigned(Side),
    /// Ply limit reached
    Unfinished,
}

/// Final board and move list of a played game
#[derive(Debug)]
pub struct GameRecord {
    pub board: Board,
    pub moves: Vec<Move>,
    pub outcome: GameOutcome,
}

/// Play from `initial` until a King falls, an agent resigns, or `max_plies`
/// moves have been made
pub fn play_game(
    initial: Board,
    red: &mut dyn Agent,
    black: &mut dyn Agent,
    max_plies: usize,
) -> GameRecord {
    play_game_with(initial, red, black, max_plies, |_, _| {})
}

/// `play_game`, calling `on_move` with each recorded move and the board
/// right after it
pub fn play_game_with<F>(
    initial: Board,
    red: &mut dyn Agent,
    black: &mut dyn Agent,
    max_plies: usize,
    mut on_move: F,
) -> GameRecord
where
    F: FnMut(&Move, &Board),
{
    let mut board = initial;
    let mut moves = Vec::new();

    let outcome = loop {
        if let Some(winner) = board.winner() {
            break GameOutcome::Won(winner);
        }
        if moves.len() >= max_plies {
            break GameOutcome::Unfinished;
        }

        let side = board.turn();
        let proposal = match side {
            Side::Red => red.choose(&board),
            Side::Black => black.choose(&board),
        };
        let choice = match proposal {
            Some(choice) => choice,
            None => break GameOutcome::Resigned(side),
        };
        match board.move_from(choice.from, choice.to) {
            Ok(mv) => {
                on_move(&mv, &board);
                moves.push(mv);
            }
            Err(_) => break GameOutcome::Resigned(side),
        }
    };

    tracing::info!("Game over after {} plies: {:?}", moves.len(), outcome);
    GameRecord { board, moves, outcome }
}

/// Minimax player
#[derive(Clone, Debug, Default)]
pub struct MinimaxAI {
    pub options: SearchOptions,
}

impl MinimaxAI {
    pub fn new(options: SearchOptions) -> Self {
        Self { options }
    }

    /// Get best move for current position
    pub fn best_move<I: SearchInput + ?Sized>(&self, input: &I) -> Option<MoveChoice> {
        minimax_move(input, &self.options)
    }

    /// Self-play a complete game
    pub fn play_game(&mut self, initial: Board, max_plies: usize) -> GameRecord {
        let mut opponent = self.clone();
        play_game(initial, self, &mut opponent, max_plies)
    }
}

impl Agent for MinimaxAI {
    fn choose(&mut self, board: &Board) -> Option<MoveChoice> {
        self.best_move(board)
    }
}

/// Uniform random player
pub struct RandomAI {
    rng: ChaCha8Rng,
}

impl RandomAI {
    pub fn new() -> Self {
        Self::with_seed(42)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn best_move<I: SearchInput + ?Sized>(&mut self, input: &I) -> Option<MoveChoice> {
        random_move(input, &mut self.rng)
    }
}

impl Default for RandomAI {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAI {
    fn choose(&mut self, board: &Board) -> Option<MoveChoice> {
        self.best_move(board)
    }
}

// ============================================================================
// TESTS
// ============================================================================
