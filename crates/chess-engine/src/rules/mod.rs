//! Rule set abstraction for chess variants.
//!
//! This module provides the [`RuleSet`] trait which abstracts over different
//! chess variants. The engine is rule-agnostic - it delegates game-specific
//! logic to the active rule set.

mod standard;

pub use standard::StandardChess;

use crate::Board;
use chess_core::{Move, MoveList};

/// Why a game was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    /// Side to move has no legal move and is not in check.
    Stalemate,
    /// Neither side has enough material to force checkmate.
    InsufficientMaterial,
    /// Fifty moves (100 plies) without a pawn move or capture; requires a claim.
    FiftyMoveRule,
    /// Seventy-five moves (150 plies) without a pawn move or capture; automatic.
    SeventyFiveMoveRule,
    /// The same position has occurred three times; requires a claim.
    ThreefoldRepetition,
    /// The same position has occurred five times; automatic.
    FivefoldRepetition,
    /// Both players agreed to a draw.
    Agreement,
}

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    /// White wins (checkmate or resignation).
    WhiteWins,
    /// Black wins (checkmate or resignation).
    BlackWins,
    /// Draw, with the reason.
    Draw(DrawReason),
}

/// Trait for implementing chess variants.
///
/// The engine uses this trait to delegate all game-specific logic, making it
/// easy to support different chess variants (standard, Chess960, etc.) without
/// changing the core engine code.
///
/// # Example
///
/// ```
/// use chess_engine::StandardChess;
/// use chess_engine::rules::RuleSet;
///
/// let mut board = StandardChess.initial_position();
/// let moves = StandardChess.generate_moves(&mut board);
/// ```
pub trait RuleSet {
    /// Returns the initial position for this variant.
    fn initial_position(&self) -> Board;

    /// Generates all legal moves for the side to move.
    fn generate_moves(&self, board: &mut Board) -> MoveList;

    /// Returns true if the given move is legal in the position.
    fn is_legal(&self, board: &mut Board, m: Move) -> bool {
        self.generate_moves(board).as_slice().contains(&m)
    }

    /// Returns true if the side to move is in check.
    fn is_check(&self, board: &Board) -> bool;

    /// Returns true if neither side has enough material to force checkmate.
    fn is_insufficient_material(&self, board: &Board) -> bool;

    /// Returns the automatic game result if the game is over, otherwise `None`.
    ///
    /// Covers checkmate, stalemate, insufficient material, the seventy-five
    /// move rule, and fivefold repetition — none of which require a claim.
    fn game_result(&self, board: &mut Board) -> Option<GameResult>;

    /// Returns a claimable draw reason (fifty-move rule, threefold
    /// repetition) if one is available, without checking automatic
    /// conditions covered by [`game_result`](RuleSet::game_result).
    fn claim_draw(&self, board: &Board) -> Option<DrawReason>;

    /// Returns true if the game is over (via [`game_result`](RuleSet::game_result)).
    fn is_game_over(&self, board: &mut Board) -> bool {
        self.game_result(board).is_some()
    }
}

/// Counts how many times the current position (by Zobrist hash) has occurred
/// in the board's move history, including the current occurrence.
pub(crate) fn repetition_count(board: &Board) -> usize {
    let current = board.hash();
    board.hash_history().filter(|&h| h == current).count()
}
