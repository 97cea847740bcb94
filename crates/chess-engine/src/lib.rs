//! Bitboard-based chess move generation, evaluation, and search.
//!
//! This crate provides:
//! - [`Board`] - in-place position representation with make/unmake move execution
//! - [`movegen`] - legal move generation over magic-bitboard attack tables
//! - [`eval`] - static position evaluation
//! - [`search`] - alpha-beta search with iterative deepening
//! - [`rules`] - game-ending conditions (checkmate, stalemate, draws)
//! - [`san`] - SAN notation parsing and generation
//!
//! # Architecture
//!
//! Pieces are stored as 12 [`Bitboard`]s (one per piece type/color) plus
//! aggregate occupancy bitboards. Moves are made and unmade in place against
//! a single [`Board`], with an undo stack recording exactly what each move
//! changed, rather than cloning the position per move.
//!
//! # Example
//!
//! ```
//! use chess_engine::{movegen, Board};
//!
//! let mut board = Board::startpos();
//! let moves = movegen::generate_legal_moves(&mut board);
//! println!("Legal moves from starting position: {}", moves.len());
//! ```

mod bitboard;
pub mod board;
pub mod error;
pub mod eval;
mod fen;
pub mod movegen;
pub mod rules;
pub mod san;
pub mod search;
mod zobrist;

pub use bitboard::Bitboard;
pub use board::Board;
pub use error::{BoardError, SearchError};
pub use eval::{evaluate, EvaluationBreakdown};
pub use movegen::{
    bishop_attacks, generate_capture_moves, generate_legal_moves, generate_pseudo_legal_moves,
    is_king_attacked, is_square_attacked, king_attacks, knight_attacks, pawn_attacks,
    queen_attacks, rook_attacks,
};
pub use rules::{DrawReason, GameResult, RuleSet, StandardChess};
pub use san::{move_to_san, san_to_move, SanError};
pub use search::{SearchLimits, SearchResult, Searcher};
