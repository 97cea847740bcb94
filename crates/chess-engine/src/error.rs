//! Error types for board setup and search.

use chess_core::Move;
use thiserror::Error;

/// Errors raised while constructing or validating a [`crate::Board`].
///
/// FEN parsing failures aren't part of this public enum: `from_fen` is
/// crate-internal scaffolding, not a public save/load API, so its error type
/// (`crate::fen::FenError`) stays crate-internal too.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("internal consistency check failed: {0}")]
    InvariantViolation(String),
}

/// Errors raised by the search engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("no legal moves available in the given position")]
    NoLegalMoves,

    #[error("search cancelled before a move was found")]
    CancelledWithNoResult,

    #[error("illegal move supplied to search root: {0}")]
    IllegalRootMove(Move),
}
