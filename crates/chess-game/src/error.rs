//! Error types for the game controller and state machine.

use thiserror::Error;

/// Errors raised by [`crate::controller::GameController`] and
/// [`crate::state_machine::StateMachine`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("move is not legal in the current position: {0}")]
    IllegalMove(String),

    #[error("no move history to undo")]
    NoHistory,

    #[error("operation requires initialize_game to run first")]
    NotInitialized,
}
