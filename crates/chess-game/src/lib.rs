//! Event-driven game coordination on top of `chess-engine`.
//!
//! This crate provides:
//! - [`config`] - game mode and difficulty configuration
//! - [`controller`] - [`GameController`], a synchronous façade over board, history, and search
//! - [`state_machine`] - [`StateMachine`], an event-driven coordinator with an observer sink
//! - [`selection`] - difficulty-weighted move selection for the CPU opponent
//! - [`error`] - [`GameError`], the error type shared by the controller and state machine

pub mod config;
pub mod controller;
pub mod error;
pub mod selection;
pub mod state_machine;

pub use config::{CpuDifficulty, GameConfiguration, GameMode};
pub use controller::{CpuSearchHandle, EndGameState, GameController};
pub use error::GameError;
pub use selection::select_weighted;
pub use state_machine::{EventSender, FrontendPhase, GameEvent, GameObserver, GameState, StateMachine};
