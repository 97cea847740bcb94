//! Core chess primitives: squares, pieces, and moves.
//!
//! This crate has no engine logic — no bitboards, no move generation, no
//! search. It defines the vocabulary the engine crate builds on: [`Square`],
//! [`PieceType`], [`Move`], and [`MoveList`]. FEN parsing lives in
//! `chess-engine` as crate-internal scaffolding, not as a public API here.

mod color;
mod mov;
mod move_list;
mod piece;
mod square;

pub use color::Color;
pub use mov::{Move, MoveFlag};
pub use move_list::MoveList;
pub use piece::{Kind, PieceType};
pub use square::{File, Rank, Square};
