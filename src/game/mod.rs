//! Game Logic Module
//!
//! Board representation and rules. Pure and synchronous.
//!
//! ## Module Structure
//!
//! - `board`: Grid, cells, wire snapshot codec
//! - `rules`: Variants, move application, win/tie detection
//! - `record`: Per-game transcript for logs

pub mod board;
pub mod record;
pub mod rules;

// Re-export key types
pub use board::{Board, Cell, Player, COLS, ROWS};
pub use record::GameRecord;
pub use rules::{Move, MoveError, MoveKind, Outcome, Variant};
