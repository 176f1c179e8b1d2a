//! Core primitives shared across layers.

pub mod hash;

pub use hash::{compute_board_hash, StateHash};
