//! # Connect Four Net
//!
//! Two-player Connect Four over TCP: a server that pairs connections and
//! referees games, and a terminal client.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CONNECT FOUR NET                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Shared primitives                         │
//! │  └── hash.rs     - Board state hashing                       │
//! │                                                              │
//! │  game/           - Rules (pure, synchronous)                 │
//! │  ├── board.rs    - 6x7 grid and snapshot codec               │
//! │  ├── rules.rs    - Variants, moves, win/tie detection        │
//! │  └── record.rs   - Per-game transcript                       │
//! │                                                              │
//! │  network/        - Server side (async)                       │
//! │  ├── protocol.rs - Wire bytes                                │
//! │  ├── session.rs  - Turn loop for one paired game             │
//! │  └── server.rs   - Accept loop and pairing                   │
//! │                                                              │
//! │  client/         - Terminal client                           │
//! │  config.rs       - Command-line arguments                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Variants
//!
//! - **Standard**: four in a row wins.
//! - **PopOut**: standard, plus removing an own token from the bottom row.
//! - **Antistack**: whoever completes three in a row loses.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use client::{ClientError, GameClient, GameSummary, PlayerResult};
pub use game::board::{Board, Cell, Player};
pub use game::rules::{Move, Outcome, Variant};
pub use network::server::{GameServer, GameServerError, ServerConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
