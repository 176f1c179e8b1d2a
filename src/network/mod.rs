//! Network Layer
//!
//! TCP server, per-game sessions and the byte-level wire format.
//! All game rules live in `game/`; this layer only moves bytes and turns.

pub mod protocol;
pub mod server;
pub mod session;

pub use protocol::{ProtocolError, Role, Signal};
pub use server::{GameServer, GameServerError, ServerConfig};
pub use session::{GameSession, SessionConfig, SessionError, SessionState};
