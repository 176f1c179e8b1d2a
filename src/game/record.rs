//! Game Record
//!
//! Per-session transcript of a game: every accepted move, rejected attempt
//! count, final board and outcome. Emitted as one JSON log line when the
//! session ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::hash::{compute_board_hash, StateHash};
use crate::game::board::{Board, Player};
use crate::game::rules::{Move, Outcome, Variant};

/// Current record format version.
pub const RECORD_VERSION: u8 = 1;

/// One accepted move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedMove {
    /// 1-based turn number.
    pub turn: u32,
    /// Player who moved.
    pub player: Player,
    /// The move.
    #[serde(rename = "move")]
    pub mv: Move,
}

/// Transcript of a single session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameRecord {
    /// Version for forward compatibility.
    pub version: u8,
    /// Session identifier.
    pub session_id: Uuid,
    /// Rule set.
    pub variant: Variant,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// When the session ended (None while running).
    pub finished_at: Option<DateTime<Utc>>,
    /// Accepted moves in order.
    pub moves: Vec<RecordedMove>,
    /// Number of moves answered with an invalid-move reply.
    pub invalid_attempts: u32,
    /// Final outcome (None while running or if the session failed).
    pub outcome: Option<Outcome>,
    /// Board at the time the record was closed.
    pub final_board: Board,
    /// Hex-encoded hash of `final_board`.
    pub final_board_hash: String,
}

impl GameRecord {
    /// Start a new record.
    pub fn new(session_id: Uuid, variant: Variant) -> Self {
        let board = Board::new();
        Self {
            version: RECORD_VERSION,
            session_id,
            variant,
            started_at: Utc::now(),
            finished_at: None,
            moves: Vec::new(),
            invalid_attempts: 0,
            outcome: None,
            final_board_hash: hex::encode(board_hash(variant, &board)),
            final_board: board,
        }
    }

    /// Record an accepted move.
    pub fn record_move(&mut self, player: Player, mv: Move) {
        let turn = self.moves.len() as u32 + 1;
        self.moves.push(RecordedMove { turn, player, mv });
    }

    /// Record a rejected attempt.
    pub fn record_invalid(&mut self) {
        self.invalid_attempts += 1;
    }

    /// Close the record with the final board and outcome.
    ///
    /// `outcome` is None when the session ended without a result.
    pub fn finish(&mut self, board: &Board, outcome: Option<Outcome>) {
        self.finished_at = Some(Utc::now());
        self.outcome = outcome;
        self.final_board = *board;
        self.final_board_hash = hex::encode(board_hash(self.variant, board));
    }

    /// Check if the record holds a terminal outcome.
    pub fn is_complete(&self) -> bool {
        self.outcome.is_some_and(Outcome::is_terminal)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

fn board_hash(variant: Variant, board: &Board) -> StateHash {
    compute_board_hash(variant.code(), &board.to_snapshot())
}
