//! Game Session
//!
//! Server side of one paired game. A session exclusively owns both peer
//! streams and the board; nothing is shared with other sessions.
//!
//! ## Turn loop
//!
//! ```text
//!   WaitingForMove(p) ──move──▶ ValidatingMove(p) ──legal──▶ outcome?
//!          ▲                          │                      │
//!          │                      illegal: 'I'          ongoing: swap p
//!          │                          ▼                      │
//!          │                   AwaitingRetry(p) ─────────────┤
//!          └─────────────────────────────────────────────────┘
//!                                                   terminal: W/L or T/T
//! ```

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::game::board::{Board, Player};
use crate::game::record::GameRecord;
use crate::game::rules::{apply_move, evaluate_move, Move, MoveError, Outcome, Variant};
use crate::network::protocol::{
    decode_move, read_move_frame, write_signal, write_turn, MoveDecodeError, ProtocolError,
    Signal, MOVE_FRAME_LEN,
};

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Turn announced; waiting for the active player's move.
    WaitingForMove(Player),
    /// A move frame arrived and is being checked.
    ValidatingMove(Player),
    /// Last move was rejected; waiting for a retry from the same player.
    AwaitingRetry(Player),
    /// Game over.
    Terminal(Outcome),
}

/// Configuration for a game session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Rule set.
    pub variant: Variant,
    /// Maximum time to wait for a move. None waits forever.
    pub move_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Standard,
            move_timeout: None,
        }
    }
}

/// Session errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Reading from or writing to a peer failed.
    #[error("player {player:?} connection failed: {source}")]
    Peer {
        /// Peer whose stream failed.
        player: Player,
        /// Underlying failure.
        #[source]
        source: ProtocolError,
    },

    /// The active player did not send a move in time.
    #[error("player {0:?} did not move within {1:?}")]
    MoveTimeout(Player, Duration),
}

impl SessionError {
    /// Check if the error is a peer closing its connection.
    pub fn is_disconnect(&self) -> bool {
        match self {
            SessionError::Peer { source: ProtocolError::Io(e), .. } => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::ConnectionReset
            ),
            _ => false,
        }
    }
}

/// Why a received move was answered with an invalid-move reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// Frame could not be decoded.
    #[error(transparent)]
    Malformed(#[from] MoveDecodeError),
    /// Move is illegal on the current board.
    #[error(transparent)]
    Illegal(#[from] MoveError),
}

/// A game session between two peers.
pub struct GameSession<S> {
    id: Uuid,
    config: SessionConfig,
    player_one: S,
    player_two: S,
    board: Board,
    active: Player,
    state: SessionState,
    record: GameRecord,
}

impl<S> GameSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Create a session. `player_one` moves first.
    pub fn new(id: Uuid, config: SessionConfig, player_one: S, player_two: S) -> Self {
        let record = GameRecord::new(id, config.variant);
        Self {
            id,
            config,
            player_one,
            player_two,
            board: Board::new(),
            active: Player::One,
            state: SessionState::WaitingForMove(Player::One),
            record,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Player whose turn it is.
    pub fn active_player(&self) -> Player {
        self.active
    }

    fn peer_mut(&mut self, player: Player) -> &mut S {
        match player {
            Player::One => &mut self.player_one,
            Player::Two => &mut self.player_two,
        }
    }

    /// Run the session to completion and close both connections.
    ///
    /// Returns the finished game record, or the error that ended the
    /// session early.
    #[instrument(skip(self), fields(session = %self.id, variant = %self.config.variant))]
    pub async fn run(mut self) -> Result<GameRecord, SessionError> {
        let result = self.play().await;
        self.close().await;

        match result {
            Ok(outcome) => {
                self.record.finish(&self.board, Some(outcome));
                info!("Game over: {:?} after {} moves", outcome, self.record.moves.len());
                match self.record.to_json() {
                    Ok(json) => info!(record = %json, "Game record"),
                    Err(e) => warn!("Failed to serialize game record: {}", e),
                }
                Ok(self.record)
            }
            Err(e) => {
                self.record.finish(&self.board, None);
                warn!("Session ended early: {}", e);
                if let Ok(json) = self.record.to_json() {
                    warn!(record = %json, "Partial game record");
                }
                Err(e)
            }
        }
    }

    /// Alternate turns until the game reaches a terminal outcome.
    async fn play(&mut self) -> Result<Outcome, SessionError> {
        loop {
            let mover = self.active;
            self.state = SessionState::WaitingForMove(mover);
            self.begin_turn().await?;

            let outcome = loop {
                let frame = self.read_move().await?;
                self.state = SessionState::ValidatingMove(mover);

                match self.try_move(frame) {
                    Ok(mv) => {
                        debug!(player = ?mover, ?mv, "Move accepted");
                        self.record.record_move(mover, mv);
                        break evaluate_move(&self.board, mover, self.config.variant);
                    }
                    Err(reason) => {
                        debug!(player = ?mover, %reason, "Move rejected");
                        self.record.record_invalid();
                        self.state = SessionState::AwaitingRetry(mover);
                        self.send_signal(mover, Signal::Invalid).await?;
                    }
                }
            };

            if outcome.is_terminal() {
                self.deliver_outcome(outcome).await?;
                self.state = SessionState::Terminal(outcome);
                return Ok(outcome);
            }

            self.active = mover.opponent();
        }
    }

    /// Announce the turn: active peer first, then the waiting peer.
    async fn begin_turn(&mut self) -> Result<(), SessionError> {
        let board = self.board;
        let active = self.active;
        self.send_turn(active, Signal::YourTurn, &board).await?;
        self.send_turn(active.opponent(), Signal::Hold, &board).await
    }

    async fn read_move(&mut self) -> Result<[u8; MOVE_FRAME_LEN], SessionError> {
        let player = self.active;
        let timeout = self.config.move_timeout;
        let peer = self.peer_mut(player);

        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, read_move_frame(peer))
                .await
                .map_err(|_| SessionError::MoveTimeout(player, limit))?,
            None => read_move_frame(peer).await,
        };

        result.map_err(|source| SessionError::Peer { player, source })
    }

    /// Decode and apply a move frame for the active player.
    ///
    /// The board is only changed when the move is accepted.
    fn try_move(&mut self, frame: [u8; MOVE_FRAME_LEN]) -> Result<Move, Rejection> {
        let mv = decode_move(frame)?;
        apply_move(&mut self.board, mv, self.active, self.config.variant)?;
        Ok(mv)
    }

    /// Send the result to both peers, the mover first.
    async fn deliver_outcome(&mut self, outcome: Outcome) -> Result<(), SessionError> {
        let mover = self.active;
        let (to_mover, to_other) = match outcome {
            Outcome::Win(winner) if winner == mover => (Signal::Win, Signal::Lose),
            Outcome::Win(_) => (Signal::Lose, Signal::Win),
            Outcome::Tie | Outcome::Ongoing => (Signal::Tie, Signal::Tie),
        };

        self.send_signal(mover, to_mover).await?;
        self.send_signal(mover.opponent(), to_other).await
    }

    async fn send_turn(
        &mut self,
        player: Player,
        signal: Signal,
        board: &Board,
    ) -> Result<(), SessionError> {
        write_turn(self.peer_mut(player), signal, board)
            .await
            .map_err(|source| SessionError::Peer { player, source })
    }

    async fn send_signal(&mut self, player: Player, signal: Signal) -> Result<(), SessionError> {
        write_signal(self.peer_mut(player), signal)
            .await
            .map_err(|source| SessionError::Peer { player, source })
    }

    async fn close(&mut self) {
        for player in [Player::One, Player::Two] {
            if let Err(e) = self.peer_mut(player).shutdown().await {
                debug!(?player, "Shutdown failed: {}", e);
            }
        }
    }
}
