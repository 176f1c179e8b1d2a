//! Game Server
//!
//! TCP accept loop. Connections are paired in arrival order: the first peer
//! of a pair is greeted with the variant and role bytes, the second with the
//! variant byte only, and each pair is handed to its own session task.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::game::record::GameRecord;
use crate::game::rules::Variant;
use crate::network::protocol::{write_greeting, Role};
use crate::network::session::{GameSession, SessionConfig, SessionError};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Rule set for every game this server hosts.
    pub variant: Variant,
    /// Per-move timeout. None waits forever.
    pub move_timeout: Option<Duration>,
}

impl ServerConfig {
    /// Listen on all interfaces at `port`.
    pub fn new(port: u16, variant: Variant) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            variant,
            move_timeout: None,
        }
    }

    /// Session configuration derived from this server configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            variant: self.variant,
            move_timeout: self.move_timeout,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(8080, Variant::Standard)
    }
}

/// Game server errors.
#[derive(Debug, thiserror::Error)]
pub enum GameServerError {
    /// Failed to bind to address.
    #[error("Failed to bind {addr}: {source}")]
    BindFailed {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Listener stopped accepting connections.
    #[error("Accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),
}

/// A peer that has been greeted and is waiting for an opponent.
struct WaitingPeer {
    stream: TcpStream,
    addr: SocketAddr,
}

impl WaitingPeer {
    /// Check, without waiting, whether the peer has closed its end.
    ///
    /// Bytes the peer may already have sent are left unread.
    async fn has_left(&self) -> bool {
        let mut buf = [0u8; 1];
        matches!(
            tokio::time::timeout(Duration::ZERO, self.stream.peek(&mut buf)).await,
            Ok(Ok(0)) | Ok(Err(_))
        )
    }
}

/// The game server.
pub struct GameServer {
    /// Server configuration.
    config: ServerConfig,
    /// Bound listener.
    listener: TcpListener,
    /// Shutdown signal.
    shutdown_tx: broadcast::Sender<()>,
    /// Set once shutdown was requested, for a loop that has not subscribed yet.
    stopping: AtomicBool,
}

impl GameServer {
    /// Bind the listening socket.
    pub async fn bind(config: ServerConfig) -> Result<Self, GameServerError> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|source| GameServerError::BindFailed {
                addr: config.bind_addr,
                source,
            })?;
        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Self {
            config,
            listener,
            shutdown_tx,
            stopping: AtomicBool::new(false),
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run the accept loop until shutdown.
    ///
    /// Sessions still running at shutdown are aborted.
    #[instrument(skip(self), fields(variant = %self.config.variant))]
    pub async fn run(&self) -> Result<(), GameServerError> {
        match self.local_addr() {
            Ok(addr) => info!("Game server listening on {}", addr),
            Err(_) => info!("Game server listening on {}", self.config.bind_addr),
        }

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        if self.stopping.load(Ordering::SeqCst) {
            info!("Shutdown requested before start");
            return Ok(());
        }
        let mut sessions: JoinSet<Result<GameRecord, SessionError>> = JoinSet::new();
        let mut waiting: Option<WaitingPeer> = None;

        let result = loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, addr) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => break Err(GameServerError::AcceptFailed(e)),
                    };
                    info!("New connection from {}", addr);

                    let mut first = waiting.take();
                    if let Some(peer) = &first {
                        if peer.has_left().await {
                            info!("{} left before an opponent arrived", peer.addr);
                            first = None;
                        }
                    }
                    waiting = match first {
                        None => self.greet_first(stream, addr).await,
                        Some(first) => {
                            self.start_session(&mut sessions, first, WaitingPeer { stream, addr }).await;
                            None
                        }
                    };
                }
                Some(joined) = sessions.join_next(), if !sessions.is_empty() => {
                    Self::reap(joined);
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break Ok(());
                }
            }
        };

        if !sessions.is_empty() {
            info!("Aborting {} running sessions", sessions.len());
        }
        sessions.shutdown().await;

        result
    }

    /// Signal the accept loop to stop.
    pub fn shutdown(&self) {
        self.stopping.store(true, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(());
    }

    async fn greet_first(&self, mut stream: TcpStream, addr: SocketAddr) -> Option<WaitingPeer> {
        match write_greeting(&mut stream, self.config.variant, Role::First).await {
            Ok(()) => {
                debug!("{} waiting for an opponent", addr);
                Some(WaitingPeer { stream, addr })
            }
            Err(e) => {
                warn!("Dropping {}: {}", addr, e);
                None
            }
        }
    }

    async fn start_session(
        &self,
        sessions: &mut JoinSet<Result<GameRecord, SessionError>>,
        first: WaitingPeer,
        mut second: WaitingPeer,
    ) {
        if let Err(e) = write_greeting(&mut second.stream, self.config.variant, Role::Second).await {
            warn!("Dropping pair {} / {}: {}", first.addr, second.addr, e);
            return;
        }

        let id = Uuid::new_v4();
        info!(session = %id, "Paired {} (player one) with {} (player two)", first.addr, second.addr);

        let session = GameSession::new(id, self.config.session_config(), first.stream, second.stream);
        sessions.spawn(session.run());
    }

    fn reap(joined: Result<Result<GameRecord, SessionError>, tokio::task::JoinError>) {
        match joined {
            Ok(Ok(record)) => {
                debug!(session = %record.session_id, "Session finished");
            }
            Ok(Err(e)) => {
                debug!("Session failed: {}", e);
            }
            Err(e) if e.is_cancelled() => {
                debug!("Session task cancelled");
            }
            Err(e) => {
                error!("Session task panicked: {}", e);
            }
        }
    }
}
