//! Game Client
//!
//! Client half of the protocol: prints the board and messages, reads moves
//! from the player and forwards them as 2-byte frames.

pub mod render;

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, instrument};

use crate::game::board::Board;
use crate::game::rules::Variant;
use crate::network::protocol::{
    frame_move_input, read_byte, read_signal, read_snapshot, write_bytes,
    ProtocolError, Role, Signal, ROLE_FIRST,
};

/// Client errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Could not reach the server.
    #[error("could not connect to {addr}: {source}")]
    Connect {
        /// Requested address.
        addr: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Server sent something unexpected or the connection failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Reading player input or writing to the terminal failed.
    #[error("terminal I/O error: {0}")]
    Terminal(#[from] std::io::Error),

    /// Player input ended before the game did.
    #[error("input closed before the game finished")]
    InputClosed,
}

/// Final result from this player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerResult {
    /// This player won.
    Win,
    /// This player lost.
    Loss,
    /// Nobody won.
    Tie,
}

/// What the client saw over one game.
#[derive(Debug, Clone)]
pub struct GameSummary {
    /// Announced variant.
    pub variant: Variant,
    /// Seat this client was given.
    pub role: Role,
    /// Final result.
    pub result: PlayerResult,
    /// Last board received, if any.
    pub last_board: Option<Board>,
    /// Move frames sent.
    pub moves_sent: u32,
    /// Invalid-move replies received.
    pub invalid_replies: u32,
}

/// A connected game client.
///
/// `S` is the server stream, `I` the player's input, `O` the terminal.
pub struct GameClient<S, I, O> {
    stream: S,
    input: I,
    output: O,
    last_board: Option<Board>,
    moves_sent: u32,
    invalid_replies: u32,
}

impl<I, O> GameClient<TcpStream, I, O>
where
    I: AsyncBufRead + Unpin,
    O: Write,
{
    /// Connect to a server.
    pub async fn connect(host: &str, port: u16, input: I, output: O) -> Result<Self, ClientError> {
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|source| ClientError::Connect {
                addr: format!("{}:{}", host, port),
                source,
            })?;
        debug!("Connected to {}:{}", host, port);
        Ok(Self::new(stream, input, output))
    }
}

impl<S, I, O> GameClient<S, I, O>
where
    S: AsyncRead + AsyncWrite + Unpin,
    I: AsyncBufRead + Unpin,
    O: Write,
{
    /// Wrap an established stream.
    pub fn new(stream: S, input: I, output: O) -> Self {
        Self {
            stream,
            input,
            output,
            last_board: None,
            moves_sent: 0,
            invalid_replies: 0,
        }
    }

    /// Play one game to the end.
    #[instrument(skip(self))]
    pub async fn play(mut self) -> Result<GameSummary, ClientError> {
        let variant = self.read_variant().await?;
        let role = self.read_role().await?;
        debug!(?variant, ?role, "Joined game");

        let mut pending: Option<Signal> = None;
        loop {
            let signal = match pending.take() {
                Some(signal) => signal,
                None => read_signal(&mut self.stream).await?,
            };

            match signal {
                Signal::YourTurn => {
                    writeln!(self.output, "{}", render::YOUR_TURN)?;
                    self.receive_board().await?;
                    pending = Some(self.take_turn().await?);
                }
                Signal::Hold => {
                    writeln!(self.output, "{}", render::WAIT_TURN)?;
                    self.receive_board().await?;
                }
                Signal::Win | Signal::Lose | Signal::Tie => {
                    let (message, result) = match signal {
                        Signal::Win => (render::WIN, PlayerResult::Win),
                        Signal::Lose => (render::LOSS, PlayerResult::Loss),
                        _ => (render::TIE, PlayerResult::Tie),
                    };
                    writeln!(self.output, "{}", message)?;
                    self.output.flush()?;

                    return Ok(GameSummary {
                        variant,
                        role,
                        result,
                        last_board: self.last_board,
                        moves_sent: self.moves_sent,
                        invalid_replies: self.invalid_replies,
                    });
                }
                Signal::Invalid => {
                    return Err(ProtocolError::UnexpectedSignal(signal).into());
                }
            }
        }
    }

    async fn read_variant(&mut self) -> Result<Variant, ClientError> {
        let code = read_byte(&mut self.stream).await?;
        let variant = Variant::from_code(code).ok_or(ProtocolError::UnknownVariant(code))?;
        writeln!(self.output, "{}", render::variant_line(variant))?;
        Ok(variant)
    }

    /// The first peer gets a role byte; the second peer's next byte is
    /// already the hold signal for the opening board.
    async fn read_role(&mut self) -> Result<Role, ClientError> {
        let byte = read_byte(&mut self.stream).await?;
        if byte == ROLE_FIRST {
            writeln!(self.output, "{}", render::GREETING_FIRST)?;
            self.output.flush()?;
            return Ok(Role::First);
        }

        match Signal::from_byte(byte) {
            Some(Signal::Hold) => {
                writeln!(self.output, "{}", render::GREETING_SECOND)?;
                self.receive_board().await?;
                writeln!(self.output, "{}", render::WAIT_FIRST_TURN)?;
                self.output.flush()?;
                Ok(Role::Second)
            }
            _ => Err(ProtocolError::UnknownRole(byte).into()),
        }
    }

    async fn receive_board(&mut self) -> Result<(), ClientError> {
        let board = read_snapshot(&mut self.stream).await?;
        write!(self.output, "{}", render::render_board(&board))?;
        self.output.flush()?;
        self.last_board = Some(board);
        Ok(())
    }

    /// Prompt until the server accepts a move. Returns the first reply
    /// that is not an invalid-move signal.
    async fn take_turn(&mut self) -> Result<Signal, ClientError> {
        loop {
            write!(self.output, "{}", render::MOVE_PROMPT)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line).await? == 0 {
                return Err(ClientError::InputClosed);
            }

            write_bytes(&mut self.stream, &frame_move_input(&line)).await?;
            self.moves_sent += 1;

            match read_signal(&mut self.stream).await? {
                Signal::Invalid => {
                    self.invalid_replies += 1;
                    writeln!(self.output, "{}", render::INVALID_MOVE)?;
                }
                reply => return Ok(reply),
            }
        }
    }
}
