//! Protocol Messages
//!
//! Byte-oriented wire format between server and clients.
//!
//! | Message          | Size | Values                                   |
//! |------------------|------|------------------------------------------|
//! | Variant announce | 1    | 'S' standard, 'P' pop-out, 'K' antistack |
//! | Role announce    | 1    | '2' (first peer only: "you are first")   |
//! | Signal           | 1    | 'Y' 'H' 'I' 'W' 'L' 'T'                  |
//! | Board snapshot   | 42   | '0' empty, '1' player one, '2' player two|
//! | Move request     | 2    | 'A'/'P' then column digit '0'..'6'       |
//!
//! A turn or hold signal is always immediately followed by a snapshot.
//! The framing is fixed: columns are a single ASCII digit.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::game::board::{Board, SnapshotError, CELLS, COLS};
use crate::game::rules::{Move, MoveKind, Variant};

/// Size of a move request frame.
pub const MOVE_FRAME_LEN: usize = 2;

/// Role byte sent to the first peer of a pairing.
pub const ROLE_FIRST: u8 = b'2';

/// Action byte for a drop.
pub const ACTION_DROP: u8 = b'A';

/// Action byte for a pop-out.
pub const ACTION_POPOUT: u8 = b'P';

/// Seat announced to a peer when it is paired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Connected first; moves first and is told to wait for an opponent.
    First,
    /// Connected second; receives only the variant byte.
    Second,
}

// =============================================================================
// SIGNALS
// =============================================================================

/// Single-byte server signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Your turn; a snapshot follows.
    YourTurn,
    /// Wait for the opponent; a snapshot follows.
    Hold,
    /// Last move was rejected; send another.
    Invalid,
    /// You won.
    Win,
    /// You lost.
    Lose,
    /// Draw.
    Tie,
}

impl Signal {
    /// Wire byte.
    pub fn to_byte(self) -> u8 {
        match self {
            Signal::YourTurn => b'Y',
            Signal::Hold => b'H',
            Signal::Invalid => b'I',
            Signal::Win => b'W',
            Signal::Lose => b'L',
            Signal::Tie => b'T',
        }
    }

    /// Parse a wire byte.
    pub fn from_byte(byte: u8) -> Option<Signal> {
        match byte {
            b'Y' => Some(Signal::YourTurn),
            b'H' => Some(Signal::Hold),
            b'I' => Some(Signal::Invalid),
            b'W' => Some(Signal::Win),
            b'L' => Some(Signal::Lose),
            b'T' => Some(Signal::Tie),
            _ => None,
        }
    }

    /// Check if a board snapshot follows this signal.
    #[inline]
    pub fn carries_snapshot(self) -> bool {
        matches!(self, Signal::YourTurn | Signal::Hold)
    }

    /// Check if this signal ends the game.
    #[inline]
    pub fn is_outcome(self) -> bool {
        matches!(self, Signal::Win | Signal::Lose | Signal::Tie)
    }
}

// =============================================================================
// MOVE FRAMES
// =============================================================================

/// Why a move frame could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveDecodeError {
    /// First byte is not a known action.
    #[error("unknown action byte {0:#04x}")]
    UnknownAction(u8),

    /// Second byte is not a column digit.
    #[error("invalid column byte {0:#04x}")]
    InvalidColumn(u8),
}

/// Decode a 2-byte move request.
pub fn decode_move(frame: [u8; MOVE_FRAME_LEN]) -> Result<Move, MoveDecodeError> {
    let kind = match frame[0] {
        ACTION_DROP => MoveKind::Drop,
        ACTION_POPOUT => MoveKind::PopOut,
        other => return Err(MoveDecodeError::UnknownAction(other)),
    };

    let column = match frame[1] {
        digit @ b'0'..=b'9' if ((digit - b'0') as usize) < COLS => (digit - b'0') as usize,
        other => return Err(MoveDecodeError::InvalidColumn(other)),
    };

    Ok(Move { kind, column })
}

/// Encode a move as a 2-byte request.
///
/// The column must be on the board; the frame has room for one digit only.
pub fn encode_move(mv: Move) -> [u8; MOVE_FRAME_LEN] {
    debug_assert!(mv.column < COLS, "column {} does not fit a move frame", mv.column);
    let action = match mv.kind {
        MoveKind::Drop => ACTION_DROP,
        MoveKind::PopOut => ACTION_POPOUT,
    };
    [action, b'0' + mv.column as u8]
}

/// Frame a line of user input as exactly one move request.
///
/// The trailing newline is dropped; short input is padded with `'\n'` and
/// long input truncated, so the server always receives a full frame.
pub fn frame_move_input(line: &str) -> [u8; MOVE_FRAME_LEN] {
    let trimmed = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
    let mut frame = [b'\n'; MOVE_FRAME_LEN];
    for (slot, byte) in frame.iter_mut().zip(trimmed.bytes()) {
        *slot = byte;
    }
    frame
}

// =============================================================================
// ERRORS
// =============================================================================

/// Protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Transport failure (includes the peer closing the stream).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown variant announcement.
    #[error("unsupported game type {0:#04x}")]
    UnknownVariant(u8),

    /// Unknown role byte after the variant announcement.
    #[error("unexpected role byte {0:#04x}")]
    UnknownRole(u8),

    /// Unknown signal byte.
    #[error("unknown signal byte {0:#04x}")]
    UnknownSignal(u8),

    /// Signal that is not valid at this point of the exchange.
    #[error("unexpected signal {0:?}")]
    UnexpectedSignal(Signal),

    /// Malformed board snapshot.
    #[error("bad board snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
}

// =============================================================================
// STREAM HELPERS
// =============================================================================

/// Read one byte.
pub async fn read_byte<R: AsyncRead + Unpin>(reader: &mut R) -> Result<u8, ProtocolError> {
    Ok(reader.read_u8().await?)
}

/// Read one signal.
pub async fn read_signal<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Signal, ProtocolError> {
    let byte = read_byte(reader).await?;
    Signal::from_byte(byte).ok_or(ProtocolError::UnknownSignal(byte))
}

/// Read a 42-byte board snapshot.
pub async fn read_snapshot<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Board, ProtocolError> {
    let mut buf = [0u8; CELLS];
    reader.read_exact(&mut buf).await?;
    Ok(Board::from_snapshot(&buf)?)
}

/// Read a raw 2-byte move frame.
pub async fn read_move_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<[u8; MOVE_FRAME_LEN], ProtocolError> {
    let mut frame = [0u8; MOVE_FRAME_LEN];
    reader.read_exact(&mut frame).await?;
    Ok(frame)
}

/// Write raw bytes and flush.
pub async fn write_bytes<W: AsyncWrite + Unpin>(
    writer: &mut W,
    bytes: &[u8],
) -> Result<(), ProtocolError> {
    writer.write_all(bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Write the pairing greeting: the variant byte, plus the role byte for
/// the first peer.
pub async fn write_greeting<W: AsyncWrite + Unpin>(
    writer: &mut W,
    variant: Variant,
    role: Role,
) -> Result<(), ProtocolError> {
    match role {
        Role::First => write_bytes(writer, &[variant.code(), ROLE_FIRST]).await,
        Role::Second => write_bytes(writer, &[variant.code()]).await,
    }
}

/// Write a lone signal (reply or outcome).
pub async fn write_signal<W: AsyncWrite + Unpin>(
    writer: &mut W,
    signal: Signal,
) -> Result<(), ProtocolError> {
    write_bytes(writer, &[signal.to_byte()]).await
}

/// Write a turn/hold signal and the snapshot that follows it in one frame.
pub async fn write_turn<W: AsyncWrite + Unpin>(
    writer: &mut W,
    signal: Signal,
    board: &Board,
) -> Result<(), ProtocolError> {
    debug_assert!(signal.carries_snapshot());
    let mut frame = [0u8; CELLS + 1];
    frame[0] = signal.to_byte();
    frame[1..].copy_from_slice(&board.to_snapshot());
    write_bytes(writer, &frame).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::Player;
    use crate::game::rules::apply_drop;

    #[test]
    fn test_signal_bytes() {
        let all = [
            Signal::YourTurn,
            Signal::Hold,
            Signal::Invalid,
            Signal::Win,
            Signal::Lose,
            Signal::Tie,
        ];
        for signal in all {
            assert_eq!(Signal::from_byte(signal.to_byte()), Some(signal));
        }
        assert_eq!(Signal::from_byte(b'2'), None);
        assert!(Signal::Hold.carries_snapshot());
        assert!(!Signal::Invalid.carries_snapshot());
        assert!(Signal::Tie.is_outcome());
    }

    #[test]
    fn test_decode_move() {
        assert_eq!(decode_move(*b"A3"), Ok(Move::drop(3)));
        assert_eq!(decode_move(*b"P0"), Ok(Move::pop_out(0)));
        assert_eq!(decode_move(*b"A6"), Ok(Move::drop(6)));
        assert_eq!(decode_move(*b"A7"), Err(MoveDecodeError::InvalidColumn(b'7')));
        assert_eq!(decode_move(*b"a3"), Err(MoveDecodeError::UnknownAction(b'a')));
        assert_eq!(decode_move(*b"A\n"), Err(MoveDecodeError::InvalidColumn(b'\n')));
        assert_eq!(decode_move(*b"\n\n"), Err(MoveDecodeError::UnknownAction(b'\n')));
    }

    #[test]
    fn test_encode_move() {
        assert_eq!(&encode_move(Move::drop(4)), b"A4");
        assert_eq!(&encode_move(Move::pop_out(6)), b"P6");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "does not fit a move frame")]
    fn test_encode_move_rejects_wide_column() {
        encode_move(Move::drop(12));
    }

    #[test]
    fn test_frame_move_input() {
        assert_eq!(&frame_move_input("A3\n"), b"A3");
        assert_eq!(&frame_move_input("P12\n"), b"P1");
        assert_eq!(&frame_move_input("A\r\n"), b"A\n");
        assert_eq!(&frame_move_input("\n"), b"\n\n");
    }

    #[tokio::test]
    async fn test_greeting_bytes() {
        let mut first = Vec::new();
        write_greeting(&mut first, Variant::PopOut, Role::First).await.unwrap();
        assert_eq!(first, b"P2");

        let mut second = Vec::new();
        write_greeting(&mut second, Variant::Standard, Role::Second).await.unwrap();
        assert_eq!(second, b"S");
    }

    #[tokio::test]
    async fn test_turn_frame_layout() {
        let mut board = Board::new();
        apply_drop(&mut board, 0, Player::Two).unwrap();

        let mut out = Vec::new();
        write_turn(&mut out, Signal::YourTurn, &board).await.unwrap();

        assert_eq!(out.len(), CELLS + 1);
        assert_eq!(out[0], b'Y');
        assert_eq!(out[1 + 35], b'2');
    }

    #[tokio::test]
    async fn test_read_signal_and_snapshot() {
        let mut bytes = vec![b'H'];
        bytes.extend_from_slice(&[b'1'; CELLS]);
        let mut reader = &bytes[..];

        assert_eq!(read_signal(&mut reader).await.unwrap(), Signal::Hold);
        let board = read_snapshot(&mut reader).await.unwrap();
        assert_eq!(board.token_count(), CELLS);
    }

    #[tokio::test]
    async fn test_read_errors() {
        let mut reader: &[u8] = b"Z";
        assert!(matches!(read_signal(&mut reader).await, Err(ProtocolError::UnknownSignal(b'Z'))));

        let mut short: &[u8] = b"000";
        assert!(matches!(read_snapshot(&mut short).await, Err(ProtocolError::Io(_))));

        let mut bad = [b'0'; CELLS];
        bad[5] = b'9';
        let mut reader = &bad[..];
        assert!(matches!(read_snapshot(&mut reader).await, Err(ProtocolError::Snapshot(_))));
    }
}
