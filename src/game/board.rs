//! Board Definitions
//!
//! Fixed 6x7 grid stored row-major, row 0 at the top.
//! Index of a cell is `row * COLS + col`.

use serde::{Deserialize, Serialize};

// =============================================================================
// DIMENSIONS
// =============================================================================

/// Number of rows on the board.
pub const ROWS: usize = 6;

/// Number of columns on the board.
pub const COLS: usize = 7;

/// Total number of cells (and bytes in a wire snapshot).
pub const CELLS: usize = ROWS * COLS;

/// Row index of the top row.
pub const TOP_ROW: usize = 0;

/// Row index of the bottom row.
pub const BOTTOM_ROW: usize = ROWS - 1;

// =============================================================================
// PLAYER
// =============================================================================

/// Seat in a game. Player one always moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Player {
    /// First mover.
    One = 1,
    /// Second mover.
    Two = 2,
}

impl Player {
    /// The other seat.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Token this player places on the board.
    #[inline]
    pub fn token(self) -> Cell {
        match self {
            Player::One => Cell::Player1,
            Player::Two => Cell::Player2,
        }
    }

    /// Player number (1 or 2).
    #[inline]
    pub fn number(self) -> u8 {
        self as u8
    }
}

// =============================================================================
// CELL
// =============================================================================

/// Contents of a single board cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Cell {
    /// No token.
    #[default]
    Empty = 0,
    /// Token of player one.
    Player1 = 1,
    /// Token of player two.
    Player2 = 2,
}

impl Cell {
    /// ASCII byte used on the wire ('0', '1' or '2').
    #[inline]
    pub fn to_byte(self) -> u8 {
        b'0' + self as u8
    }

    /// Parse a wire byte.
    pub fn from_byte(byte: u8) -> Option<Cell> {
        match byte {
            b'0' => Some(Cell::Empty),
            b'1' => Some(Cell::Player1),
            b'2' => Some(Cell::Player2),
            _ => None,
        }
    }

    /// Check if the cell holds no token.
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

// =============================================================================
// BOARD
// =============================================================================

/// Error decoding a wire snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// Snapshot is not exactly `CELLS` bytes.
    #[error("snapshot must be 42 bytes, got {0}")]
    WrongLength(usize),

    /// A byte is not one of '0', '1', '2'.
    #[error("invalid cell byte {byte:#04x} at index {index}")]
    InvalidCell {
        /// Offending index.
        index: usize,
        /// Offending byte.
        byte: u8,
    },
}

/// The game board.
///
/// Always exactly `CELLS` cells. Serialized as its 42-character snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Board {
    cells: [Cell; CELLS],
}

impl Board {
    /// Create an empty board.
    pub const fn new() -> Self {
        Self {
            cells: [Cell::Empty; CELLS],
        }
    }

    /// Flat index of `(row, col)`.
    #[inline]
    pub const fn index(row: usize, col: usize) -> usize {
        row * COLS + col
    }

    /// Get the cell at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[Self::index(row, col)]
    }

    /// Set the cell at `(row, col)`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[Self::index(row, col)] = cell;
    }

    /// All cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[Cell; CELLS] {
        &self.cells
    }

    /// Check if a column has no empty cell left.
    pub fn is_column_full(&self, col: usize) -> bool {
        (0..ROWS).all(|row| !self.get(row, col).is_empty())
    }

    /// Count tokens on the board.
    pub fn token_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Encode to the 42-byte wire snapshot.
    pub fn to_snapshot(&self) -> [u8; CELLS] {
        let mut out = [b'0'; CELLS];
        for (byte, cell) in out.iter_mut().zip(self.cells.iter()) {
            *byte = cell.to_byte();
        }
        out
    }

    /// Decode a 42-byte wire snapshot.
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self, SnapshotError> {
        if bytes.len() != CELLS {
            return Err(SnapshotError::WrongLength(bytes.len()));
        }

        let mut board = Board::new();
        for (index, &byte) in bytes.iter().enumerate() {
            board.cells[index] =
                Cell::from_byte(byte).ok_or(SnapshotError::InvalidCell { index, byte })?;
        }
        Ok(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Board> for String {
    fn from(board: Board) -> Self {
        board.to_snapshot().iter().map(|&b| b as char).collect()
    }
}

impl TryFrom<String> for Board {
    type Error = SnapshotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Board::from_snapshot(value.as_bytes())
    }
}
