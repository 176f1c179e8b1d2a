//! Move Rules
//!
//! Pure board transitions for the three variants: applying drops and
//! pop-outs, win detection and tie detection. No I/O.
//!
//! ## Variant summary
//!
//! | Variant   | Win length | Pop-out | Completing a run |
//! |-----------|-----------:|:-------:|------------------|
//! | Standard  | 4          | no      | mover wins       |
//! | PopOut    | 4          | yes     | mover wins       |
//! | Antistack | 3          | no      | mover loses      |

use serde::{Deserialize, Serialize};

use crate::game::board::{Board, Cell, Player, BOTTOM_ROW, COLS, ROWS, TOP_ROW};

// =============================================================================
// VARIANT
// =============================================================================

/// Rule set for a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Classic four-in-a-row with drops only.
    Standard,
    /// Four-in-a-row where a player may also pop out their own bottom token.
    PopOut,
    /// Three-in-a-row loses for the player who completes it.
    Antistack,
}

impl Variant {
    /// All variants, in announcement-code order.
    pub const ALL: [Variant; 3] = [Variant::Standard, Variant::PopOut, Variant::Antistack];

    /// Length of a qualifying run.
    #[inline]
    pub fn win_length(self) -> usize {
        match self {
            Variant::Standard | Variant::PopOut => 4,
            Variant::Antistack => 3,
        }
    }

    /// Whether pop-out moves are legal.
    #[inline]
    pub fn allows_popout(self) -> bool {
        matches!(self, Variant::PopOut)
    }

    /// Whether completing a run is a loss for the mover.
    #[inline]
    pub fn completing_run_loses(self) -> bool {
        matches!(self, Variant::Antistack)
    }

    /// Announcement byte: 'S', 'P' or 'K'.
    pub fn code(self) -> u8 {
        match self {
            Variant::Standard => b'S',
            Variant::PopOut => b'P',
            Variant::Antistack => b'K',
        }
    }

    /// Parse an announcement byte.
    pub fn from_code(code: u8) -> Option<Variant> {
        Variant::ALL.into_iter().find(|v| v.code() == code)
    }

    /// Human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            Variant::Standard => "Standard",
            Variant::PopOut => "Popout",
            Variant::Antistack => "Antistack",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

// =============================================================================
// MOVES
// =============================================================================

/// Kind of move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    /// Place a token in the lowest empty cell of a column.
    Drop,
    /// Remove own bottom token from a column; the column falls by one.
    PopOut,
}

/// A move: kind plus target column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// What to do.
    pub kind: MoveKind,
    /// Target column (0-based).
    pub column: usize,
}

impl Move {
    /// A drop into `column`.
    pub const fn drop(column: usize) -> Self {
        Self { kind: MoveKind::Drop, column }
    }

    /// A pop-out from `column`.
    pub const fn pop_out(column: usize) -> Self {
        Self { kind: MoveKind::PopOut, column }
    }
}

/// Why a move was rejected.
///
/// A rejected move never changes the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// Column is not in `0..COLS`.
    #[error("column {0} is out of range")]
    ColumnOutOfRange(usize),

    /// Column has no empty cell.
    #[error("column {0} is full")]
    ColumnFull(usize),

    /// Bottom cell of the column is not the mover's token.
    #[error("bottom of column {0} does not belong to the mover")]
    NotOwnBottom(usize),

    /// Pop-out attempted in a variant that forbids it.
    #[error("pop-out is not allowed in {0}")]
    PopOutNotAllowed(Variant),
}

/// Drop `player`'s token into `column`.
///
/// Scans from the bottom row upward and fills the first empty cell.
/// Returns the row the token landed in.
pub fn apply_drop(board: &mut Board, column: usize, player: Player) -> Result<usize, MoveError> {
    if column >= COLS {
        return Err(MoveError::ColumnOutOfRange(column));
    }

    let row = (0..ROWS)
        .rev()
        .find(|&row| board.get(row, column).is_empty())
        .ok_or(MoveError::ColumnFull(column))?;

    board.set(row, column, player.token());
    Ok(row)
}

/// Pop `player`'s own bottom token out of `column`.
///
/// Every cell above the bottom takes the value of the cell above it and the
/// top cell becomes empty.
pub fn apply_popout(board: &mut Board, column: usize, player: Player) -> Result<(), MoveError> {
    if column >= COLS {
        return Err(MoveError::ColumnOutOfRange(column));
    }
    if board.get(BOTTOM_ROW, column) != player.token() {
        return Err(MoveError::NotOwnBottom(column));
    }

    for row in (TOP_ROW + 1..=BOTTOM_ROW).rev() {
        let above = board.get(row - 1, column);
        board.set(row, column, above);
    }
    board.set(TOP_ROW, column, Cell::Empty);
    Ok(())
}

/// Apply a move under `variant`'s rules.
pub fn apply_move(
    board: &mut Board,
    mv: Move,
    player: Player,
    variant: Variant,
) -> Result<(), MoveError> {
    match mv.kind {
        MoveKind::Drop => apply_drop(board, mv.column, player).map(|_| ()),
        MoveKind::PopOut if variant.allows_popout() => apply_popout(board, mv.column, player),
        MoveKind::PopOut => Err(MoveError::PopOutNotAllowed(variant)),
    }
}

// =============================================================================
// OUTCOME
// =============================================================================

/// Scan directions as (row step, column step).
const DIRECTIONS: [(isize, isize); 4] = [
    (0, 1),  // horizontal
    (1, 0),  // vertical
    (1, 1),  // diagonal down-right
    (1, -1), // diagonal down-left
];

/// Check whether `player` has a run of `variant.win_length()` tokens.
///
/// Every admissible start cell in every direction is checked once.
pub fn check_win(board: &Board, player: Player, variant: Variant) -> bool {
    let token = player.token();
    let len = variant.win_length() as isize;

    for (dr, dc) in DIRECTIONS {
        for row in 0..ROWS as isize {
            for col in 0..COLS as isize {
                let end_row = row + dr * (len - 1);
                let end_col = col + dc * (len - 1);
                if end_row < 0 || end_row >= ROWS as isize || end_col < 0 || end_col >= COLS as isize {
                    continue;
                }

                let run = (0..len).all(|step| {
                    let r = (row + dr * step) as usize;
                    let c = (col + dc * step) as usize;
                    board.get(r, c) == token
                });
                if run {
                    return true;
                }
            }
        }
    }

    false
}

/// Check for a tie.
///
/// True iff the top row has no empty cell. This only inspects the top row:
/// after pop-outs a board can be exhausted for practical purposes while the
/// top row still has gaps, and that is not reported as a tie.
pub fn check_tie(board: &Board) -> bool {
    (0..COLS).all(|col| !board.get(TOP_ROW, col).is_empty())
}

/// Game outcome after a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Game continues.
    Ongoing,
    /// Game won by the given player.
    Win(Player),
    /// Game drawn.
    Tie,
}

impl Outcome {
    /// Check if the game is over.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }
}

/// Evaluate the board after `mover` has moved.
///
/// Win is checked before tie. Under Antistack the mover who completes a run
/// loses, so the win is credited to the opponent.
pub fn evaluate_move(board: &Board, mover: Player, variant: Variant) -> Outcome {
    if check_win(board, mover, variant) {
        if variant.completing_run_loses() {
            Outcome::Win(mover.opponent())
        } else {
            Outcome::Win(mover)
        }
    } else if check_tie(board) {
        Outcome::Tie
    } else {
        Outcome::Ongoing
    }
}
