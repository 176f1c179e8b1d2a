//! Terminal rendering for the client.

use crate::game::board::{Board, COLS};
use crate::game::rules::Variant;

/// Rule printed under the board.
pub const BOARD_RULE: &str = "---------------------";

/// Column labels printed under the rule.
pub const COLUMN_FOOTER: &str = " 0  1  2  3  4  5  6";

// =============================================================================
// MESSAGES
// =============================================================================

/// Greeting for the first peer, printed while it waits for an opponent.
pub const GREETING_FIRST: &str =
    "Hi Player One! We're waiting for player two to connect. Game will begin soon!";
/// Greeting for the second peer.
pub const GREETING_SECOND: &str = "Hi Player Two! Player One will go first!";
/// Printed by the second peer under the opening board.
pub const WAIT_FIRST_TURN: &str = "Please Wait For Your Turn";
/// Turn announcement.
pub const YOUR_TURN: &str = "\nIt's your Turn!";
/// Hold announcement.
pub const WAIT_TURN: &str = "\nPlease wait for your turn";
/// Move prompt (no trailing newline).
pub const MOVE_PROMPT: &str = "\nPlease Enter Your Move: ";
/// Invalid-move reply.
pub const INVALID_MOVE: &str = "Invalid move or bad syntax. Please try again";
/// Win message.
pub const WIN: &str = "Congrats! You Win the Game!";
/// Loss message.
pub const LOSS: &str = "Sorry, you lost the game. Better Luck Next Time!";
/// Tie message.
pub const TIE: &str = "It's a Tie! Good job, but next time do better! :)";

/// Line announcing the game type.
pub fn variant_line(variant: Variant) -> String {
    format!("Game Type is {}", variant.display_name())
}

/// Render the board as printed to the player: one row per line, each cell
/// as ` c `, then the rule and column footer. Ends with a newline.
pub fn render_board(board: &Board) -> String {
    let snapshot = board.to_snapshot();
    let mut out = String::with_capacity(snapshot.len() * 3 + 64);

    for row in snapshot.chunks(COLS) {
        for &cell in row {
            out.push(' ');
            out.push(cell as char);
            out.push(' ');
        }
        out.push('\n');
    }
    out.push_str(BOARD_RULE);
    out.push('\n');
    out.push_str(COLUMN_FOOTER);
    out.push('\n');
    out
}
