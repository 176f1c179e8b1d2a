//! Board State Hashing
//!
//! SHA-256 fingerprints of finished boards, written into game records so a
//! logged result can be checked against its final board.

use sha2::{Digest, Sha256};

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Domain separator for board fingerprints. Bump the suffix if the input
/// layout below ever changes.
const BOARD_DOMAIN: &[u8] = b"CONNECT_FOUR_BOARD_V1";

/// Fingerprint a board.
///
/// `variant` is the variant's wire code, mixed in ahead of the cells so the
/// same layout under two rule sets hashes differently. `cells` is the
/// 42-byte wire snapshot.
pub fn compute_board_hash(variant: u8, cells: &[u8]) -> StateHash {
    let mut hasher = Sha256::new();
    hasher.update(BOARD_DOMAIN);
    hasher.update([variant]);
    hasher.update(cells);
    hasher.finalize().into()
}
