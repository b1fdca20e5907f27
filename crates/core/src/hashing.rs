//! Shared SHA-256 hex digest utility.
//!
//! One-time tokens (account activation, password reset) are stored as
//! their digest so a database leak does not expose usable links.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}
