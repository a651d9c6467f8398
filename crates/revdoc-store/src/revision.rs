//! Revision tokens: `<generation>-<digest>`.
//!
//! The in-memory store mints CouchDB-shaped tokens — a monotonically
//! increasing generation, a dash, and a truncated content digest. The
//! mapping layer treats tokens as opaque; only store implementations
//! mint or compare them.

use sha2::{Digest, Sha256};

/// Parse the generation prefix of a token. Unparsable tokens count as
/// generation zero, so the next mint starts over at one.
pub fn generation(rev: &str) -> u64 {
    rev.split_once('-')
        .and_then(|(prefix, _)| prefix.parse().ok())
        .unwrap_or(0)
}

/// Mint the token that follows `prev` for the given payload.
pub fn next(prev: Option<&str>, payload: &[u8]) -> String {
    let generation = prev.map(generation).unwrap_or(0) + 1;
    let digest = Sha256::digest(payload);
    let mut hex = String::with_capacity(16);
    for byte in &digest[..8] {
        hex.push_str(&format!("{byte:02x}"));
    }
    format!("{generation}-{hex}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_token_is_generation_one() {
        let rev = next(None, b"payload");
        assert!(rev.starts_with("1-"));
        assert_eq!(rev.len(), 2 + 16);
    }

    #[test]
    fn successor_increments_generation() {
        let first = next(None, b"a");
        let second = next(Some(&first), b"b");
        assert_eq!(generation(&second), 2);
    }

    #[test]
    fn same_generation_different_payload_differs() {
        assert_ne!(next(None, b"a"), next(None, b"b"));
    }

    #[test]
    fn unparsable_token_restarts_at_one() {
        assert_eq!(generation("garbage"), 0);
        assert!(next(Some("garbage"), b"x").starts_with("1-"));
    }
}
