//! API key fingerprinting for operational visibility.
//!
//! Lets operators tell which project key a process runs with without the key
//! itself ever reaching the logs.

use sha2::{Digest, Sha256};

/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Truncated SHA-256 fingerprint of an API key as 16 lowercase hex chars.
///
/// # Examples
///
/// ```rust
/// use board::outbound::supabase::key_fingerprint;
///
/// let fp = key_fingerprint("anon-key");
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn key_fingerprint(api_key: &str) -> String {
    let digest = Sha256::digest(api_key.as_bytes());
    hex::encode(digest.get(..FINGERPRINT_BYTES).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn fingerprint_is_deterministic() {
        assert_eq!(key_fingerprint("key"), key_fingerprint("key"));
    }

    #[rstest]
    fn fingerprint_is_short_lowercase_hex() {
        let fp = key_fingerprint("anon-key");
        assert_eq!(fp.len(), FINGERPRINT_BYTES * 2);
        assert_eq!(fp, fp.to_lowercase());
    }

    #[rstest]
    fn different_keys_produce_different_fingerprints() {
        assert_ne!(key_fingerprint("a"), key_fingerprint("b"));
    }

    #[rstest]
    fn fingerprint_does_not_leak_the_key() {
        assert!(!key_fingerprint("abcdef").contains("abcdef"));
    }
}
