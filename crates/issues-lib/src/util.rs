//! ID generation and format checks.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Length of an issue ID in hex characters (12 bytes).
pub const ID_LENGTH: usize = 24;

// ============================================================================
// ID Generation
// ============================================================================

/// Generate a unique issue ID.
///
/// Layout is 4 bytes of big-endian creation seconds followed by 8 bytes of
/// a SHA256 digest over the issue content, creation instant and a nonce,
/// hex encoded. The `exists` closure checks for collisions; the nonce is
/// bumped until it returns false.
pub fn generate_id<F>(
    title: &str,
    text: &str,
    creator: &str,
    created_at: DateTime<Utc>,
    exists: F,
) -> String
where
    F: Fn(&str) -> bool,
{
    let seconds = u32::try_from(created_at.timestamp()).unwrap_or(u32::MAX);

    let mut nonce = 0u64;
    loop {
        let seed = generate_id_seed(title, text, creator, created_at, nonce);
        let id = format!("{seconds:08x}{}", compute_id_hash(&seed));
        if !exists(&id) {
            return id;
        }
        nonce += 1;
    }
}

fn generate_id_seed(
    title: &str,
    text: &str,
    creator: &str,
    created_at: DateTime<Utc>,
    nonce: u64,
) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        title,
        text,
        creator,
        created_at.timestamp_nanos_opt().unwrap_or(0),
        nonce
    )
}

/// First 8 bytes of the SHA256 of `input`, as 16 lowercase hex chars.
fn compute_id_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();

    result
        .iter()
        .take(8)
        .fold(String::with_capacity(16), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}

// ============================================================================
// ID Format
// ============================================================================

/// True if `id` is exactly 24 ASCII hex digits (either case).
#[must_use]
pub fn is_valid_id_format(id: &str) -> bool {
    id.len() == ID_LENGTH && id.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Canonical (lowercase) form of an ID.
#[must_use]
pub fn normalize_id(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}
