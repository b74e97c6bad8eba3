//! Structural fingerprints for change detection.
//!
//! A fingerprint only answers "did anything change between these two
//! snapshots". It is a truncated digest, so it is deliberately not `Hash`
//! and must never be used as a map key or persisted as an identity.

use std::fmt;

use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

const FIELD_SEPARATOR: u8 = 0x1f;
const RECORD_SEPARATOR: u8 = 0x1e;

/// Deterministic summary of a set of `(name, value)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Fingerprint a set of entries. Input order does not matter, and
    /// numerically equal values (`1.0` and `1.00`) hash the same.
    pub fn of_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Decimal)>,
    {
        let mut entries: Vec<(&str, Decimal)> = entries.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut hasher = Sha256::new();
        for (name, value) in entries {
            hasher.update(name.as_bytes());
            hasher.update([FIELD_SEPARATOR]);
            hasher.update(value.normalize().to_string().as_bytes());
            hasher.update([RECORD_SEPARATOR]);
        }
        Self::from_digest(&hasher.finalize())
    }

    /// Combine several fingerprints into one. Order matters.
    pub fn combine(parts: &[Fingerprint]) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.0.to_be_bytes());
        }
        Self::from_digest(&hasher.finalize())
    }

    /// Raw value.
    pub fn value(&self) -> u64 {
        self.0
    }

    fn from_digest(digest: &[u8]) -> Self {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self(u64::from_be_bytes(bytes))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
