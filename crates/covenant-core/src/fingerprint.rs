//! Mutation fingerprints for guarded values using blake3.
//!
//! A fingerprint is a digest over a per-guard [`Nonce`] followed by a
//! canonical snapshot of the value's fields. Two fingerprints computed with
//! the same nonce are equal exactly when the snapshots are equal.
//!
//! # Determinism
//!
//! The snapshot is the [`canonical`](crate::canonical) encoding:
//! - struct fields appear in declaration order
//! - map entries are sorted by encoded key, so `HashMap` fields hash the same
//!   regardless of iteration order, whatever the key type
//! - floats are compared by bit pattern, so a change between NaN and an
//!   infinity is still a change
//!
//! Sequences keep their iteration order. A `HashSet` field is stable while the
//! set is untouched, but a rehash can reorder it without changing its
//! contents, so guarded types should prefer ordered collections.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::canonical;
use crate::error::CoreError;

static NONCE_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Creation-time salt binding a fingerprint to one guard.
///
/// Wall-clock time at nanosecond resolution plus a process-wide sequence
/// number, so nonces taken within the same clock tick still differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nonce {
    secs: u64,
    nanos: u32,
    sequence: u64,
}

impl Nonce {
    /// Takes a nonce for the current instant.
    pub fn now() -> Self {
        // A clock set before 1970 collapses to zero; the sequence still
        // keeps nonces apart.
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Nonce {
            secs: elapsed.as_secs(),
            nanos: elapsed.subsec_nanos(),
            sequence: NONCE_SEQUENCE.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Position of this nonce in the process-wide sequence.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}#{}", self.secs, self.nanos, self.sequence)
    }
}

/// Serializes a value into its canonical snapshot bytes.
pub fn snapshot<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CoreError> {
    Ok(canonical::encode(value)?)
}

/// A blake3 digest over a nonce and a value snapshot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(blake3::Hash);

impl Fingerprint {
    /// Computes the fingerprint of `value` salted with `nonce`.
    pub fn compute<T: Serialize + ?Sized>(nonce: &Nonce, value: &T) -> Result<Self, CoreError> {
        let bytes = snapshot(value)?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(nonce.to_string().as_bytes());
        hasher.update(&bytes);
        Ok(Fingerprint(hasher.finalize()))
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Lowercase hex form of the digest.
    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fingerprint").field(&self.to_hex()).finish()
    }
}
