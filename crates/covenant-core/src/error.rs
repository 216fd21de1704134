//! Core error types for covenant-core.
//!
//! These are the failures that stop a diagnostic or a fingerprint from being
//! produced at all. Contract violations themselves are not errors; they are
//! [`ContractViolation`](crate::ContractViolation) values handed to a reporter.

use thiserror::Error;

use crate::canonical::SnapshotError;

/// Errors produced while building diagnostics or fingerprints.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The caller's source location could not be turned into a call site.
    #[error("call site unavailable: no file name in '{file}'")]
    CallSiteUnavailable { file: String },

    /// The guarded value could not be serialized into a snapshot.
    #[error("snapshot failed: {0}")]
    Snapshot(#[from] SnapshotError),
}
