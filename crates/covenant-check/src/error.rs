//! Errors from configuring the reporting policy.

use thiserror::Error;

/// Errors produced by covenant-check configuration calls.
#[derive(Debug, Error)]
pub enum CheckError {
    /// [`install`](crate::install) was called after a reporter was already set.
    #[error("a process-wide reporter is already installed")]
    ReporterAlreadyInstalled,
}
