//! Core data model for runtime contract enforcement.
//!
//! Holds the types shared by every check: the [`CheckKind`] label, the
//! [`CallSite`] captured when a check fails, the [`ContractViolation`]
//! diagnostic, and the [`Fingerprint`] used to detect mutation of a guarded
//! value. Nothing in this crate holds global state or terminates the process;
//! that lives in `covenant-check`.

pub mod call_site;
pub mod canonical;
pub mod error;
pub mod fingerprint;
pub mod kind;
pub mod violation;

// Re-export commonly used types
pub use call_site::CallSite;
pub use canonical::SnapshotError;
pub use error::CoreError;
pub use fingerprint::{snapshot, Fingerprint, Nonce};
pub use kind::CheckKind;
pub use violation::{ContractViolation, TERMINATING};
