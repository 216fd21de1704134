//! Runtime contract checks: preconditions, conditions, postconditions and
//! invariant guards.
//!
//! Every failed check is a programming error. By default the diagnostic is
//! emitted and the process exits with [`EXIT_CODE`]; tests and embedders
//! can substitute another [`Reporter`] through [`install`] or
//! [`with_reporter`].
//!
//! ```no_run
//! use covenant_check::{postconditions, preconditions};
//!
//! fn withdraw(balance: &mut i64, amount: i64) {
//!     preconditions!(amount > 0, amount <= *balance);
//!     *balance -= amount;
//!     postconditions!(*balance >= 0);
//! }
//! ```
//!
//! # Modules
//!
//! - [`conditions`]: boolean batch checks and their first-failure scan
//! - [`invariant`]: fingerprint-based guards over serializable values
//! - [`report`]: the reporting policy and the failure path
//! - [`error`]: CheckError for reporter configuration

#[macro_use]
mod macros;

pub mod conditions;
pub mod error;
pub mod invariant;
pub mod report;

pub use conditions::{check, conditions, first_failure, postconditions, preconditions};
pub use error::CheckError;
pub use invariant::{preserve, InvariantGuard};
pub use report::{
    install, report_failure, with_reporter, CollectViolations, PanicOnViolation, Reporter,
    TerminateProcess, EXIT_CODE,
};

pub use covenant_core::{CallSite, CheckKind, ContractViolation, CoreError};
