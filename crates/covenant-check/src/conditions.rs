//! Boolean batch checks.
//!
//! `preconditions`, `conditions` and `postconditions` behave identically and
//! differ only in the [`CheckKind`] named in the diagnostic. Each takes the
//! already-evaluated results of one call site in declaration order; the first
//! false result is reported with its 1-based position and the batch length.
//!
//! Every expression in a batch is evaluated before the check runs, unlike a
//! chain of `&&`. Guard an expensive expression yourself when an earlier one
//! is expected to fail:
//!
//! ```no_run
//! # use covenant_check::preconditions;
//! # fn expensive(_: &[u8]) -> bool { true }
//! # fn f(data: Option<&[u8]>) {
//! preconditions!(data.is_some(), data.map_or(false, expensive));
//! # }
//! ```

use covenant_core::CheckKind;

use crate::report::report_failure;

/// Returns the 1-based position of the first false result, if any.
pub fn first_failure(results: &[bool]) -> Option<usize> {
    results.iter().position(|ok| !ok).map(|idx| idx + 1)
}

/// Checks results expected to hold on entry to a function.
#[track_caller]
pub fn preconditions(results: &[bool]) {
    check_in(CheckKind::Precondition, results, None);
}

/// Checks results expected to hold in the middle of a function.
#[track_caller]
pub fn conditions(results: &[bool]) {
    check_in(CheckKind::Condition, results, None);
}

/// Checks results expected to hold when a function completes.
///
/// A plain call is skipped by early returns. To check on every exit path,
/// wrap the body with [`preserve`](crate::preserve) or call this from a drop
/// guard.
#[track_caller]
pub fn postconditions(results: &[bool]) {
    check_in(CheckKind::Postcondition, results, None);
}

/// Checks a batch under an explicit kind.
#[track_caller]
pub fn check(kind: CheckKind, results: &[bool]) {
    check_in(kind, results, None);
}

/// Checks a batch and names the enclosing function in any diagnostic.
///
/// Used by the check macros; `function` is a path as produced by
/// [`function_name!`](crate::function_name).
#[doc(hidden)]
#[track_caller]
pub fn check_in(kind: CheckKind, results: &[bool], function: Option<&str>) {
    if let Some(position) = first_failure(results) {
        report_failure(kind, position, results.len(), function);
    }
}
