//! The structured diagnostic produced when a check fails.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::call_site::CallSite;
use crate::kind::CheckKind;

/// Suffix written after every diagnostic, on its own indented line.
pub const TERMINATING: &str = "Terminating!";

/// A failed check: what kind, which expression, and where.
///
/// `position` is 1-based and counts expressions in declaration order;
/// `count` is the number of expressions supplied to the failing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractViolation {
    /// What kind of check failed.
    pub kind: CheckKind,
    /// 1-based position of the first false expression.
    pub position: usize,
    /// Total expressions in the call.
    pub count: usize,
    /// Where the check was invoked.
    pub call_site: CallSite,
}

impl ContractViolation {
    /// Full text emitted before the process exits.
    pub fn report_text(&self) -> String {
        format!("{}\n   {}", self, TERMINATING)
    }
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed: expression {} of {}, in {}",
            self.kind, self.position, self.count, self.call_site
        )
    }
}
