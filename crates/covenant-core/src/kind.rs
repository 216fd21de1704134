//! The label distinguishing where in a function a check was placed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of check that was performed.
///
/// All kinds evaluate identically; the kind only selects the wording of the
/// diagnostic so call sites document their intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckKind {
    /// Checked near function entry.
    Precondition,
    /// Checked mid-body.
    Condition,
    /// Checked near function exit.
    Postcondition,
    /// A guarded value changed between construction and check.
    Invariant,
}

impl CheckKind {
    /// All kinds, in declaration order.
    pub const ALL: [CheckKind; 4] = [
        CheckKind::Precondition,
        CheckKind::Condition,
        CheckKind::Postcondition,
        CheckKind::Invariant,
    ];

    /// The word used at the start of a diagnostic.
    pub fn label(self) -> &'static str {
        match self {
            CheckKind::Precondition => "Precondition",
            CheckKind::Condition => "Condition",
            CheckKind::Postcondition => "Postcondition",
            CheckKind::Invariant => "Invariant",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_label() {
        for kind in CheckKind::ALL {
            assert_eq!(kind.to_string(), kind.label());
        }
    }

    #[test]
    fn serializes_as_variant_name() {
        let json = serde_json::to_string(&CheckKind::Postcondition).unwrap();
        assert_eq!(json, "\"Postcondition\"");
        let back: CheckKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CheckKind::Postcondition);
    }
}
