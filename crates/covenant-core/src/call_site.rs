//! Source location of a failing check.
//!
//! Locations come from `#[track_caller]` propagation rather than a stack walk.
//! Every function between a public check entry point and
//! [`CallSite::capture`] must carry `#[track_caller]`, otherwise the reported
//! line points inside this library instead of at the application code.

use std::fmt;
use std::panic::Location;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Function name reported when the caller did not supply one.
pub const UNKNOWN_FUNCTION: &str = "<unknown>";

/// Where a check was invoked: function, file basename, line and column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallSite {
    /// Shortened function path, or [`UNKNOWN_FUNCTION`].
    pub function: String,
    /// File basename (no directories).
    pub file: String,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl CallSite {
    /// Builds a call site from the location of the caller of this function.
    #[track_caller]
    pub fn capture(function: Option<&str>) -> Result<Self, CoreError> {
        Self::from_location(Location::caller(), function)
    }

    /// Builds a call site from an explicit location.
    ///
    /// Fails with [`CoreError::CallSiteUnavailable`] when the location's path
    /// has no file name component.
    pub fn from_location(location: &Location<'_>, function: Option<&str>) -> Result<Self, CoreError> {
        let file = Path::new(location.file())
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| CoreError::CallSiteUnavailable {
                file: location.file().to_string(),
            })?;

        let function = match function {
            Some(raw) => short_function_name(raw),
            None => UNKNOWN_FUNCTION.to_string(),
        };

        Ok(CallSite {
            function,
            file: file.to_string(),
            line: location.line(),
            column: location.column(),
        })
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "function {} in file {}, line {}",
            self.function, self.file, self.line
        )
    }
}

/// Shortens a fully qualified function path to its last two segments.
///
/// Closure segments (`{{closure}}`) are dropped first so a check inside a
/// closure reports the enclosing function. `my_app::orders::submit` becomes
/// `orders::submit`; a single segment is returned unchanged.
pub fn short_function_name(raw: &str) -> String {
    let segments: Vec<&str> = raw
        .split("::")
        .filter(|segment| !segment.is_empty() && *segment != "{{closure}}")
        .collect();

    match segments.len() {
        0 => UNKNOWN_FUNCTION.to_string(),
        1 => segments[0].to_string(),
        n => segments[n - 2..].join("::"),
    }
}
