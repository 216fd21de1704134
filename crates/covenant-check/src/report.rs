//! The failure path shared by every check.
//!
//! A failed check builds a [`ContractViolation`] and hands it to the active
//! [`Reporter`]. Resolution order: the thread-local override set by
//! [`with_reporter`], then the process-wide reporter set by [`install`], then
//! [`TerminateProcess`].
//!
//! [`TerminateProcess`] never returns. Other reporters may return, in which
//! case the check returns to its caller as if it had passed; that is only
//! meant for test observers.

use std::cell::RefCell;
use std::process;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing::Level;

use covenant_core::{CallSite, CheckKind, ContractViolation, CoreError, TERMINATING};

use crate::error::CheckError;

/// Exit status used whenever a check terminates the process.
pub const EXIT_CODE: i32 = 1;

/// Receives contract violations and diagnostic failures.
pub trait Reporter: Send + Sync {
    /// Called once per failed check.
    fn report(&self, violation: &ContractViolation);

    /// Called when a failure could not be described (call site or snapshot
    /// unavailable). Must not let the failure pass unnoticed.
    fn escalate(&self, error: &CoreError);
}

static GLOBAL: OnceLock<Box<dyn Reporter>> = OnceLock::new();

thread_local! {
    static SCOPED: RefCell<Option<Arc<dyn Reporter>>> = const { RefCell::new(None) };
}

/// Installs the process-wide reporter. Only the first call succeeds.
pub fn install(reporter: impl Reporter + 'static) -> Result<(), CheckError> {
    GLOBAL
        .set(Box::new(reporter))
        .map_err(|_| CheckError::ReporterAlreadyInstalled)
}

/// Runs `f` with `reporter` active on the current thread.
///
/// The previous override is restored when `f` returns or unwinds. Threads
/// spawned inside `f` do not inherit the override.
pub fn with_reporter<R>(reporter: Arc<dyn Reporter>, f: impl FnOnce() -> R) -> R {
    struct Restore(Option<Arc<dyn Reporter>>);

    impl Drop for Restore {
        fn drop(&mut self) {
            let prev = self.0.take();
            SCOPED.with(|slot| *slot.borrow_mut() = prev);
        }
    }

    let prev = SCOPED.with(|slot| slot.replace(Some(reporter)));
    let _restore = Restore(prev);
    f()
}

fn dispatch(f: impl FnOnce(&dyn Reporter)) {
    // Clone out of the slot so a reporter may itself call with_reporter.
    let scoped = SCOPED.with(|slot| slot.borrow().clone());
    match (scoped, GLOBAL.get()) {
        (Some(reporter), _) => f(reporter.as_ref()),
        (None, Some(reporter)) => f(reporter.as_ref()),
        (None, None) => f(&TerminateProcess),
    }
}

/// Reports a failed expression at `position` of `count`.
///
/// The call site is the caller of the outermost `#[track_caller]` function
/// in the chain leading here. `function` is the enclosing function path when
/// the caller knows it (the check macros supply it).
#[track_caller]
pub fn report_failure(kind: CheckKind, position: usize, count: usize, function: Option<&str>) {
    match CallSite::capture(function) {
        Ok(call_site) => {
            let violation = ContractViolation {
                kind,
                position,
                count,
                call_site,
            };
            dispatch(|reporter| reporter.report(&violation));
        }
        Err(err) => escalate(&err),
    }
}

/// Hands an undescribable failure to the active reporter.
pub(crate) fn escalate(error: &CoreError) {
    dispatch(|reporter| reporter.escalate(error));
}

/// Emits the diagnostic and exits the process with [`EXIT_CODE`].
///
/// When the current tracing subscriber accepts `ERROR` events, the
/// diagnostic is logged as one error event carrying the violation fields,
/// followed by a second event with the termination notice. Otherwise, with no
/// subscriber or one that filters errors out, it is written to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminateProcess;

impl Reporter for TerminateProcess {
    fn report(&self, violation: &ContractViolation) {
        if tracing::enabled!(Level::ERROR) {
            tracing::error!(
                kind = %violation.kind,
                position = violation.position,
                count = violation.count,
                function = %violation.call_site.function,
                file = %violation.call_site.file,
                line = violation.call_site.line,
                "{}",
                violation
            );
            tracing::error!("{}", TERMINATING);
        } else {
            eprintln!("{}", violation.report_text());
        }
        process::exit(EXIT_CODE);
    }

    fn escalate(&self, error: &CoreError) {
        if tracing::enabled!(Level::ERROR) {
            tracing::error!(%error, "contract diagnostics unavailable");
            tracing::error!("{}", TERMINATING);
        } else {
            eprintln!("contract diagnostics unavailable: {}\n   {}", error, TERMINATING);
        }
        process::exit(EXIT_CODE);
    }
}

/// Panics with the diagnostic text instead of exiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicOnViolation;

impl Reporter for PanicOnViolation {
    fn report(&self, violation: &ContractViolation) {
        panic!("{}", violation.report_text());
    }

    fn escalate(&self, error: &CoreError) {
        panic!("contract diagnostics unavailable: {}", error);
    }
}

/// Records violations and escalations without terminating.
///
/// Clones share the same records, so a test can keep one handle and give
/// another to [`with_reporter`].
#[derive(Debug, Clone, Default)]
pub struct CollectViolations {
    violations: Arc<Mutex<Vec<ContractViolation>>>,
    escalations: Arc<Mutex<Vec<String>>>,
}

impl CollectViolations {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Violations recorded so far, oldest first.
    pub fn violations(&self) -> Vec<ContractViolation> {
        self.violations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Escalation messages recorded so far, oldest first.
    pub fn escalations(&self) -> Vec<String> {
        self.escalations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.violations().is_empty() && self.escalations().is_empty()
    }

    /// Drops everything recorded so far. Other clones see the empty state.
    pub fn clear(&self) {
        self.violations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.escalations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Reporter for CollectViolations {
    fn report(&self, violation: &ContractViolation) {
        self.violations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(violation.clone());
    }

    fn escalate(&self, error: &CoreError) {
        self.escalations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error.to_string());
    }
}
