//! Invariant guards: detect unexpected mutation of a value across a region.
//!
//! [`InvariantGuard::new`] fingerprints a value; [`InvariantGuard::check`]
//! fingerprints it again and reports an `Invariant` violation (expression 1
//! of 1) if anything serializable changed. The guard stores only the nonce and
//! digest, so the caller keeps full ownership of the value and hands it back
//! at check time.
//!
//! A guard has no `Drop` behaviour. To check on every exit path of a region,
//! including early returns, run the region through [`preserve`].
//!
//! Guards take no locks. A value mutated from another thread between
//! construction and check must be synchronized by the caller.

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;

use covenant_core::{CheckKind, CoreError, Fingerprint, Nonce};

use crate::report::{escalate, report_failure};

/// Snapshot of a value's state, taken when the guard was created.
pub struct InvariantGuard<T: ?Sized> {
    nonce: Nonce,
    /// `None` when the initial snapshot failed; already escalated.
    fingerprint: Option<Fingerprint>,
    _guarded: PhantomData<fn(&T)>,
}

impl<T: Serialize + ?Sized> InvariantGuard<T> {
    /// Fingerprints `value`, returning the snapshot error instead of
    /// escalating it.
    pub fn try_new(value: &T) -> Result<Self, CoreError> {
        let nonce = Nonce::now();
        let fingerprint = Fingerprint::compute(&nonce, value)?;
        Ok(InvariantGuard {
            nonce,
            fingerprint: Some(fingerprint),
            _guarded: PhantomData,
        })
    }

    /// Fingerprints `value`.
    ///
    /// A value that cannot be serialized is escalated through the active
    /// reporter; if that reporter returns, every later check escalates again.
    pub fn new(value: &T) -> Self {
        let nonce = Nonce::now();
        let fingerprint = match Fingerprint::compute(&nonce, value) {
            Ok(fingerprint) => Some(fingerprint),
            Err(err) => {
                escalate(&err);
                None
            }
        };
        InvariantGuard {
            nonce,
            fingerprint,
            _guarded: PhantomData,
        }
    }

    /// The nonce this guard salts its fingerprints with.
    pub fn nonce(&self) -> &Nonce {
        &self.nonce
    }

    /// The fingerprint taken at construction.
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        self.fingerprint.as_ref()
    }

    /// Whether `value` still matches the construction-time fingerprint,
    /// without reporting anything.
    pub fn is_intact(&self, value: &T) -> Result<bool, CoreError> {
        let current = Fingerprint::compute(&self.nonce, value)?;
        Ok(self.fingerprint.as_ref() == Some(&current))
    }

    /// Reports an `Invariant` violation if `value` changed since construction.
    #[track_caller]
    pub fn check(&self, value: &T) {
        self.check_in(value, None);
    }

    #[doc(hidden)]
    #[track_caller]
    pub fn check_in(&self, value: &T, function: Option<&str>) {
        let Some(expected) = self.fingerprint.as_ref() else {
            escalate(&self.unavailable(value));
            return;
        };
        match Fingerprint::compute(&self.nonce, value) {
            Ok(current) if current == *expected => {}
            Ok(_) => report_failure(CheckKind::Invariant, 1, 1, function),
            Err(err) => escalate(&err),
        }
    }

    fn unavailable(&self, value: &T) -> CoreError {
        match Fingerprint::compute(&self.nonce, value) {
            Err(err) => err,
            Ok(_) => CoreError::Snapshot(serde::ser::Error::custom(
                "no fingerprint was taken when the guard was created",
            )),
        }
    }
}

impl<T: ?Sized> fmt::Debug for InvariantGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvariantGuard")
            .field("nonce", &self.nonce)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// Runs `body` over `value` and checks afterwards that `value` is unchanged.
///
/// The check runs once `body` returns, whichever path it returned by, so
/// early returns inside the body are covered. A body that panics unwinds
/// past the check.
#[track_caller]
pub fn preserve<T, R>(value: &mut T, body: impl FnOnce(&mut T) -> R) -> R
where
    T: Serialize + ?Sized,
{
    let guard = InvariantGuard::new(&*value);
    let out = body(&mut *value);
    guard.check(value);
    out
}
