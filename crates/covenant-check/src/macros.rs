//! Check macros that also record the enclosing function name.
//!
//! The function forms only know the file and line of their caller. The
//! macros expand in place, so they can name the enclosing function as well.

/// Expands to the path of the enclosing function as a `&'static str`.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __here() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(__here);
        match name.strip_suffix("::__here") {
            Some(enclosing) => enclosing,
            None => name,
        }
    }};
}

/// Checks one or more preconditions. All expressions are evaluated first.
///
/// ```no_run
/// # use covenant_check::preconditions;
/// fn slice(data: &[u8], start: usize, end: usize) -> &[u8] {
///     preconditions!(start <= end, end <= data.len());
///     &data[start..end]
/// }
/// ```
#[macro_export]
macro_rules! preconditions {
    ($($cond:expr),+ $(,)?) => {
        $crate::conditions::check_in(
            $crate::CheckKind::Precondition,
            &[$($cond),+],
            ::std::option::Option::Some($crate::function_name!()),
        )
    };
}

/// Checks one or more mid-body conditions. All expressions are evaluated first.
#[macro_export]
macro_rules! conditions {
    ($($cond:expr),+ $(,)?) => {
        $crate::conditions::check_in(
            $crate::CheckKind::Condition,
            &[$($cond),+],
            ::std::option::Option::Some($crate::function_name!()),
        )
    };
}

/// Checks one or more postconditions. All expressions are evaluated first.
#[macro_export]
macro_rules! postconditions {
    ($($cond:expr),+ $(,)?) => {
        $crate::conditions::check_in(
            $crate::CheckKind::Postcondition,
            &[$($cond),+],
            ::std::option::Option::Some($crate::function_name!()),
        )
    };
}

/// Checks an [`InvariantGuard`](crate::InvariantGuard) against the value it
/// was created over.
#[macro_export]
macro_rules! check_invariant {
    ($guard:expr, $value:expr $(,)?) => {
        $crate::InvariantGuard::check_in(
            &$guard,
            $value,
            ::std::option::Option::Some($crate::function_name!()),
        )
    };
}
