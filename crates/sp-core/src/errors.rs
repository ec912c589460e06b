//! Error types for the pricer.
//!
//! A single `thiserror`-derived enum covers configuration errors (rejected at
//! construction), numerical breakdowns and lookup failures. The `ensure!`,
//! `ensure_post!` and `fail!` macros are the usual way to produce them.

use thiserror::Error;

/// The top-level error type used throughout the pricer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated.
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// Date-related error (e.g. start after end).
    #[error("date error: {0}")]
    Date(String),

    /// Index out of range.
    #[error("index ({index}) out of range [0, {size})")]
    IndexOutOfRange {
        /// The index that was out of range.
        index: usize,
        /// The size of the container.
        size: usize,
    },

    /// Invalid argument or configuration value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested model/product combination is not supported.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A numerical breakdown: negative probabilities, a degenerate lattice,
    /// division by a zero time or volatility.
    ///
    /// Kept apart from [`Error::Runtime`] so that callers can tell a broken
    /// computation from a valid but extreme result.
    #[error("numerical instability: {0}")]
    NumericalInstability(String),

    /// A volatility-surface lookup failed after every fallback tier.
    #[error("interpolation failed: {0}")]
    Interpolation(String),

    /// A configuration document could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A long-running computation passed its deadline.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Shorthand `Result` type used throughout the pricer.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use sp_core::{ensure, errors::Error};
/// fn positive(x: f64) -> sp_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::Precondition(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use sp_core::{ensure_post, errors::Error};
/// fn compute(x: f64) -> sp_core::errors::Result<f64> {
///     let result = x * 2.0;
///     ensure_post!(result > 0.0, "result must be positive, got {result}");
///     Ok(result)
/// }
/// assert!(compute(1.0).is_ok());
/// assert!(compute(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use sp_core::{fail, errors::Error};
/// fn always_err() -> sp_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
