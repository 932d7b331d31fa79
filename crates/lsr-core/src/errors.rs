//! Error types for lazy-singleton-rs.
//!
//! Every fallible operation in the workspace reports a single
//! `thiserror`-derived enum.  The [`ensure!`](crate::ensure) and
//! [`fail!`](crate::fail) macros cover the common early-return cases.

use thiserror::Error;

/// The top-level error type used throughout lazy-singleton-rs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The resource constructor reported a failure.
    ///
    /// The slot is left empty, so a later caller may retry.
    #[error("failed to construct `{label}`: {reason}")]
    Construction {
        /// Label of the resource that failed to construct.
        label: String,
        /// Human-readable cause reported by the constructor.
        reason: String,
    },

    /// A configuration value was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A strategy name did not match any known strategy.
    #[error("unknown strategy `{0}`")]
    UnknownStrategy(String),

    /// The strategy cannot perform the requested operation.
    #[error("strategy `{strategy}` does not support {operation}")]
    Unsupported {
        /// Name of the strategy.
        strategy: &'static str,
        /// Description of the rejected operation.
        operation: &'static str,
    },

    /// A one-shot initializer panicked and the slot can never be filled.
    #[error("strategy `{strategy}` is poisoned by a panicking initializer")]
    Poisoned {
        /// Name of the strategy.
        strategy: &'static str,
    },

    /// General runtime error.
    #[error("{0}")]
    Runtime(String),
}

impl Error {
    /// Build a [`Error::Construction`] from a label and any displayable cause.
    pub fn construction(label: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Construction {
            label: label.into(),
            reason: reason.to_string(),
        }
    }

    /// Return `true` if retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Construction { .. })
    }
}

/// Shorthand `Result` type used throughout lazy-singleton-rs.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Return `Err(Error::InvalidConfig(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use lsr_core::{ensure, errors::Result};
/// fn non_empty(label: &str) -> Result<&str> {
///     ensure!(!label.is_empty(), "label must not be empty");
///     Ok(label)
/// }
/// assert!(non_empty("primary").is_ok());
/// assert!(non_empty("").is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidConfig(
                format!($($msg)*)
            ));
        }
    };
}

/// Return `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use lsr_core::{fail, errors::Result};
/// fn always_err() -> Result<()> {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_error_message() {
        let err = Error::construction("primary", "connection refused");
        assert_eq!(
            err.to_string(),
            "failed to construct `primary`: connection refused"
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn config_errors_are_not_retryable() {
        assert!(!Error::InvalidConfig("x".into()).is_retryable());
        assert!(!Error::UnknownStrategy("x".into()).is_retryable());
        assert!(!Error::Poisoned { strategy: "holder" }.is_retryable());
    }
}
