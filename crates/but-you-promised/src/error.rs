//! Error types for wrapped operations.
//!
//! A wrapped call fails in one of three ways: the wrapper was handed
//! something it cannot run ([`ParameterError`]), the configuration cannot
//! drive an attempt loop ([`ConfigError`]), or every permitted attempt failed
//! and the last failure is surfaced ([`RetryError::Exhausted`]).

use std::fmt;
use thiserror::Error;

/// The wrapper was given an operation it cannot call.
///
/// Raised only for a non-callable operation. Never raised when wrapping;
/// always reported when the wrapped operation is invoked, through
/// [`RetryError::Parameter`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    /// The value supplied as the operation is not callable.
    #[error("the operation should be callable, but it was type {received}")]
    NotCallable {
        /// Name of the type that was received instead.
        received: String,
    },
}

/// The configuration cannot drive an attempt loop.
///
/// Reported when the wrapped operation is invoked, through
/// [`RetryError::InvalidConfig`], before any attempt runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// `give_up_after_attempt` was zero, so no attempt could ever run.
    #[error("give_up_after_attempt must be at least 1")]
    ZeroAttemptCeiling,

    /// The starting counter already sits at (or past) the ceiling.
    #[error(
        "attempts_so_far ({attempts_so_far}) must be below give_up_after_attempt ({give_up_after_attempt})"
    )]
    CounterAtCeiling {
        /// Configured starting counter
        attempts_so_far: u32,
        /// Configured ceiling
        give_up_after_attempt: u32,
    },

    /// Jitter must be a finite fraction in `[0, 1]`.
    #[error("jitter must be within [0, 1], got {0}")]
    InvalidJitter(f64),

    /// The exponential back-off multiplier must be finite and not negative.
    #[error("back-off multiplier must be finite and at least 0, got {0}")]
    InvalidMultiplier(f64),
}

/// Outcome of a wrapped call that did not succeed.
///
/// `E` is whatever the underlying operation fails with. It carries no bounds,
/// so bare strings, integers, or unit work just as well as error types.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The operation is not callable. No attempt ran.
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// The configuration was rejected. No attempt ran.
    #[error("invalid retry configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Every permitted attempt failed; `reason` is the last failure, after
    /// the rejection hook ran.
    #[error("operation failed after {attempts} attempt(s)")]
    Exhausted {
        /// Number of attempts counted when the wrapper gave up
        attempts: u32,
        /// Last failure value
        reason: E,
    },
}

impl<E> RetryError<E> {
    /// Returns `true` if the attempt budget was used up.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// The parameter error, if the operation was not callable.
    pub fn parameter(&self) -> Option<&ParameterError> {
        match self {
            Self::Parameter(err) => Some(err),
            _ => None,
        }
    }

    /// The configuration error, if the configuration was rejected.
    pub fn config(&self) -> Option<&ConfigError> {
        match self {
            Self::InvalidConfig(err) => Some(err),
            _ => None,
        }
    }

    /// The last failure value, if attempts were exhausted.
    pub fn reason(&self) -> Option<&E> {
        match self {
            Self::Exhausted { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Consumes the error, returning the last failure value.
    pub fn into_reason(self) -> Option<E> {
        match self {
            Self::Exhausted { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Attempts made before giving up. Zero when no attempt ran.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } => *attempts,
            _ => 0,
        }
    }
}

/// A failure that is either a structured error or an arbitrary value.
///
/// Useful when one operation can reject with both real errors and plain
/// data (a status string, a JSON payload) and the caller wants a single
/// failure type for both.
///
/// ```
/// use but_you_promised::error::Failure;
///
/// let plain = Failure::from("nope");
/// assert_eq!(plain.as_value().and_then(|v| v.as_str()), Some("nope"));
///
/// let structured = Failure::error(std::io::Error::other("disk on fire"));
/// assert!(structured.is_error());
/// ```
pub enum Failure {
    /// A structured error.
    Error(Box<dyn std::error::Error + Send + Sync>),
    /// Any other failure value.
    Value(serde_json::Value),
}

impl Failure {
    /// Wrap a structured error.
    pub fn error(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Error(Box::new(err))
    }

    /// Wrap an arbitrary value.
    pub fn value(value: impl Into<serde_json::Value>) -> Self {
        Self::Value(value.into())
    }

    /// Returns `true` for the structured error variant.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The wrapped value, if this is not a structured error.
    pub fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// The wrapped error, if this is a structured error.
    pub fn as_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Error(err) => Some(err.as_ref()),
            Self::Value(_) => None,
        }
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(err) => f.debug_tuple("Error").field(err).finish(),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(err) => write!(f, "{err}"),
            Self::Value(serde_json::Value::String(s)) => f.write_str(s),
            Self::Value(value) => write!(f, "{value}"),
        }
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for Failure {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Error(err)
    }
}

impl From<serde_json::Value> for Failure {
    fn from(value: serde_json::Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Failure {
    fn from(value: &str) -> Self {
        Self::Value(serde_json::Value::String(value.to_string()))
    }
}

impl From<String> for Failure {
    fn from(value: String) -> Self {
        Self::Value(serde_json::Value::String(value))
    }
}
