#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Retry decorator for asynchronous operations.
//!
//! Give [`wrap`](retry::wrap) a fallible async operation and get back a
//! wrapper with the same input. Each call of the wrapper invokes the
//! operation again on failure, waiting a back-off delay between attempts,
//! until it succeeds or the attempt ceiling is reached:
//!
//! - **Back-off** via the two-stage [`BackOffStrategy`](retry::BackOffStrategy)
//!   trait (bind a seed delay, then map attempt count to delay)
//!   - Quadratic by default: 0s, 1s, 5s, 14s, 30s attempt onsets
//!   - Constant, linear and exponential built in, any closure accepted
//!   - Optional cap and jitter
//! - **Outcome hooks** that transform successes, transform or recover from
//!   failures, and can fail an otherwise successful attempt
//! - **Configuration** as serde-loadable [`RetryOptions`](config::RetryOptions)
//!   plus a builder for hooks and custom strategies
//! - **Deferred validation**: wrapping never fails; a non-callable operation
//!   surfaces as [`ParameterError`](error::ParameterError) and bad
//!   configuration as [`ConfigError`](error::ConfigError) when the wrapper is
//!   called
//!
//! Failure values are not required to implement `std::error::Error`. Any
//! type works, and [`Failure`](error::Failure) covers callers that mix
//! structured errors with plain values.
//!
//! # Examples
//!
//! Using the prelude for convenient imports:
//!
//! ```rust
//! use but_you_promised::prelude::*;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = RetryConfig::builder()
//!     .give_up_after_attempt(3)
//!     .back_off_seed_delay(Duration::from_millis(10))
//!     .build();
//!
//! let ping = wrap_with(|_: ()| async { Err::<(), _>(Failure::from("host unreachable")) }, config);
//!
//! let err = ping.call(()).await.unwrap_err();
//! assert_eq!(err.attempts(), 3);
//! assert_eq!(err.reason().map(|f| f.to_string()), Some("host unreachable".into()));
//! # }
//! ```

pub mod config;
pub mod error;
mod observability;
pub mod retry;


/// Convenient re-exports of commonly used items.
///
/// Import everything with:
///
/// ```rust
/// use but_you_promised::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{RetryConfig, RetryConfigBuilder, RetryOptions};
    pub use crate::error::{ConfigError, Failure, ParameterError, RetryError};
    pub use crate::retry::{
        BackOff, BackOffStrategy, FulfilledHook, Operation, RejectedHook, Retrying, wrap,
        wrap_operation, wrap_value, wrap_with,
    };
}
