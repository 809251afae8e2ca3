//! Retry wrapper, back-off strategies and outcome hooks.
//!
//! # Key Types
//!
//! - [`Retrying`] - An operation wrapped with retry behaviour
//! - [`BackOffStrategy`] - Two-stage back-off: bind a seed, then map attempt count to delay
//! - [`BackOff`] - Built-in strategies (quadratic by default)
//! - [`FulfilledHook`] / [`RejectedHook`] - Per-attempt outcome hooks
//!
//! # Examples
//!
//! ```rust
//! use but_you_promised::retry::wrap;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let lookup = wrap(|host: &'static str| async move {
//!     // Your async operation here
//!     Ok::<_, std::io::Error>(format!("{host} resolved"))
//! });
//!
//! assert_eq!(lookup.call("example.com").await.unwrap(), "example.com resolved");
//! # }
//! ```

mod attempt;
mod backoff;
pub mod hooks;
mod strategy;
mod wrapper;

pub use backoff::BackOff;
pub use hooks::{FulfilledHook, Identity, RejectedHook, Rethrow};
pub use strategy::{BackOffStrategy, DelayFn, SharedBackOff};
pub use wrapper::{
    Operation, Retrying, Uncallable, wrap, wrap_operation, wrap_value, wrap_with,
};
