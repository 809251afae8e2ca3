//! Outcome hooks run after every attempt.
//!
//! [`FulfilledHook`] sees each successful value and may transform it or turn
//! it into a failure. [`RejectedHook`] sees each failure and may transform
//! it, rethrow it, or recover with a value. Async closures implement both
//! traits, so most callers never name them:
//!
//! ```rust
//! use but_you_promised::config::RetryConfig;
//!
//! let config = RetryConfig::<u32, String>::builder()
//!     .on_fulfilled(|value: u32| async move {
//!         if value == 0 { Err("zero is not an answer".to_string()) } else { Ok(value) }
//!     })
//!     .on_rejected(|reason: String| async move { Err(format!("upstream: {reason}")) })
//!     .build();
//! # let _ = config;
//! ```

use async_trait::async_trait;
use std::future::Future;

/// Runs on every successful attempt.
///
/// Returning `Err` sends the attempt down the failure path, exactly as if the
/// operation itself had failed: the [`RejectedHook`] sees it and it counts
/// toward the attempt ceiling.
#[async_trait]
pub trait FulfilledHook<T, E>: Send + Sync {
    /// Transform the value, or fail the attempt.
    async fn on_fulfilled(&self, value: T) -> Result<T, E>;
}

/// Runs on every failed attempt, including failures raised by a
/// [`FulfilledHook`].
///
/// `Err` carries the (possibly transformed) failure on to the retry decision.
/// `Ok` recovers: the wrapped call resolves with that value and no further
/// attempts run.
#[async_trait]
pub trait RejectedHook<T, E>: Send + Sync {
    /// Rethrow, transform, or recover from the failure.
    async fn on_rejected(&self, reason: E) -> Result<T, E>;
}

/// Default success hook: passes the value through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

/// Default failure hook: rethrows the failure unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rethrow;

#[async_trait]
impl<T, E> FulfilledHook<T, E> for Identity
where
    T: Send + 'static,
    E: Send + 'static,
{
    async fn on_fulfilled(&self, value: T) -> Result<T, E> {
        Ok(value)
    }
}

#[async_trait]
impl<T, E> RejectedHook<T, E> for Rethrow
where
    T: Send + 'static,
    E: Send + 'static,
{
    async fn on_rejected(&self, reason: E) -> Result<T, E> {
        Err(reason)
    }
}

#[async_trait]
impl<T, E, F, Fut> FulfilledHook<T, E> for F
where
    F: Fn(T) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, E>> + Send,
    T: Send + 'static,
    E: Send + 'static,
{
    async fn on_fulfilled(&self, value: T) -> Result<T, E> {
        self(value).await
    }
}

#[async_trait]
impl<T, E, F, Fut> RejectedHook<T, E> for F
where
    F: Fn(E) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, E>> + Send,
    T: Send + 'static,
    E: Send + 'static,
{
    async fn on_rejected(&self, reason: E) -> Result<T, E> {
        self(reason).await
    }
}
