//! The two-stage back-off abstraction.

use std::sync::Arc;
use std::time::Duration;

/// Delay function produced by a [`BackOffStrategy`] once the seed is bound.
///
/// Takes the number of attempts made so far (1-based, counting the attempt
/// that just failed) and returns how long to wait before the next one.
pub type DelayFn = Box<dyn Fn(u32) -> Duration + Send + Sync>;

/// A family of back-off delays parameterised by a seed delay.
///
/// Resolution happens in two stages. The wrapper binds the seed once per
/// invocation with [`delay_fn`](Self::delay_fn), then asks the resulting
/// [`DelayFn`] for a delay after each failed attempt. The delay function is
/// expected to be pure in the attempt count.
///
/// Any closure shaped `Fn(Duration) -> impl Fn(u32) -> Duration` is a
/// strategy:
///
/// ```rust
/// use but_you_promised::retry::BackOffStrategy;
/// use std::time::Duration;
///
/// // Wait `seed` between every attempt.
/// let constant = |seed: Duration| move |_attempts: u32| seed;
///
/// let delay = constant.delay_fn(Duration::from_millis(250));
/// assert_eq!(delay(1), Duration::from_millis(250));
/// assert_eq!(delay(4), Duration::from_millis(250));
/// ```
pub trait BackOffStrategy: Send + Sync {
    /// Bind the seed delay and return the delay function of attempt count.
    fn delay_fn(&self, seed: Duration) -> DelayFn;
}

impl<S, D> BackOffStrategy for S
where
    S: Fn(Duration) -> D + Send + Sync,
    D: Fn(u32) -> Duration + Send + Sync + 'static,
{
    fn delay_fn(&self, seed: Duration) -> DelayFn {
        Box::new(self(seed))
    }
}

/// Shared handle to a strategy, as stored in a [`RetryConfig`](crate::config::RetryConfig).
pub type SharedBackOff = Arc<dyn BackOffStrategy>;
