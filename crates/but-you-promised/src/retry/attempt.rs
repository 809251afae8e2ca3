//! Per-invocation attempt bookkeeping.

use super::backoff;
use super::strategy::DelayFn;
use crate::config::RetryConfig;
use crate::error::ConfigError;
use std::fmt;
use std::time::Duration;

/// Attempt counter and bound delay function for one wrapped call.
///
/// Resolved fresh from the [`RetryConfig`] on every call, which is what keeps
/// concurrent calls of the same wrapped operation independent.
pub(crate) struct Attempts {
    so_far: u32,
    ceiling: u32,
    delay: DelayFn,
    max_delay: Option<Duration>,
    jitter: f64,
}

impl Attempts {
    /// Validate `config` and bind its strategy to the seed.
    pub(crate) fn resolve<T, E>(config: &RetryConfig<T, E>) -> Result<Self, ConfigError> {
        let options = config.options();
        options.validate()?;

        Ok(Self {
            so_far: options.attempts_so_far,
            ceiling: options.give_up_after_attempt,
            delay: config.back_off().delay_fn(options.seed_delay()),
            max_delay: options.max_back_off_delay(),
            jitter: options.jitter,
        })
    }

    /// Count a new attempt and return its 1-based number.
    pub(crate) fn begin(&mut self) -> u32 {
        debug_assert!(self.so_far < self.ceiling);
        self.so_far += 1;
        self.so_far
    }

    pub(crate) fn so_far(&self) -> u32 {
        self.so_far
    }

    pub(crate) fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Whether another attempt fits under the ceiling.
    pub(crate) fn can_retry(&self) -> bool {
        self.so_far < self.ceiling
    }

    /// Delay before the next attempt, given the attempts made so far.
    pub(crate) fn next_delay(&self) -> Duration {
        let delay = backoff::cap((self.delay)(self.so_far), self.max_delay);
        backoff::jitter(delay, self.jitter)
    }
}

impl fmt::Debug for Attempts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attempts")
            .field("so_far", &self.so_far)
            .field("ceiling", &self.ceiling)
            .field("max_delay", &self.max_delay)
            .field("jitter", &self.jitter)
            .finish_non_exhaustive()
    }
}
