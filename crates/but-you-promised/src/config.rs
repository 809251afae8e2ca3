//! Retry configuration.
//!
//! Configuration comes in two layers:
//!
//! - [`RetryOptions`] is plain data. It deserializes from JSON, TOML or any
//!   other serde format, ignores keys it does not know, and falls back to
//!   defaults for keys that are missing.
//! - [`RetryConfig`] adds the parts that cannot live in a config file: a
//!   custom [`BackOffStrategy`] and the outcome hooks.
//!
//! A `RetryConfig` is immutable once built. Every call to a wrapped operation
//! resolves its own attempt counter from it, so one configuration can back any
//! number of concurrent calls.

use crate::error::ConfigError;
use crate::retry::hooks::{FulfilledHook, Identity, RejectedHook, Rethrow};
use crate::retry::{BackOff, BackOffStrategy, SharedBackOff};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default delay seed: one second.
pub const DEFAULT_SEED_DELAY_MS: u64 = 1000;

/// Default attempt ceiling.
pub const DEFAULT_GIVE_UP_AFTER_ATTEMPT: u32 = 5;

/// Serializable retry settings.
///
/// Keys use camelCase on the wire:
///
/// ```rust
/// use but_you_promised::config::RetryOptions;
/// use but_you_promised::retry::BackOff;
///
/// let options: RetryOptions = serde_json::from_str(
///     r#"{ "giveUpAfterAttempt": 3, "backOff": { "kind": "constant" }, "colour": "blue" }"#,
/// )?;
///
/// assert_eq!(options.give_up_after_attempt, 3);
/// assert_eq!(options.back_off, BackOff::Constant);
/// assert_eq!(options.back_off_seed_delay_in_ms, 1000); // default
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryOptions {
    /// Counter value before the first attempt. Rarely anything but zero.
    pub attempts_so_far: u32,

    /// Built-in strategy used when no custom strategy is configured
    pub back_off: BackOff,

    /// Seed handed to the back-off strategy
    pub back_off_seed_delay_in_ms: u64,

    /// Attempt ceiling; the wrapper gives up once the counter reaches it
    pub give_up_after_attempt: u32,

    /// Upper bound applied to every computed delay
    pub max_back_off_delay_in_ms: Option<u64>,

    /// Fraction in `[0, 1]` by which each delay is randomised
    pub jitter: f64,
}

impl Default for RetryOptions {
    /// Defaults:
    /// - `attempts_so_far`: 0
    /// - `back_off`: quadratic
    /// - `back_off_seed_delay_in_ms`: 1000
    /// - `give_up_after_attempt`: 5
    /// - `max_back_off_delay_in_ms`: none
    /// - `jitter`: 0.0
    fn default() -> Self {
        Self {
            attempts_so_far: 0,
            back_off: BackOff::default(),
            back_off_seed_delay_in_ms: DEFAULT_SEED_DELAY_MS,
            give_up_after_attempt: DEFAULT_GIVE_UP_AFTER_ATTEMPT,
            max_back_off_delay_in_ms: None,
            jitter: 0.0,
        }
    }
}

impl RetryOptions {
    /// The back-off seed as a [`Duration`].
    pub fn seed_delay(&self) -> Duration {
        Duration::from_millis(self.back_off_seed_delay_in_ms)
    }

    /// The delay cap as a [`Duration`], if one is set.
    pub fn max_back_off_delay(&self) -> Option<Duration> {
        self.max_back_off_delay_in_ms.map(Duration::from_millis)
    }

    /// Check the invariants the attempt loop relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.give_up_after_attempt == 0 {
            return Err(ConfigError::ZeroAttemptCeiling);
        }
        if self.attempts_so_far >= self.give_up_after_attempt {
            return Err(ConfigError::CounterAtCeiling {
                attempts_so_far: self.attempts_so_far,
                give_up_after_attempt: self.give_up_after_attempt,
            });
        }
        if !self.jitter.is_finite() || !(0.0..=1.0).contains(&self.jitter) {
            return Err(ConfigError::InvalidJitter(self.jitter));
        }
        if let BackOff::Exponential { multiplier } = self.back_off
            && (!multiplier.is_finite() || multiplier < 0.0)
        {
            return Err(ConfigError::InvalidMultiplier(multiplier));
        }
        Ok(())
    }
}

/// Complete configuration for a wrapped operation producing `Result<T, E>`.
pub struct RetryConfig<T, E> {
    options: RetryOptions,
    back_off: SharedBackOff,
    on_fulfilled: Arc<dyn FulfilledHook<T, E>>,
    on_rejected: Arc<dyn RejectedHook<T, E>>,
}

impl<T, E> RetryConfig<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Create a new builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use but_you_promised::config::RetryConfig;
    /// use std::time::Duration;
    ///
    /// let config = RetryConfig::<(), std::io::Error>::builder()
    ///     .give_up_after_attempt(3)
    ///     .back_off_seed_delay(Duration::from_millis(50))
    ///     .build();
    ///
    /// assert_eq!(config.options().give_up_after_attempt, 3);
    /// assert_eq!(config.options().back_off_seed_delay_in_ms, 50);
    /// ```
    pub fn builder() -> RetryConfigBuilder<T, E> {
        RetryConfigBuilder::default()
    }

    /// Build a configuration from plain options, with default hooks.
    pub fn from_options(options: RetryOptions) -> Self {
        Self::builder().options(options).build()
    }
}

impl<T, E> RetryConfig<T, E> {
    /// The plain settings.
    pub fn options(&self) -> &RetryOptions {
        &self.options
    }

    /// The back-off strategy in effect.
    pub fn back_off(&self) -> &dyn BackOffStrategy {
        self.back_off.as_ref()
    }

    pub(crate) fn fulfilled_hook(&self) -> &dyn FulfilledHook<T, E> {
        self.on_fulfilled.as_ref()
    }

    pub(crate) fn rejected_hook(&self) -> &dyn RejectedHook<T, E> {
        self.on_rejected.as_ref()
    }
}

impl<T, E> Default for RetryConfig<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn default() -> Self {
        Self::builder().build()
    }
}

impl<T, E> Clone for RetryConfig<T, E> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            back_off: Arc::clone(&self.back_off),
            on_fulfilled: Arc::clone(&self.on_fulfilled),
            on_rejected: Arc::clone(&self.on_rejected),
        }
    }
}

impl<T, E> fmt::Debug for RetryConfig<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<T, E> From<RetryOptions> for RetryConfig<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn from(options: RetryOptions) -> Self {
        Self::from_options(options)
    }
}

/// Builder for [`RetryConfig`].
///
/// Anything left unset falls back to [`RetryOptions::default`] (or to the
/// options passed with [`options`](Self::options)), the options' built-in
/// back-off, and the pass-through hooks.
pub struct RetryConfigBuilder<T, E> {
    options: Option<RetryOptions>,
    attempts_so_far: Option<u32>,
    seed_delay: Option<Duration>,
    give_up_after_attempt: Option<u32>,
    max_delay: Option<Duration>,
    jitter: Option<f64>,
    back_off: Option<SharedBackOff>,
    on_fulfilled: Option<Arc<dyn FulfilledHook<T, E>>>,
    on_rejected: Option<Arc<dyn RejectedHook<T, E>>>,
}

impl<T, E> Default for RetryConfigBuilder<T, E> {
    fn default() -> Self {
        Self {
            options: None,
            attempts_so_far: None,
            seed_delay: None,
            give_up_after_attempt: None,
            max_delay: None,
            jitter: None,
            back_off: None,
            on_fulfilled: None,
            on_rejected: None,
        }
    }
}

impl<T, E> RetryConfigBuilder<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Start from these options instead of the defaults.
    ///
    /// Individual setters still win over fields in `options`.
    pub fn options(mut self, options: RetryOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the counter value before the first attempt.
    ///
    /// Default: 0
    pub fn attempts_so_far(mut self, attempts: u32) -> Self {
        self.attempts_so_far = Some(attempts);
        self
    }

    /// Set the seed handed to the back-off strategy.
    ///
    /// Default: 1s
    pub fn back_off_seed_delay(mut self, seed: Duration) -> Self {
        self.seed_delay = Some(seed);
        self
    }

    /// Set the attempt ceiling.
    ///
    /// Default: 5
    pub fn give_up_after_attempt(mut self, attempts: u32) -> Self {
        self.give_up_after_attempt = Some(attempts);
        self
    }

    /// Cap every computed delay at `max`.
    pub fn max_back_off_delay(mut self, max: Duration) -> Self {
        self.max_delay = Some(max);
        self
    }

    /// Randomise each delay by up to `±jitter * delay`.
    ///
    /// Default: 0.0. Values outside `[0, 1]` are reported when the wrapped
    /// operation is called.
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = Some(jitter);
        self
    }

    /// Use a custom back-off strategy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use but_you_promised::config::RetryConfig;
    /// use std::time::Duration;
    ///
    /// // Retry after the seed delay, every time.
    /// let config = RetryConfig::<(), String>::builder()
    ///     .back_off(|seed: Duration| move |_attempts: u32| seed)
    ///     .build();
    /// # let _ = config;
    /// ```
    pub fn back_off(mut self, strategy: impl BackOffStrategy + 'static) -> Self {
        self.back_off = Some(Arc::new(strategy));
        self
    }

    /// Run `hook` on every successful attempt.
    pub fn on_fulfilled(mut self, hook: impl FulfilledHook<T, E> + 'static) -> Self {
        self.on_fulfilled = Some(Arc::new(hook));
        self
    }

    /// Run `hook` on every failed attempt.
    pub fn on_rejected(mut self, hook: impl RejectedHook<T, E> + 'static) -> Self {
        self.on_rejected = Some(Arc::new(hook));
        self
    }

    /// Build the [`RetryConfig`].
    pub fn build(self) -> RetryConfig<T, E> {
        let mut options = self.options.unwrap_or_default();
        if let Some(attempts) = self.attempts_so_far {
            options.attempts_so_far = attempts;
        }
        if let Some(seed) = self.seed_delay {
            options.back_off_seed_delay_in_ms = saturating_millis(seed);
        }
        if let Some(attempts) = self.give_up_after_attempt {
            options.give_up_after_attempt = attempts;
        }
        if let Some(max) = self.max_delay {
            options.max_back_off_delay_in_ms = Some(saturating_millis(max));
        }
        if let Some(jitter) = self.jitter {
            options.jitter = jitter;
        }

        let back_off = self
            .back_off
            .unwrap_or_else(|| Arc::new(options.back_off) as SharedBackOff);

        RetryConfig {
            options,
            back_off,
            on_fulfilled: self.on_fulfilled.unwrap_or_else(|| Arc::new(Identity)),
            on_rejected: self.on_rejected.unwrap_or_else(|| Arc::new(Rethrow)),
        }
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
