//! Built-in back-off strategies, plus the cap and jitter applied on top.

use super::strategy::{BackOffStrategy, DelayFn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Built-in back-off strategies.
///
/// Each variant turns a seed delay into a delay function of `n`, the 1-based
/// count of attempts made so far:
///
/// ```text
/// Quadratic               delay(n) = seed * n^2        (default)
/// Constant                delay(n) = seed
/// Linear                  delay(n) = seed * n
/// Exponential { m }       delay(n) = seed * m^(n - 1)
/// ```
///
/// With the default seed of one second, `Quadratic` schedules attempts at
/// 0s, 1s, 5s, 14s and 30s.
///
/// The enum is serde-friendly so it can be picked from a configuration file:
///
/// ```rust
/// use but_you_promised::retry::BackOff;
///
/// let back_off: BackOff = serde_json::from_str(r#"{"kind": "exponential", "multiplier": 3.0}"#)?;
/// assert_eq!(back_off, BackOff::Exponential { multiplier: 3.0 });
/// # Ok::<(), serde_json::Error>(())
/// ```
///
/// # Arithmetic
///
/// Delays saturate at [`Duration::MAX`] instead of overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackOff {
    /// `seed * n^2`
    #[default]
    Quadratic,
    /// `seed`
    Constant,
    /// `seed * n`
    Linear,
    /// `seed * multiplier^(n - 1)`
    Exponential {
        /// Growth factor per attempt
        #[serde(default = "default_multiplier")]
        multiplier: f64,
    },
}

fn default_multiplier() -> f64 {
    2.0
}

impl BackOff {
    /// Compute the delay for `attempts` without binding a [`DelayFn`].
    pub fn delay(&self, seed: Duration, attempts: u32) -> Duration {
        match *self {
            Self::Quadratic => seed.saturating_mul(attempts.saturating_mul(attempts)),
            Self::Constant => seed,
            Self::Linear => seed.saturating_mul(attempts),
            Self::Exponential { .. } if seed.is_zero() => Duration::ZERO,
            Self::Exponential { multiplier } => {
                let exponent = attempts.saturating_sub(1).min(i32::MAX as u32) as i32;
                let secs = seed.as_secs_f64() * multiplier.powi(exponent);
                Duration::try_from_secs_f64(secs).unwrap_or(if secs.is_sign_negative() {
                    Duration::ZERO
                } else {
                    Duration::MAX
                })
            }
        }
    }
}

impl BackOffStrategy for BackOff {
    fn delay_fn(&self, seed: Duration) -> DelayFn {
        let strategy = *self;
        Box::new(move |attempts| strategy.delay(seed, attempts))
    }
}

/// Clamp `delay` to `max` when a cap is configured.
pub(crate) fn cap(delay: Duration, max: Option<Duration>) -> Duration {
    match max {
        Some(max) => delay.min(max),
        None => delay,
    }
}

/// Randomise `delay` by up to `±jitter * delay`.
///
/// `jitter` is expected in `[0, 1]`; the result never goes below zero.
pub(crate) fn jitter(delay: Duration, jitter: f64) -> Duration {
    if jitter <= 0.0 || delay.is_zero() {
        return delay;
    }

    let base = delay.as_secs_f64();
    let offset = base * jitter * (rand::random::<f64>() - 0.5) * 2.0;
    Duration::try_from_secs_f64((base + offset).max(0.0)).unwrap_or(delay)
}
