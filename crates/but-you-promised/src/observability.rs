//! Structured logging for the attempt loop.
//!
//! All events are emitted through `tracing`; the crate never installs a
//! subscriber. Failure values are not logged since they carry no `Debug`
//! bound.

use crate::error::{ConfigError, ParameterError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Logging context for one wrapped call.
#[derive(Debug, Clone)]
pub(crate) struct CallContext<'a> {
    operation: &'a str,
    started: Instant,
}

impl<'a> CallContext<'a> {
    /// Start timing a call of `operation`.
    pub(crate) fn start(operation: &'a str) -> Self {
        Self {
            operation,
            started: Instant::now(),
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Log an attempt being started
    pub(crate) fn log_attempt(&self, attempt: u32, ceiling: u32) {
        debug!(
            operation = self.operation,
            attempt,
            ceiling,
            "Starting attempt"
        );
    }

    /// Log the call resolving successfully
    pub(crate) fn log_success(&self, attempt: u32, recovered: bool) {
        debug!(
            operation = self.operation,
            attempt,
            recovered,
            elapsed_ms = self.elapsed().as_millis(),
            "Wrapped operation succeeded"
        );
    }

    /// Log a failed attempt that will be retried
    pub(crate) fn log_retry_scheduled(&self, attempt: u32, ceiling: u32, delay: Duration) {
        warn!(
            operation = self.operation,
            attempt,
            ceiling,
            delay_ms = delay.as_millis(),
            "Attempt failed, retry scheduled"
        );
    }

    /// Log the attempt budget running out
    pub(crate) fn log_exhausted(&self, attempts: u32) {
        warn!(
            operation = self.operation,
            attempts,
            elapsed_ms = self.elapsed().as_millis(),
            "Wrapped operation failed, giving up"
        );
    }

    /// Log a call rejected before any attempt ran
    pub(crate) fn log_parameter_error(&self, error: &ParameterError) {
        warn!(
            operation = self.operation,
            error = %error,
            "Wrapped operation could not run"
        );
    }

    /// Log a call rejected because of its configuration
    pub(crate) fn log_config_error(&self, error: &ConfigError) {
        warn!(
            operation = self.operation,
            error = %error,
            "Retry configuration rejected"
        );
    }
}
