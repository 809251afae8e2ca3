//! The retry wrapper and its attempt loop.

use super::attempt::Attempts;
use crate::config::RetryConfig;
use crate::error::{ParameterError, RetryError};
use std::borrow::Cow;
use crate::observability::CallContext;
use std::fmt;
use std::future::{Future, Ready};
use std::sync::Arc;

/// Name used in log events when a wrapper was not given one.
const DEFAULT_OPERATION_NAME: &str = "operation";

/// Something handed to the wrapper as the operation to retry.
///
/// Statically typed callers always have a callable and can ignore this type;
/// [`wrap`] and [`wrap_with`] build the `Callable` variant for them. It
/// exists for callers that take operations from dynamic input, where the
/// value may turn out not to be callable. Such a wrapper is still built, and
/// reports [`ParameterError::NotCallable`] when it is invoked.
pub enum Operation<F> {
    /// A callable operation
    Callable(F),
    /// A value that cannot be called
    NotCallable(ParameterError),
}

impl<F> Operation<F> {
    /// Record a value of type `received` that cannot be called.
    pub fn not_callable(received: impl Into<String>) -> Self {
        Self::NotCallable(ParameterError::NotCallable {
            received: received.into(),
        })
    }

    /// Record a JSON value supplied where an operation was expected.
    ///
    /// JSON values are never callable; the error names the JSON type.
    pub fn from_value(value: &serde_json::Value) -> Self {
        Self::not_callable(json_type_name(value))
    }

    /// Returns `true` for the `Callable` variant.
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Callable(_))
    }
}

impl<F> From<F> for Operation<F> {
    fn from(operation: F) -> Self {
        Self::Callable(operation)
    }
}

impl<F> fmt::Debug for Operation<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callable(_) => f.write_str("Callable(..)"),
            Self::NotCallable(err) => f.debug_tuple("NotCallable").field(err).finish(),
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Operation type of a wrapper built with [`wrap_value`]. Never invoked.
pub type Uncallable<A, T, E> = fn(A) -> Ready<Result<T, E>>;

/// An operation wrapped with retry behaviour.
///
/// Created by [`wrap`], [`wrap_with`], [`wrap_operation`] or [`wrap_value`].
/// Calling it with [`call`](Self::call) (or [`run`](Self::run) for operations
/// without arguments) invokes the underlying operation until it succeeds or
/// the attempt ceiling is reached, sleeping on the tokio timer between
/// attempts.
///
/// The wrapper holds no per-call state. Each call resolves its own attempt
/// counter from the configuration, so a single wrapper (or its clones) can be
/// called any number of times, concurrently.
///
/// # Examples
///
/// ```rust
/// use but_you_promised::config::RetryConfig;
/// use but_you_promised::retry::wrap_with;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let calls = Arc::new(AtomicU32::new(0));
/// let counter = Arc::clone(&calls);
///
/// let fetch = wrap_with(
///     move |id: u32| {
///         let counter = Arc::clone(&counter);
///         async move {
///             if counter.fetch_add(1, Ordering::SeqCst) < 2 {
///                 Err(format!("user {id} unavailable"))
///             } else {
///                 Ok(format!("user {id}"))
///             }
///         }
///     },
///     RetryConfig::builder()
///         .back_off_seed_delay(Duration::from_millis(1))
///         .build(),
/// );
///
/// assert_eq!(fetch.call(7).await.unwrap(), "user 7");
/// assert_eq!(calls.load(Ordering::SeqCst), 3);
/// # }
/// ```
pub struct Retrying<F, T, E> {
    operation: Arc<Operation<F>>,
    config: Arc<RetryConfig<T, E>>,
    name: Cow<'static, str>,
}

/// Wrap `operation` with the default configuration.
///
/// Defaults: up to 5 attempts, quadratic back-off seeded with one second,
/// pass-through hooks.
pub fn wrap<F, T, E>(operation: F) -> Retrying<F, T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    wrap_with(operation, RetryConfig::default())
}

/// Wrap `operation` with `config`.
///
/// `config` may be a full [`RetryConfig`] or plain
/// [`RetryOptions`](crate::config::RetryOptions).
pub fn wrap_with<F, T, E>(
    operation: F,
    config: impl Into<RetryConfig<T, E>>,
) -> Retrying<F, T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    wrap_operation(Operation::Callable(operation), config)
}

/// Wrap an [`Operation`] that may not be callable.
///
/// Never fails; a non-callable operation is reported when the returned
/// wrapper is invoked.
pub fn wrap_operation<F, T, E>(
    operation: Operation<F>,
    config: impl Into<RetryConfig<T, E>>,
) -> Retrying<F, T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    Retrying {
        operation: Arc::new(operation),
        config: Arc::new(config.into()),
        name: Cow::Borrowed(DEFAULT_OPERATION_NAME),
    }
}

/// Wrap a JSON value supplied where an operation was expected.
///
/// The resulting wrapper resolves every call with
/// [`ParameterError::NotCallable`] naming the value's JSON type.
pub fn wrap_value<A, T, E>(
    value: &serde_json::Value,
    config: impl Into<RetryConfig<T, E>>,
) -> Retrying<Uncallable<A, T, E>, T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    wrap_operation(Operation::from_value(value), config)
}

impl<F, T, E> Retrying<F, T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Name the operation in log events.
    ///
    /// Accepts a literal or a name built at runtime.
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Name used in log events.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configuration every call resolves from.
    pub fn config(&self) -> &RetryConfig<T, E> {
        &self.config
    }

    /// Invoke the operation with `args`, retrying on failure.
    ///
    /// `args` is captured once and a clone of it is passed to every attempt,
    /// so each attempt sees identical arguments. Use a tuple for operations
    /// taking several arguments.
    ///
    /// # Errors
    ///
    /// - [`RetryError::Parameter`] if the operation is not callable. No
    ///   attempt runs.
    /// - [`RetryError::InvalidConfig`] if the configuration is invalid. No
    ///   attempt runs.
    /// - [`RetryError::Exhausted`] with the last failure (after the
    ///   rejection hook) once the attempt ceiling is reached.
    pub async fn call<A, Fut>(&self, args: A) -> Result<T, RetryError<E>>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        A: Clone,
    {
        self.drive(|operation| operation(args.clone())).await
    }

    /// Invoke an operation that takes no arguments, retrying on failure.
    ///
    /// # Errors
    ///
    /// Same as [`call`](Self::call).
    pub async fn run<Fut>(&self) -> Result<T, RetryError<E>>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.drive(|operation| operation()).await
    }

    async fn drive<Fut>(&self, invoke: impl Fn(&F) -> Fut) -> Result<T, RetryError<E>>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let log = CallContext::start(&self.name);

        let operation = match self.operation.as_ref() {
            Operation::Callable(operation) => operation,
            Operation::NotCallable(err) => {
                log.log_parameter_error(err);
                return Err(err.clone().into());
            }
        };

        let mut attempts =
            Attempts::resolve(self.config.as_ref()).inspect_err(|err| log.log_config_error(err))?;

        loop {
            let attempt = attempts.begin();
            log.log_attempt(attempt, attempts.ceiling());

            // Success-hook failures take the same path as operation failures.
            let outcome = match invoke(operation).await {
                Ok(value) => self.config.fulfilled_hook().on_fulfilled(value).await,
                Err(reason) => Err(reason),
            };

            let reason = match outcome {
                Ok(value) => {
                    log.log_success(attempt, false);
                    return Ok(value);
                }
                Err(reason) => match self.config.rejected_hook().on_rejected(reason).await {
                    Ok(value) => {
                        log.log_success(attempt, true);
                        return Ok(value);
                    }
                    Err(reason) => reason,
                },
            };

            if !attempts.can_retry() {
                log.log_exhausted(attempts.so_far());
                return Err(RetryError::Exhausted {
                    attempts: attempts.so_far(),
                    reason,
                });
            }

            let delay = attempts.next_delay();
            log.log_retry_scheduled(attempt, attempts.ceiling(), delay);
            tokio::time::sleep(delay).await;
        }
    }
}

impl<F, T, E> Clone for Retrying<F, T, E> {
    fn clone(&self) -> Self {
        Self {
            operation: Arc::clone(&self.operation),
            config: Arc::clone(&self.config),
            name: self.name.clone(),
        }
    }
}

impl<F, T, E> fmt::Debug for Retrying<F, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrying")
            .field("name", &self.name)
            .field("operation", &self.operation)
            .field("config", &self.config)
            .finish()
    }
}
