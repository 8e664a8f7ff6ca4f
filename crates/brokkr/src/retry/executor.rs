//! Retry execution engine
//!
//! Attempts are strictly sequential: each one is fully awaited before the
//! next begins, and the only suspension points are the backoff sleep and the
//! optional per-attempt timeout race. Nothing is shared across invocations;
//! every call owns its own attempt counter and clock.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use crate::policy::RetryPolicy;

use super::backoff::calculate_delay;
use super::error::RetryError;
use super::observer::{NoOpObserver, RetryObserver, TracingObserver};
use super::predicate::{AlwaysRetry, RetryPredicate};

/// Execute an async operation with retry logic based on a policy
///
/// This is the convenience path for simple retry scenarios: diagnostics go
/// to a [`TracingObserver`] labeled with `context`, and every error counts
/// as retryable. For classification or custom observation, use
/// [`RetryExecutorBuilder`].
///
/// # Example
///
/// ```rust,no_run
/// use brokkr::policy::RetryPolicy;
/// use brokkr::retry::retry_with_policy;
///
/// async fn example() {
///     let policy = RetryPolicy::default();
///
///     let result = retry_with_policy(&policy, "fetch-manifest", || async {
///         // Simulated operation that might fail
///         Ok::<_, std::io::Error>("success")
///     })
///     .await;
/// }
/// ```
pub async fn retry_with_policy<F, Fut, T, E>(
    policy: &RetryPolicy,
    context: impl Into<String>,
    op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    RetryExecutorBuilder::new()
        .with_policy(policy.clone())
        .with_observer(TracingObserver::new(context))
        .build()
        .execute(op)
        .await
}

/// Builder for configuring a [`RetryExecutor`]
///
/// # Example
///
/// ```rust
/// use brokkr::policy::RetryPolicy;
/// use brokkr::retry::{RetryExecutorBuilder, TracingObserver};
/// use std::time::Duration;
///
/// let executor = RetryExecutorBuilder::new()
///     .with_policy(RetryPolicy::default())
///     .with_observer(TracingObserver::new("download"))
///     .with_attempt_timeout(Duration::from_secs(30))
///     .build();
/// ```
pub struct RetryExecutorBuilder<P = AlwaysRetry, O = NoOpObserver> {
    policy: RetryPolicy,
    predicate: P,
    observer: O,
    attempt_timeout: Option<Duration>,
}

impl Default for RetryExecutorBuilder<AlwaysRetry, NoOpObserver> {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryExecutorBuilder<AlwaysRetry, NoOpObserver> {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            policy: RetryPolicy::default(),
            predicate: AlwaysRetry,
            observer: NoOpObserver,
            attempt_timeout: None,
        }
    }
}

impl<P, O> RetryExecutorBuilder<P, O> {
    /// Set the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the retry predicate
    ///
    /// The predicate determines whether an error should be retried.
    pub fn with_predicate<P2>(self, predicate: P2) -> RetryExecutorBuilder<P2, O> {
        RetryExecutorBuilder {
            policy: self.policy,
            predicate,
            observer: self.observer,
            attempt_timeout: self.attempt_timeout,
        }
    }

    /// Set the observer
    ///
    /// The observer receives callbacks during retry execution.
    pub fn with_observer<O2>(self, observer: O2) -> RetryExecutorBuilder<P, O2> {
        RetryExecutorBuilder {
            policy: self.policy,
            predicate: self.predicate,
            observer,
            attempt_timeout: self.attempt_timeout,
        }
    }

    /// Bound every individual attempt by a wall-clock budget
    ///
    /// A timed-out attempt counts as a transient failure and is retried
    /// while attempts remain; on the final attempt it surfaces as
    /// [`RetryError::AttemptTimeout`].
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Build the executor
    pub fn build(self) -> RetryExecutor<P, O> {
        RetryExecutor {
            policy: self.policy,
            predicate: self.predicate,
            observer: self.observer,
            attempt_timeout: self.attempt_timeout,
        }
    }
}

/// A retry executor with configurable policy, predicate, and observer
///
/// Use [`RetryExecutorBuilder`] to create an instance.
pub struct RetryExecutor<P, O> {
    policy: RetryPolicy,
    predicate: P,
    observer: O,
    attempt_timeout: Option<Duration>,
}

impl<P, O> RetryExecutor<P, O>
where
    O: RetryObserver,
{
    /// Execute an operation with retry logic
    ///
    /// Invokes `op` up to `max_attempts` times. A success returns
    /// immediately. A failure on the final attempt is terminal regardless of
    /// classification; otherwise the predicate decides whether to back off
    /// and go again or abort with [`RetryError::NonRetryable`].
    pub async fn execute<F, Fut, T, E>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
        P: RetryPredicate<E>,
    {
        let start = Instant::now();
        let mut last_error: Option<E> = None;

        for attempt in 1..=self.policy.max_attempts {
            self.observer
                .on_attempt_start(attempt, self.policy.max_attempts);

            let outcome = match self.attempt_timeout {
                Some(budget) => match tokio::time::timeout(budget, op()).await {
                    Ok(result) => result.map_err(AttemptFailure::Error),
                    Err(_) => Err(AttemptFailure::TimedOut(budget)),
                },
                None => op().await.map_err(AttemptFailure::Error),
            };

            match outcome {
                Ok(result) => {
                    self.observer.on_success(attempt, start.elapsed());
                    return Ok(result);
                }
                Err(failure) => {
                    // The final attempt is terminal no matter how the error
                    // would classify; the predicate is not consulted.
                    if attempt >= self.policy.max_attempts {
                        self.observer.on_exhausted(attempt, &failure);
                        return Err(failure.into_terminal(attempt, start.elapsed()));
                    }

                    let transient = match &failure {
                        AttemptFailure::Error(err) => self.predicate.should_retry(err),
                        // A timed-out attempt carries no error value to
                        // classify; treat it as transient.
                        AttemptFailure::TimedOut(_) => true,
                    };

                    if !transient {
                        self.observer.on_non_retryable(attempt, &failure);
                        return Err(failure.into_non_retryable(attempt));
                    }

                    let delay = calculate_delay(&self.policy, attempt);

                    self.observer.on_attempt_failed(
                        attempt,
                        self.policy.max_attempts,
                        &failure,
                        delay,
                    );

                    if let AttemptFailure::Error(err) = failure {
                        last_error = Some(err);
                    }

                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        // Only reachable with max_attempts == 0, outside the validated domain.
        Err(RetryError::max_attempts_exceeded(
            self.policy.max_attempts,
            last_error,
        ))
    }
}

/// How a single attempt went wrong: its own error, or the per-attempt budget.
enum AttemptFailure<E> {
    Error(E),
    TimedOut(Duration),
}

impl<E> AttemptFailure<E> {
    fn into_terminal(self, attempt: u32, total_duration: Duration) -> RetryError<E> {
        match self {
            Self::Error(source) => RetryError::exhausted(attempt, source, total_duration),
            Self::TimedOut(timeout) => RetryError::attempt_timeout(attempt, timeout),
        }
    }

    fn into_non_retryable(self, attempt: u32) -> RetryError<E> {
        match self {
            Self::Error(source) => RetryError::non_retryable(attempt, source),
            Self::TimedOut(timeout) => RetryError::attempt_timeout(attempt, timeout),
        }
    }
}

impl<E: fmt::Display> fmt::Display for AttemptFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(err) => err.fmt(f),
            Self::TimedOut(budget) => {
                write!(f, "attempt timed out after {}ms", budget.as_millis())
            }
        }
    }
}
