//! Error types for the retry execution engine
//!
//! [`RetryError`] is generic over `E`, the error type of the operation being
//! retried, and always carries the original error value verbatim where one
//! exists. [`TimeoutError`] is the concrete failure of the standalone
//! [`execute_with_timeout`](super::execute_with_timeout) wrapper, kept
//! distinct from the wrapped operation's own errors.

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Errors that can occur during retry execution
#[derive(Debug)]
pub enum RetryError<E> {
    /// The attempt budget was spent and the last attempt still failed
    Exhausted {
        /// Number of attempts made before giving up
        attempts: u32,
        /// The error from the final attempt, verbatim
        source: E,
        /// Total duration spent across all attempts
        total_duration: Duration,
    },

    /// The retryability predicate classified an error as not worth retrying
    ///
    /// Remaining attempts are not consumed; the sequence stops immediately.
    NonRetryable {
        /// The attempt that produced the error (1-indexed)
        attempt: u32,
        /// The error that was classified as non-retryable, verbatim
        source: E,
    },

    /// The final attempt exceeded its per-attempt timeout budget
    ///
    /// Earlier timed-out attempts are retried like any transient failure;
    /// this variant only surfaces when the budget ran out on the last one.
    AttemptTimeout {
        /// Which attempt timed out (1-indexed)
        attempt: u32,
        /// The per-attempt budget that was exceeded
        timeout: Duration,
    },

    /// The attempt loop ended without a terminal outcome
    ///
    /// Only produced by a zero-attempt policy, which
    /// [`validate`](crate::policy::RetryPolicy::validate) rejects.
    MaxAttemptsExceeded {
        /// Number of attempts that were allowed
        attempts: u32,
        /// The last error observed, if any attempt ran
        last_error: Option<E>,
    },
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Exhausted {
                attempts,
                source,
                total_duration,
            } => {
                write!(
                    f,
                    "retry exhausted after {} attempts over {:.2}s: {}",
                    attempts,
                    total_duration.as_secs_f64(),
                    source
                )
            }
            RetryError::NonRetryable { attempt, source } => {
                write!(f, "non-retryable error on attempt {}: {}", attempt, source)
            }
            RetryError::AttemptTimeout { attempt, timeout } => {
                write!(
                    f,
                    "attempt {} timed out after {}ms",
                    attempt,
                    timeout.as_millis()
                )
            }
            RetryError::MaxAttemptsExceeded {
                attempts,
                last_error,
            } => {
                if let Some(err) = last_error {
                    write!(f, "max attempts exceeded ({}): {}", attempts, err)
                } else {
                    write!(f, "max attempts exceeded ({})", attempts)
                }
            }
        }
    }
}

impl<E: Error + 'static> Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::NonRetryable { source, .. } => Some(source),
            RetryError::MaxAttemptsExceeded {
                last_error: Some(err),
                ..
            } => Some(err),
            _ => None,
        }
    }
}

impl<E> RetryError<E> {
    /// Create a new exhausted error
    pub fn exhausted(attempts: u32, source: E, total_duration: Duration) -> Self {
        RetryError::Exhausted {
            attempts,
            source,
            total_duration,
        }
    }

    /// Create a new non-retryable error
    pub fn non_retryable(attempt: u32, source: E) -> Self {
        RetryError::NonRetryable { attempt, source }
    }

    /// Create a new attempt timeout error
    pub fn attempt_timeout(attempt: u32, timeout: Duration) -> Self {
        RetryError::AttemptTimeout { attempt, timeout }
    }

    /// Create a new max-attempts-exceeded error
    pub fn max_attempts_exceeded(attempts: u32, last_error: Option<E>) -> Self {
        RetryError::MaxAttemptsExceeded {
            attempts,
            last_error,
        }
    }

    /// Number of attempts made before this error was produced
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::NonRetryable { attempt, .. } => *attempt,
            RetryError::AttemptTimeout { attempt, .. } => *attempt,
            RetryError::MaxAttemptsExceeded { attempts, .. } => *attempts,
        }
    }

    /// Check if this error indicates all retries were exhausted
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    /// Check if this error was a non-retryable classification
    pub fn is_non_retryable(&self) -> bool {
        matches!(self, RetryError::NonRetryable { .. })
    }

    /// Check if this error was a per-attempt timeout
    pub fn is_attempt_timeout(&self) -> bool {
        matches!(self, RetryError::AttemptTimeout { .. })
    }

    /// Get the underlying operation error, consuming this error
    pub fn into_source(self) -> Option<E> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::NonRetryable { source, .. } => Some(source),
            RetryError::MaxAttemptsExceeded { last_error, .. } => last_error,
            RetryError::AttemptTimeout { .. } => None,
        }
    }

    /// Get a reference to the underlying operation error
    pub fn source_ref(&self) -> Option<&E> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::NonRetryable { source, .. } => Some(source),
            RetryError::MaxAttemptsExceeded { last_error, .. } => last_error.as_ref(),
            RetryError::AttemptTimeout { .. } => None,
        }
    }

    /// Map the underlying error type using a closure
    pub fn map_err<F, E2>(self, f: F) -> RetryError<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            RetryError::Exhausted {
                attempts,
                source,
                total_duration,
            } => RetryError::Exhausted {
                attempts,
                source: f(source),
                total_duration,
            },
            RetryError::NonRetryable { attempt, source } => RetryError::NonRetryable {
                attempt,
                source: f(source),
            },
            RetryError::AttemptTimeout { attempt, timeout } => {
                RetryError::AttemptTimeout { attempt, timeout }
            }
            RetryError::MaxAttemptsExceeded {
                attempts,
                last_error,
            } => RetryError::MaxAttemptsExceeded {
                attempts,
                last_error: last_error.map(f),
            },
        }
    }
}

/// A future lost its race against a wall-clock deadline
///
/// Produced only by [`execute_with_timeout`](super::execute_with_timeout);
/// the wrapped operation's own errors pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{context} timed out after {}ms", .timeout.as_millis())]
pub struct TimeoutError {
    /// Free-text label identifying the operation, for diagnostics
    pub context: String,
    /// The deadline that was missed
    pub timeout: Duration,
}
