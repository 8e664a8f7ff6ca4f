//! Wall-clock timeout wrapper
//!
//! Races an arbitrary future against a deadline. Unlike the retry engine,
//! nothing here is ever re-invoked; the wrapper is a one-shot race.

use std::future::Future;
use std::time::Duration;

use super::error::TimeoutError;

/// Race `operation` against a wall-clock deadline
///
/// If the operation completes first, its output is returned untouched,
/// including its own failure, which stays distinct from [`TimeoutError`].
/// If the timer fires first, the operation's future is dropped, which
/// cancels it and releases whatever it held; the error's message embeds the
/// configured milliseconds and the `context` label.
///
/// A zero deadline fails immediately unless the operation is ready on its
/// first poll.
///
/// # Example
///
/// ```rust,no_run
/// use brokkr::retry::execute_with_timeout;
/// use std::time::Duration;
///
/// async fn example() -> Result<i32, Box<dyn std::error::Error>> {
///     let value = execute_with_timeout(
///         async { Ok::<_, std::io::Error>(42) },
///         Duration::from_secs(1),
///         "quick computation",
///     )
///     .await??;
///
///     Ok(value)
/// }
/// ```
pub async fn execute_with_timeout<Fut>(
    operation: Fut,
    timeout: Duration,
    context: impl Into<String>,
) -> Result<Fut::Output, TimeoutError>
where
    Fut: Future,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(outcome) => Ok(outcome),
        Err(_) => Err(TimeoutError {
            context: context.into(),
            timeout,
        }),
    }
}
