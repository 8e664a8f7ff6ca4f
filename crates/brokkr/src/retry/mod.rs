//! Retry execution engine with policy-based configuration
//!
//! This module wraps arbitrary async operations in an exponential-backoff
//! retry loop and, separately, in a wall-clock timeout race.
//!
//! # Features
//!
//! - Exponential backoff with a delay cap and optional ±25% jitter
//! - Retryability classification via the [`RetryPredicate`] trait
//! - Observable retry attempts via the [`RetryObserver`] trait
//! - Built-in [`TracingObserver`] for logging
//! - Builder pattern for flexible executor configuration
//! - Optional per-attempt timeout budget
//! - [`execute_with_timeout`] for racing a future against a deadline
//!
//! # Example
//!
//! ```rust,no_run
//! use brokkr::policy::RetryPolicy;
//! use brokkr::retry::{retry_with_policy, RetryError};
//!
//! async fn example() -> Result<String, RetryError<std::io::Error>> {
//!     let policy = RetryPolicy::default();
//!
//!     retry_with_policy(&policy, "fetch-release", || async {
//!         // Your fallible operation here
//!         Ok("success".to_string())
//!     })
//!     .await
//! }
//! ```

mod backoff;
mod error;
mod executor;
mod observer;
mod predicate;
mod timeout;

pub use backoff::calculate_delay;
pub use error::{RetryError, TimeoutError};
pub use executor::{retry_with_policy, RetryExecutor, RetryExecutorBuilder};
pub use observer::{NoOpObserver, RetryObserver, StatsObserver, TracingObserver};
pub use predicate::{
    AlwaysRetry, ClosurePredicate, HttpStatusError, HttpStatusPredicate, MessagePredicate,
    NeverRetry, RetryPredicate,
};
pub use timeout::execute_with_timeout;

#[cfg(test)]
mod tests;
