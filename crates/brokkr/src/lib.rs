//! # brokkr
//!
//! Policy-driven retry and timeout execution for async operations:
//! - Exponential backoff with a configurable multiplier, delay cap, and jitter
//! - Retryability classification via injected predicates
//! - Observable attempts via the `RetryObserver` trait
//! - Wall-clock timeout wrapper for arbitrary futures

pub mod policy;
pub mod retry;

pub use policy::{InvalidPolicyError, RetryPolicy};
pub use retry::{retry_with_policy, RetryError, TimeoutError};
