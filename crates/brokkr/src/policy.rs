//! Retry policy configuration
//!
//! [`RetryPolicy`] is plain data: it describes how many attempts an operation
//! gets and how the delay between attempts grows. Policies deserialize from
//! partial YAML/JSON documents, with every omitted field falling back to its
//! default, so callers can override only what they care about.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Retry policy for an operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one (must be >= 1)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Cap applied to every computed delay, in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Multiplicative growth factor between consecutive delays (must be >= 1.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Whether to randomize delays by up to ±25% to avoid retry storms
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: default_jitter(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}
fn default_initial_delay() -> u64 {
    1000
}
fn default_max_delay() -> u64 {
    10000
}
fn default_backoff_multiplier() -> f64 {
    2.0
}
fn default_jitter() -> bool {
    true
}

impl RetryPolicy {
    /// Create a policy with the default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of attempts
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the delay before the first retry
    pub const fn with_initial_delay_ms(mut self, delay_ms: u64) -> Self {
        self.initial_delay_ms = delay_ms;
        self
    }

    /// Set the delay cap
    pub const fn with_max_delay_ms(mut self, delay_ms: u64) -> Self {
        self.max_delay_ms = delay_ms;
        self
    }

    /// Set the backoff multiplier
    pub const fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Enable or disable jitter
    pub const fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before the first retry as a [`Duration`]
    pub const fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Delay cap as a [`Duration`]
    pub const fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Check the numeric constraints on this policy
    ///
    /// The retry executor treats a policy as trusted data and does not call
    /// this itself; callers accepting policies from configuration files
    /// should validate before use.
    pub fn validate(&self) -> Result<(), InvalidPolicyError> {
        if self.max_attempts == 0 {
            return Err(InvalidPolicyError::ZeroAttempts);
        }
        if self.max_delay_ms < self.initial_delay_ms {
            return Err(InvalidPolicyError::DelayCapBelowInitial {
                initial_delay_ms: self.initial_delay_ms,
                max_delay_ms: self.max_delay_ms,
            });
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(InvalidPolicyError::MultiplierBelowOne {
                multiplier: self.backoff_multiplier,
            });
        }
        Ok(())
    }
}

/// A policy that failed validation
#[derive(Debug, Error, PartialEq)]
pub enum InvalidPolicyError {
    /// max-attempts must allow at least one attempt
    #[error("max-attempts must be at least 1")]
    ZeroAttempts,

    /// The delay cap must not undercut the initial delay
    #[error("max-delay-ms ({max_delay_ms}) is below initial-delay-ms ({initial_delay_ms})")]
    DelayCapBelowInitial {
        initial_delay_ms: u64,
        max_delay_ms: u64,
    },

    /// The multiplier must not shrink delays
    #[error("backoff-multiplier ({multiplier}) must be a finite value >= 1.0")]
    MultiplierBelowOne { multiplier: f64 },
}
