//! Backoff delay computation
//!
//! The delay ahead of retry `n` is `initial-delay × multiplier^(n-1)`, clamped
//! to the policy's cap, with optional symmetric jitter of up to ±25% applied
//! after clamping. Jitter never feeds back into the next computation; each
//! attempt derives its base delay purely from the attempt number.

use std::time::Duration;

use rand::Rng;

use crate::policy::RetryPolicy;

/// Calculate the delay before the next retry attempt
///
/// `attempt` is the 1-indexed attempt that just failed, so the delay after
/// the very first attempt uses exponent zero.
///
/// # Example
///
/// ```rust
/// use brokkr::policy::RetryPolicy;
/// use brokkr::retry::calculate_delay;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new()
///     .with_initial_delay_ms(1000)
///     .with_max_delay_ms(10000)
///     .with_backoff_multiplier(2.0)
///     .with_jitter(false);
///
/// assert_eq!(calculate_delay(&policy, 1), Duration::from_millis(1000));
/// assert_eq!(calculate_delay(&policy, 2), Duration::from_millis(2000));
/// // 1000 × 2^4 = 16000 → capped at 10000
/// assert_eq!(calculate_delay(&policy, 5), Duration::from_millis(10000));
/// ```
pub fn calculate_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
    let base_ms = policy.initial_delay_ms as f64 * policy.backoff_multiplier.powi(exponent);

    // Overflowing or non-finite intermediates clamp to the cap. The float
    // to integer cast saturates, so huge-but-finite values are safe too.
    let capped_ms = if base_ms.is_finite() && base_ms >= 0.0 {
        (base_ms as u64).min(policy.max_delay_ms)
    } else {
        policy.max_delay_ms
    };

    if policy.jitter && capped_ms > 0 {
        apply_jitter(capped_ms)
    } else {
        Duration::from_millis(capped_ms)
    }
}

/// Perturb a delay by up to ±25%, floored at zero and truncated to whole
/// milliseconds.
fn apply_jitter(delay_ms: u64) -> Duration {
    let spread = delay_ms as f64 * 0.25;
    let jitter = rand::rng().random_range(-spread..=spread);
    Duration::from_millis((delay_ms as f64 + jitter).max(0.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter_policy() -> RetryPolicy {
        RetryPolicy::new()
            .with_initial_delay_ms(1000)
            .with_max_delay_ms(10000)
            .with_backoff_multiplier(2.0)
            .with_jitter(false)
    }

    #[test]
    fn test_exponential_sequence_with_cap() {
        let policy = no_jitter_policy();

        let expected = [1000, 2000, 4000, 8000, 10000, 10000, 10000];
        for (i, want) in expected.iter().enumerate() {
            let attempt = i as u32 + 1;
            assert_eq!(
                calculate_delay(&policy, attempt),
                Duration::from_millis(*want),
                "attempt {}",
                attempt
            );
        }
    }

    #[test]
    fn test_multiplier_one_keeps_delay_constant() {
        let policy = no_jitter_policy().with_backoff_multiplier(1.0);

        for attempt in 1..=10 {
            assert_eq!(calculate_delay(&policy, attempt), Duration::from_millis(1000));
        }
    }

    #[test]
    fn test_custom_multiplier() {
        let policy = no_jitter_policy()
            .with_initial_delay_ms(100)
            .with_max_delay_ms(100000)
            .with_backoff_multiplier(3.0);

        assert_eq!(calculate_delay(&policy, 1), Duration::from_millis(100));
        assert_eq!(calculate_delay(&policy, 2), Duration::from_millis(300));
        assert_eq!(calculate_delay(&policy, 3), Duration::from_millis(900));
        assert_eq!(calculate_delay(&policy, 4), Duration::from_millis(2700));
    }

    #[test]
    fn test_zero_initial_delay_stays_zero() {
        let policy = no_jitter_policy().with_initial_delay_ms(0);

        for attempt in 1..=5 {
            assert_eq!(calculate_delay(&policy, attempt), Duration::ZERO);
        }
    }

    #[test]
    fn test_jitter_stays_within_symmetric_bounds() {
        let policy = no_jitter_policy().with_jitter(true);

        for _ in 0..1000 {
            let delay = calculate_delay(&policy, 1);
            assert!(delay >= Duration::from_millis(750), "delay {:?} below -25%", delay);
            assert!(delay <= Duration::from_millis(1250), "delay {:?} above +25%", delay);
        }
    }

    #[test]
    fn test_jitter_applies_after_cap() {
        let policy = no_jitter_policy()
            .with_initial_delay_ms(10000)
            .with_max_delay_ms(1000)
            .with_jitter(true);

        for _ in 0..100 {
            let delay = calculate_delay(&policy, 3);
            assert!(delay >= Duration::from_millis(750));
            assert!(delay <= Duration::from_millis(1250));
        }
    }

    #[test]
    fn test_jitter_skipped_for_zero_delay() {
        let policy = no_jitter_policy().with_initial_delay_ms(0).with_jitter(true);
        assert_eq!(calculate_delay(&policy, 1), Duration::ZERO);
    }

    #[test]
    fn test_huge_attempt_clamps_to_cap() {
        let policy = no_jitter_policy();
        assert_eq!(calculate_delay(&policy, 100), Duration::from_millis(10000));
        assert_eq!(calculate_delay(&policy, u32::MAX), Duration::from_millis(10000));
    }
}
