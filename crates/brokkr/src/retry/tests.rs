//! Integration tests for the retry module
//!
//! These verify the complete execution flow: backoff computation, predicate
//! classification, observer callbacks, timeout racing, and error surfacing.

use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::policy::RetryPolicy;
use crate::retry::backoff::calculate_delay;
use crate::retry::error::RetryError;
use crate::retry::executor::{retry_with_policy, RetryExecutorBuilder};
use crate::retry::observer::StatsObserver;
use crate::retry::predicate::ClosurePredicate;
use crate::retry::timeout::execute_with_timeout;

/// Policy with millisecond-scale delays so tests stay fast
fn quick_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new()
        .with_max_attempts(max_attempts)
        .with_initial_delay_ms(1)
        .with_max_delay_ms(10)
        .with_jitter(false)
}

// ============================================================================
// Delay schedule
// ============================================================================

#[test]
fn test_documented_delay_schedule() {
    // The defaults produce 1s, 2s, 4s, 8s, then the 10s cap
    let policy = RetryPolicy::default().with_jitter(false);

    assert_eq!(calculate_delay(&policy, 1), Duration::from_millis(1000));
    assert_eq!(calculate_delay(&policy, 2), Duration::from_millis(2000));
    assert_eq!(calculate_delay(&policy, 3), Duration::from_millis(4000));
    assert_eq!(calculate_delay(&policy, 4), Duration::from_millis(8000));
    assert_eq!(calculate_delay(&policy, 5), Duration::from_millis(10000));
    assert_eq!(calculate_delay(&policy, 6), Duration::from_millis(10000));
}

#[test]
fn test_jittered_schedule_brackets_the_exact_one() {
    let exact = RetryPolicy::default().with_jitter(false);
    let jittered = RetryPolicy::default();

    for attempt in 1..=6 {
        let base = calculate_delay(&exact, attempt);
        for _ in 0..50 {
            let delay = calculate_delay(&jittered, attempt);
            assert!(delay <= base.mul_f64(1.25), "attempt {}: {:?} too high", attempt, delay);
            assert!(delay >= base.mul_f64(0.75), "attempt {}: {:?} too low", attempt, delay);
        }
    }
}

// ============================================================================
// Attempt accounting
// ============================================================================

#[tokio::test]
async fn test_success_on_first_attempt_calls_once() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();

    let result = retry_with_policy(&quick_policy(5), "first-try", || {
        let calls = calls_clone.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, io::Error>(41 + 1)
        }
    })
    .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_n_minus_one_failures_then_success() {
    for n in 1..=4u32 {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result = retry_with_policy(&quick_policy(4), "eventually", || {
            let calls = calls_clone.clone();
            async move {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if call < n {
                    Err(io::Error::new(io::ErrorKind::TimedOut, "transient"))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done", "n = {}", n);
        assert_eq!(calls.load(Ordering::SeqCst), n, "n = {}", n);
    }
}

#[tokio::test]
async fn test_persistent_failure_uses_whole_budget() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();

    let result: Result<(), _> = retry_with_policy(&quick_policy(4), "doomed", || {
        let calls = calls_clone.clone();
        async move {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Err::<(), _>(io::Error::other(format!("failure #{}", call)))
        }
    })
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    let err = result.unwrap_err();
    assert!(err.is_exhausted());
    // The surfaced error is the one from the final attempt, verbatim
    assert_eq!(err.source_ref().unwrap().to_string(), "failure #4");
}

#[tokio::test]
async fn test_non_retryable_ignores_remaining_budget() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();

    let predicate =
        ClosurePredicate::new(|err: &io::Error| err.kind() != io::ErrorKind::InvalidInput);

    let result: Result<(), RetryError<io::Error>> = RetryExecutorBuilder::new()
        .with_policy(quick_policy(10))
        .with_predicate(predicate)
        .build()
        .execute(|| {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(io::Error::new(io::ErrorKind::InvalidInput, "bad request"))
            }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let err = result.unwrap_err();
    assert!(err.is_non_retryable());
    assert_eq!(err.source_ref().unwrap().to_string(), "bad request");
}

// ============================================================================
// Diagnostics
// ============================================================================

#[tokio::test]
async fn test_fail_twice_then_ok_emits_two_retry_warnings() {
    let observer = Arc::new(StatsObserver::new());
    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();

    let policy = RetryPolicy::new()
        .with_max_attempts(3)
        .with_initial_delay_ms(1)
        .with_jitter(false);

    let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
        .with_policy(policy)
        .with_observer(observer.clone())
        .build()
        .execute(|| {
            let calls = calls_clone.clone();
            async move {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if call <= 2 {
                    Err(io::Error::new(io::ErrorKind::TimedOut, "transient"))
                } else {
                    Ok("ok")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(observer.failures(), 2);
    assert_eq!(observer.successes(), 1);
    assert_eq!(observer.exhaustions(), 0);
}

// ============================================================================
// Timeout wrapper
// ============================================================================

#[tokio::test]
async fn test_timeout_returns_result_when_operation_is_faster() {
    let outcome = execute_with_timeout(
        async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok::<_, io::Error>("beat the clock")
        },
        Duration::from_secs(5),
        "winner",
    )
    .await;

    assert_eq!(outcome.unwrap().unwrap(), "beat the clock");
}

#[tokio::test]
async fn test_timeout_message_embeds_duration_and_context() {
    let outcome = execute_with_timeout(
        async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            "never seen"
        },
        Duration::from_millis(25),
        "model request",
    )
    .await;

    let message = outcome.unwrap_err().to_string();
    assert!(
        message.contains("timed out after 25ms"),
        "unexpected message: {}",
        message
    );
    assert!(
        message.contains("model request"),
        "unexpected message: {}",
        message
    );
}

// ============================================================================
// Composition
// ============================================================================

#[tokio::test]
async fn test_retry_inside_timeout_budget() {
    // A whole retry sequence can itself be raced against a deadline
    let policy = quick_policy(3);

    let outcome = execute_with_timeout(
        retry_with_policy(&policy, "composed", || async {
            Ok::<_, io::Error>("layered")
        }),
        Duration::from_secs(5),
        "retry sequence",
    )
    .await;

    assert_eq!(outcome.unwrap().unwrap(), "layered");
}
