//! Retry loop: run a closure until success or policy says stop.

use std::time::Duration;

use super::classify;
use super::error::ApiError;
use super::policy::{ErrorKind, RetryDecision, RetryPolicy};

/// Runs an API call until it succeeds or the retry policy says to stop.
/// On a rate-limited failure, sleeps for the backoff duration then tries again.
/// Blocks the current thread; call from `spawn_blocking` if used from async code.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, f: F) -> Result<T, ApiError>
where
    F: FnMut() -> Result<T, ApiError>,
{
    run_with_retry_using(policy, classify::classify, std::thread::sleep, f)
}

/// Transport-independent form of [`run_with_retry`]: the caller supplies the
/// error classifier and the sleep function.
///
/// Returns the last error once the policy refuses another attempt.
pub fn run_with_retry_using<T, E, F, C, S>(
    policy: &RetryPolicy,
    classify: C,
    mut sleep: S,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    C: Fn(&E) -> ErrorKind,
    S: FnMut(Duration),
    E: std::fmt::Display,
{
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => match policy.decide(attempt, classify(&e)) {
                RetryDecision::NoRetry => return Err(e),
                RetryDecision::RetryAfter(d) => {
                    tracing::warn!(
                        attempt,
                        delay_ms = d.as_millis() as u64,
                        "rate limited, retrying: {}",
                        e
                    );
                    sleep(d);
                    attempt += 1;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
        }
    }

    fn rate_limited() -> ApiError {
        ApiError::Http {
            status: 429,
            body: "slow down".to_string(),
        }
    }

    #[test]
    fn succeeds_after_one_retry_with_base_delay() {
        let mut calls = 0;
        let mut sleeps = Vec::new();
        let out = run_with_retry_using(
            &policy(),
            classify::classify,
            |d| sleeps.push(d),
            || {
                calls += 1;
                if calls == 1 {
                    Err(rate_limited())
                } else {
                    Ok("image")
                }
            },
        );
        assert_eq!(out.unwrap(), "image");
        assert_eq!(calls, 2);
        assert_eq!(sleeps.len(), 1);
        assert!(sleeps[0] >= policy().base_delay);
    }

    #[test]
    fn exhausting_attempts_returns_last_error() {
        let mut calls = 0;
        let mut sleeps = Vec::new();
        let out: Result<(), ApiError> = run_with_retry_using(
            &policy(),
            classify::classify,
            |d| sleeps.push(d),
            || {
                calls += 1;
                Err(ApiError::Http {
                    status: 429,
                    body: format!("attempt {calls}"),
                })
            },
        );
        let err = out.unwrap_err();
        assert_eq!(calls, 4);
        assert_eq!(
            sleeps,
            vec![
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8)
            ]
        );
        match err {
            ApiError::Http { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "attempt 4");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_retryable_error_propagates_immediately() {
        let mut calls = 0;
        let mut slept = false;
        let out: Result<(), ApiError> = run_with_retry_using(
            &policy(),
            classify::classify,
            |_| slept = true,
            || {
                calls += 1;
                Err(ApiError::Http {
                    status: 400,
                    body: "invalid argument".to_string(),
                })
            },
        );
        assert!(out.is_err());
        assert_eq!(calls, 1);
        assert!(!slept);
    }

    #[test]
    fn custom_classifier_decides_retryability() {
        let mut calls = 0;
        let out: Result<u32, String> = run_with_retry_using(
            &policy(),
            |e: &String| {
                if e == "busy" {
                    ErrorKind::RateLimited
                } else {
                    ErrorKind::Other
                }
            },
            |_| {},
            || {
                calls += 1;
                match calls {
                    1 | 2 => Err("busy".to_string()),
                    _ => Ok(calls),
                }
            },
        );
        assert_eq!(out.unwrap(), 3);
    }
}
