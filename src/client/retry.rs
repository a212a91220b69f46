//! Retry with linear backoff.
//!
//! Transient failures (timeouts, connection failures, 5xx responses,
//! interrupted transfers) are reattempted after
//! `initial_delay + backoff_factor * attempt`, capped at `max_delay`.
//! Anything else propagates on the first failure.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use super::SwcError;
use crate::config::SwcConfig;

/// Retry behaviour derived from [`SwcConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub enabled: bool,
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub backoff_factor: Duration,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            max_retries: 0,
            backoff_factor: Duration::ZERO,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    pub fn from_config(config: &SwcConfig) -> Self {
        Self {
            enabled: config.retry_enabled,
            max_retries: config.max_retries,
            backoff_factor: config.backoff_factor,
            initial_delay: config.initial_delay,
            max_delay: config.backoff_max_time,
        }
    }

    /// Total attempts this policy allows, including the first.
    pub fn max_attempts(&self) -> u32 {
        if self.enabled {
            self.max_retries.saturating_add(1)
        } else {
            1
        }
    }

    /// Wait before retrying after failed attempt number `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self
            .initial_delay
            .saturating_add(self.backoff_factor.saturating_mul(attempt));
        delay.min(self.max_delay)
    }

    /// Run `call` until it succeeds, fails permanently, or the attempts run out.
    ///
    /// With retry disabled the first error is returned unchanged. With retry
    /// enabled a persistent transient failure ends in
    /// [`SwcError::RetriesExhausted`] wrapping the last failure.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, SwcError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SwcError>>,
    {
        if !self.enabled {
            return call().await;
        }

        let max_attempts = self.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let err = match call().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            if attempt >= max_attempts {
                tracing::error!(
                    "{} failed after {} attempts: {}",
                    operation,
                    attempt,
                    err
                );
                return Err(SwcError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = self.delay_for_attempt(attempt);
            tracing::warn!(
                "{} failed (attempt {}/{}): {}; retrying in {:?}",
                operation,
                attempt,
                max_attempts,
                err,
                delay
            );
            sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn transient() -> SwcError {
        SwcError::Transient {
            operation: "GET /".to_string(),
            status: Some(503),
            reason: "service unavailable".to_string(),
        }
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            enabled: true,
            max_retries,
            backoff_factor: Duration::from_millis(1),
            initial_delay: Duration::ZERO,
            max_delay: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_delay_is_linear_in_attempt() {
        let policy = RetryPolicy {
            backoff_factor: Duration::from_millis(500),
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            ..fast_policy(3)
        };
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(600));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(1100));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(1600));
    }

    #[test]
    fn test_delay_capped_at_max() {
        let policy = RetryPolicy {
            backoff_factor: Duration::from_secs(10),
            max_delay: Duration::from_secs(15),
            ..fast_policy(5)
        };
        assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(15));
    }

    #[test]
    fn test_max_attempts() {
        assert_eq!(fast_policy(3).max_attempts(), 4);
        assert_eq!(RetryPolicy::disabled().max_attempts(), 1);
        let disabled = RetryPolicy {
            enabled: false,
            ..fast_policy(3)
        };
        assert_eq!(disabled.max_attempts(), 1);
    }

    #[tokio::test]
    async fn test_persistent_transient_failure_exhausts_retries() {
        let calls = Cell::new(0);
        let result: Result<(), _> = fast_policy(3)
            .run("GET /", || {
                calls.set(calls.get() + 1);
                async { Err(transient()) }
            })
            .await;

        assert_eq!(calls.get(), 4);
        match result {
            Err(SwcError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 4);
                assert!(matches!(*last, SwcError::Transient { .. }));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_disabled_policy_propagates_first_error() {
        let calls = Cell::new(0);
        let result: Result<(), _> = RetryPolicy::disabled()
            .run("GET /", || {
                calls.set(calls.get() + 1);
                async { Err(transient()) }
            })
            .await;

        assert_eq!(calls.get(), 1);
        assert!(matches!(result, Err(SwcError::Transient { .. })));
    }

    #[tokio::test]
    async fn test_permanent_failure_not_retried() {
        let calls = Cell::new(0);
        let result: Result<(), _> = fast_policy(3)
            .run("GET /v0/leagues/9", || {
                calls.set(calls.get() + 1);
                async {
                    Err(SwcError::NotFound {
                        resource: "leagues".to_string(),
                        id: "9".to_string(),
                    })
                }
            })
            .await;

        assert_eq!(calls.get(), 1);
        assert!(matches!(result, Err(SwcError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let calls = Cell::new(0);
        let result = fast_policy(2)
            .run("GET /", || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    if n < 2 {
                        Err(transient())
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.get(), 2);
    }
}
