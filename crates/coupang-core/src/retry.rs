//! Caller-side retries for gateway operations.
//!
//! [`crate::GatewayClient`] never retries by itself. Callers that want retries
//! wrap an operation in [`retry_with_backoff`], which re-runs it only while
//! the error is [`ClientError::retryable`].

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed {
        /// Wait between attempts.
        delay: Duration,
    },
    /// `base * factor^attempt`, capped at `max`, optionally jittered by
    /// up to half the delay in either direction.
    Exponential {
        /// Delay before the first retry.
        base: Duration,
        /// Growth per attempt.
        factor: f64,
        /// Upper bound on any single delay.
        max: Duration,
        /// Spread delays randomly around the computed value.
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(250),
            factor: 2.0,
            max: Duration::from_secs(4),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let seconds = (base.as_secs_f64() * factor.powi(exponent)).min(max.as_secs_f64());
                let delay = Duration::from_secs_f64(seconds.max(0.0));
                if jitter {
                    jittered(delay)
                } else {
                    delay
                }
            }
        }
    }
}

fn jittered(delay: Duration) -> Duration {
    let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
    let spread = millis / 2;
    let offset = fastrand::u64(0..=spread.saturating_mul(2));
    Duration::from_millis((millis - spread).saturating_add(offset))
}

/// Retry budget and delay schedule for [`retry_with_backoff`].
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts are `max_retries + 1`.
    pub max_retries: u32,
    /// Delay schedule between attempts.
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Backoff::default(),
        }
    }
}

impl RetryConfig {
    /// Default exponential schedule with the given retry budget.
    pub fn exponential(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Constant `delay` between up to `max_retries` retries.
    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
        }
    }

    /// Single attempt, errors are returned as-is.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// the retry budget is spent. The last error is returned.
pub async fn retry_with_backoff<T, F, Fut>(
    config: &RetryConfig,
    mut operation: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if error.retryable() && attempt < config.max_retries => {
                let delay = config.delay_for_attempt(attempt);
                tracing::debug!(
                    attempt = attempt + 1,
                    max_retries = config.max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    code = error.code(),
                    "retrying gateway operation"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[test]
    fn exponential_backoff_doubles_until_cap() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(100),
            factor: 2.0,
            max: Duration::from_millis(500),
            jitter: false,
        };

        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(1), Duration::from_millis(200));
        assert_eq!(backoff.delay(2), Duration::from_millis(400));
        assert_eq!(backoff.delay(3), Duration::from_millis(500));
        assert_eq!(backoff.delay(40), Duration::from_millis(500));
    }

    #[test]
    fn jitter_stays_within_half_the_delay() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(200),
            factor: 2.0,
            max: Duration::from_secs(1),
            jitter: true,
        };
        for _ in 0..50 {
            let delay = backoff.delay(1).as_millis();
            assert!((200..=600).contains(&delay), "delay {delay} out of range");
        }
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let config = RetryConfig::fixed(Duration::from_millis(1), 3);

        let value = retry_with_backoff(&config, || async move {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 => Err(ClientError::timeout("deadline elapsed")),
                1 => Err(ClientError::Http {
                    status: 503,
                    body: String::new(),
                }),
                _ => Ok("ok"),
            }
        })
        .await
        .expect("third attempt succeeds");

        assert_eq!(value, "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_failures_are_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let config = RetryConfig::fixed(Duration::from_millis(1), 5);

        let error = retry_with_backoff(&config, || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(ClientError::Gateway {
                code: String::from("400"),
                message: String::from("invalid category"),
            })
        })
        .await
        .expect_err("gateway rejection");

        assert_eq!(error.code(), "client.gateway");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_budget_is_bounded() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let error = retry_with_backoff(&RetryConfig::fixed(Duration::ZERO, 2), || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(ClientError::transport("connection refused"))
        })
        .await
        .expect_err("always fails");

        assert!(error.retryable());
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        calls.store(0, Ordering::SeqCst);
        let _ = retry_with_backoff(&RetryConfig::no_retry(), || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(ClientError::transport("connection refused"))
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
