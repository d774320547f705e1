//! Retry gateway around agent invocations.
//!
//! Rate limits are the one transient failure worth waiting out: the gateway
//! retries them with exponential backoff and jitter, up to a fixed attempt
//! budget. Every other failure, including turn-limit exhaustion, propagates
//! immediately to the workflow controller.

use rand::Rng;
use std::time::Duration;
use tracing::{error, warn};

use crate::agent::{AgentCapability, AgentError, AgentOutput};

/// Backoff parameters for rate-limited invocations.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RetryPolicy {
    /// Attempts before the rate-limit error is surfaced to the caller.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub initial_delay: Duration,
    /// Factor applied to the delay after every failed attempt.
    pub multiplier: f64,
    /// Upper bound of the random jitter added to each delay.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(1500),
            multiplier: 2.0,
            jitter: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep after the given failed attempt (1-based).
    ///
    /// `jitter_frac` is the jitter sample in `[0, 1)`; split out so the
    /// schedule is testable without sleeping.
    pub fn delay_after(&self, attempt: u32, jitter_frac: f64) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::from_secs_f64(base + self.jitter.as_secs_f64() * jitter_frac)
    }
}

/// Invokes a capability, retrying on rate limits per `policy`.
///
/// Raises the original rate-limit error once the attempt budget is
/// exhausted; any other error propagates on the first occurrence.
pub(crate) async fn invoke_with_backoff(
    capability: &dyn AgentCapability,
    instruction: &str,
    max_turns: u32,
    policy: &RetryPolicy,
) -> Result<AgentOutput, AgentError> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match capability.invoke(instruction, max_turns).await {
            Ok(output) => return Ok(output),
            Err(err) if err.is_rate_limited() => {
                if attempt >= policy.max_attempts {
                    error!(
                        "Rate limit persisted after {} attempts invoking {}: {}",
                        attempt,
                        capability.name(),
                        err
                    );
                    return Err(err);
                }

                let snooze = policy.delay_after(attempt, rand::thread_rng().gen::<f64>());
                warn!(
                    "Rate limit hit invoking {} (attempt {}/{}). Sleeping {:.2}s before retrying.",
                    capability.name(),
                    attempt,
                    policy.max_attempts,
                    snooze.as_secs_f64()
                );
                tokio::time::sleep(snooze).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::mock::{MockCapability, MockResponse};

    #[test]
    fn test_delay_schedule_bounds() {
        let policy = RetryPolicy::default();

        // After failed attempt k the base delay is 1.5 * 2^(k-1) seconds,
        // and jitter adds at most 0.5 seconds on top.
        for attempt in 1..=4u32 {
            let base = 1.5 * 2f64.powi(attempt as i32 - 1);
            let low = policy.delay_after(attempt, 0.0);
            let high = policy.delay_after(attempt, 0.999_999);

            assert!((low.as_secs_f64() - base).abs() < 1e-9, "attempt {attempt}");
            assert!(high.as_secs_f64() < base + 0.5, "attempt {attempt}");
        }
    }

    #[test]
    fn test_delays_strictly_increasing() {
        let policy = RetryPolicy::default();
        let mut previous = Duration::ZERO;
        for attempt in 1..=4u32 {
            // Worst case for monotonicity: max jitter now, none later.
            let low_next = policy.delay_after(attempt + 1, 0.0);
            let high_now = policy.delay_after(attempt, 0.999_999);
            assert!(high_now > previous);
            assert!(low_next > high_now);
            previous = high_now;
        }
    }

    #[tokio::test]
    async fn test_success_needs_no_retry() {
        let mock = MockCapability::always_raw("planner", "ok");
        let policy = RetryPolicy::default();

        let output = invoke_with_backoff(&mock, "go", 8, &policy).await.unwrap();
        assert_eq!(output.as_text(), "ok");
        assert_eq!(mock.invocation_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_recovers_within_budget() {
        let mock = MockCapability::new(
            "planner",
            vec![
                MockResponse::RateLimited,
                MockResponse::RateLimited,
                MockResponse::Raw("recovered".to_string()),
            ],
        );
        let policy = RetryPolicy::default();

        let output = invoke_with_backoff(&mock, "go", 8, &policy).await.unwrap();
        assert_eq!(output.as_text(), "recovered");
        assert_eq!(mock.invocation_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhaustion_raises_original_error() {
        let mock = MockCapability::new("planner", vec![MockResponse::RateLimited]);
        let policy = RetryPolicy::default();

        let err = invoke_with_backoff(&mock, "go", 8, &policy)
            .await
            .unwrap_err();
        assert!(err.is_rate_limited());
        assert_eq!(mock.invocation_count(), 5);
    }

    #[tokio::test]
    async fn test_turn_limit_is_not_retried() {
        let mock = MockCapability::new("coder", vec![MockResponse::TurnLimit]);
        let policy = RetryPolicy::default();

        let err = invoke_with_backoff(&mock, "go", 24, &policy)
            .await
            .unwrap_err();
        assert!(err.is_turn_limit());
        assert_eq!(mock.invocation_count(), 1);
    }

    #[tokio::test]
    async fn test_other_failure_is_not_retried() {
        let mock = MockCapability::new(
            "qa",
            vec![MockResponse::Failed("boom".to_string())],
        );
        let policy = RetryPolicy::default();

        let err = invoke_with_backoff(&mock, "go", 8, &policy)
            .await
            .unwrap_err();
        assert!(!err.is_rate_limited());
        assert!(!err.is_turn_limit());
        assert_eq!(mock.invocation_count(), 1);
    }
}
