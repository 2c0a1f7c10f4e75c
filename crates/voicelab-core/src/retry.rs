//! Retry-with-backoff for upstream calls.
//!
//! The decision table is explicit: transient errors (quota, rate limits,
//! timeouts, blank replies) retry with exponential backoff plus jitter up
//! to `max_attempts`; everything else fails immediately. Callers that must
//! survive regardless degrade to sentinel scores after the final attempt.

use async_trait::async_trait;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Transient,
    Fatal,
}

/// Classify an upstream failure from its message.
///
/// The chat providers fold the HTTP status into the error text
/// (`status 402`, `status 429`), so string matching is the seam here, same
/// as matching on the SDK exception text would be.
pub fn classify(err: &anyhow::Error) -> ErrorClass {
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();
    let transient = msg.contains("status 402")
        || msg.contains("status 429")
        || msg.contains("status 503")
        || lower.contains("insufficient credits")
        || lower.contains("quota")
        || lower.contains("rate limit")
        || lower.contains("empty response")
        || lower.contains("timed out")
        || lower.contains("timeout");
    if transient {
        ErrorClass::Transient
    } else {
        ErrorClass::Fatal
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Upper bound of the uniform jitter added to each backoff.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before retrying after failed attempt number `attempt` (0-based):
    /// `base * 2^attempt + uniform(0, jitter)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.saturating_mul(1u32 << attempt.min(16));
        let jitter_ms = if self.jitter.is_zero() {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.jitter.as_millis() as u64)
        };
        exp + Duration::from_millis(jitter_ms)
    }
}

/// Seam for delays so tests can substitute a recording no-op.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, d: Duration);
}

pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, d: Duration) {
        tokio::time::sleep(d).await;
    }
}

/// No-op pacer for offline providers and tests.
pub struct NoopPacer;

#[async_trait]
impl Pacer for NoopPacer {
    async fn pause(&self, _d: Duration) {}
}

/// Run `op`, retrying transient failures per the policy. Returns the first
/// success, the first fatal error, or the last transient error once
/// attempts are exhausted.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    pacer: &dyn Pacer,
    mut op: F,
) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut last_err = None;
    for attempt in 0..attempts {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                if classify(&e) == ErrorClass::Fatal {
                    return Err(e);
                }
                tracing::warn!(
                    attempt = attempt + 1,
                    max = attempts,
                    error = %e,
                    "transient upstream error"
                );
                last_err = Some(e);
                if attempt + 1 < attempts {
                    pacer.pause(policy.backoff(attempt)).await;
                }
            }
        }
    }
    Err(last_err.expect("at least one attempt"))
}
