//! Timeout and retry policy for capability calls
//!
//! Applied inside each HTTP client, so the pipeline above it still sees a
//! single call that either succeeds or fails.

use crate::agent::CapabilityError;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::warn;

/// How long to wait for one attempt and how often to try again
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub max_retries: usize,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt
    pub fn no_retry(timeout: Duration) -> Self {
        Self {
            timeout,
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }
}

/// Run `op` under `policy`, retrying only retryable errors
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, CapabilityError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CapabilityError>>,
{
    let mut attempt = 0usize;
    loop {
        attempt += 1;
        let result = match timeout(policy.timeout, op()).await {
            Ok(result) => result,
            Err(_) => Err(CapabilityError::Timeout(policy.timeout)),
        };

        match result {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt <= policy.max_retries => {
                let delay = policy.backoff * attempt as u32;
                warn!(
                    capability = label,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "capability call failed, retrying"
                );
                sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
