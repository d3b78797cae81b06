//! Bounded timeout and retry for store calls

use std::future::Future;
use std::time::Duration;

use super::StoreError;

/// Per-call timeout and retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Limit for a single attempt
    pub timeout: Duration,
    /// Extra attempts after a transient failure
    pub retries: u32,
    /// Pause before a retry
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            retries: 1,
            backoff: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// Run an idempotent `attempt` under the policy. Only transient errors are retried.
    pub async fn run<T, F, Fut>(&self, op: &'static str, mut attempt: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        self.run_numbered(op, StoreError::is_transient, |_| attempt()).await
    }

    /// Run a write that must not be applied twice.
    ///
    /// A timed-out or disconnected attempt may already have committed, so
    /// only failures raised before the statement was sent are retried.
    pub async fn run_unrepeatable<T, F, Fut>(&self, op: &'static str, mut attempt: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        self.run_numbered(op, StoreError::is_unsent, |_| attempt()).await
    }

    /// Run `attempt` with its 1-based attempt number, retrying errors accepted by `retryable`.
    ///
    /// Attempts after the first can use the number to recognise a replay of
    /// an earlier attempt that committed before it timed out.
    pub async fn run_numbered<T, F, Fut>(
        &self,
        op: &'static str,
        retryable: fn(&StoreError) -> bool,
        mut attempt: F,
    ) -> Result<T, StoreError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut tries = 0u32;
        loop {
            tries += 1;
            let result = match tokio::time::timeout(self.timeout, attempt(tries)).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Timeout {
                    op,
                    timeout: self.timeout,
                }),
            };

            match result {
                Err(e) if retryable(&e) && tries <= self.retries => {
                    tracing::warn!(op, attempt = tries, error = %e, "transient store failure, retrying");
                    tokio::time::sleep(self.backoff).await;
                }
                other => return other,
            }
        }
    }
}
