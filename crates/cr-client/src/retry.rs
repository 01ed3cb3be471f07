//! Bounded timeout plus a single fixed-delay retry for every network call.
//!
//! The three original verifier frontends each hard-coded slightly different
//! values; they are collapsed here into one policy struct that every client
//! shares.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::TransportError;

/// Timeout and retry configuration applied to each network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound on a single attempt.
    pub timeout: Duration,
    /// Fixed delay before the one retry.
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            timeout: Duration::from_secs(18),
            retry_delay: Duration::from_millis(1500),
        }
    }
}

impl RetryPolicy {
    /// Run `op` with the configured timeout; on a transient failure
    /// (timeout or network error), wait `retry_delay` and try exactly once
    /// more. Definitive failures such as `NotFound` are returned immediately.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, TransportError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        match self.attempt(&mut op).await {
            Ok(value) => Ok(value),
            Err(err) if err.is_transient() => {
                warn!(error = %err, "transient transport failure, retrying once");
                tokio::time::sleep(self.retry_delay).await;
                self.attempt(&mut op).await
            }
            Err(err) => Err(err),
        }
    }

    async fn attempt<T, F, Fut>(&self, op: &mut F) -> Result<T, TransportError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        match tokio::time::timeout(self.timeout, op()).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout),
        }
    }
}
