//! Backoff crate-based retries
//!
//! Exponential backoff with randomized intervals and an overall time budget.

use backoff::future::retry;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::time::Duration;

use crate::error::LlmError;

/// Exponential backoff tuned for DashScope: 1s initial interval doubling up to
/// 60s, giving up after 5 minutes.
pub fn dashscope_backoff() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(1000))
        .with_max_interval(Duration::from_secs(60))
        .with_multiplier(2.0)
        .with_max_elapsed_time(Some(Duration::from_secs(300)))
        .build()
}

/// Runs an operation under an `ExponentialBackoff`
#[derive(Debug, Clone)]
pub struct BackoffRetryExecutor {
    backoff: ExponentialBackoff,
}

impl Default for BackoffRetryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl BackoffRetryExecutor {
    pub fn new() -> Self {
        Self::with_backoff(dashscope_backoff())
    }

    pub fn with_backoff(backoff: ExponentialBackoff) -> Self {
        Self { backoff }
    }

    /// Execute `operation`; retryable errors are transient, the rest permanent.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, LlmError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, LlmError>>,
    {
        retry(self.backoff.clone(), || {
            let fut = operation();
            async move {
                fut.await.map_err(|error| {
                    if error.is_retryable() {
                        tracing::debug!(%error, "transient error, backing off");
                        backoff::Error::transient(error)
                    } else {
                        backoff::Error::permanent(error)
                    }
                })
            }
        })
        .await
    }
}

/// Retry with the default DashScope backoff.
pub async fn retry_with_backoff<F, Fut, T>(operation: F) -> Result<T, LlmError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, LlmError>>,
{
    BackoffRetryExecutor::new().execute(operation).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_executor() -> BackoffRetryExecutor {
        BackoffRetryExecutor::with_backoff(
            ExponentialBackoffBuilder::new()
                .with_initial_interval(Duration::from_millis(1))
                .with_max_interval(Duration::from_millis(5))
                .with_max_elapsed_time(Some(Duration::from_secs(2)))
                .build(),
        )
    }

    #[tokio::test]
    async fn transient_errors_are_retried() {
        let counter = Arc::new(AtomicU32::new(0));
        let result = fast_executor()
            .execute(|| {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(LlmError::RateLimitError("busy".into()))
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_stop_immediately() {
        let counter = Arc::new(AtomicU32::new(0));
        let result: Result<(), LlmError> = fast_executor()
            .execute(|| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(LlmError::AuthenticationError("bad key".into()))
                }
            })
            .await;
        assert!(matches!(result, Err(LlmError::AuthenticationError(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
