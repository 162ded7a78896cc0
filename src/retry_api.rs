//! Unified retry facade
//!
//! Selects between the backoff executor (default) and the simple policy
//! executor. Clients hold an `Option<RetryOptions>`; `None` means one attempt.

use crate::error::LlmError;

pub use crate::retry::{BackoffRetryExecutor, RetryPolicy};

/// Retry backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryBackend {
    /// Backoff crate-based executor
    #[default]
    Backoff,
    /// Fixed-attempt policy executor
    Policy,
}

/// Unified retry options
#[derive(Debug, Clone, Default)]
pub struct RetryOptions {
    pub backend: RetryBackend,
    /// Backoff executor override (Backoff backend only)
    pub backoff_executor: Option<BackoffRetryExecutor>,
    /// Policy (Policy backend only)
    pub policy: Option<RetryPolicy>,
}

impl RetryOptions {
    /// Use default backoff backend
    pub fn backoff() -> Self {
        Self::default()
    }

    pub fn with_backoff_executor(mut self, executor: BackoffRetryExecutor) -> Self {
        self.backoff_executor = Some(executor);
        self
    }

    /// Use policy-based backend with default policy
    pub fn policy_default() -> Self {
        Self::policy(RetryPolicy::default())
    }

    pub fn policy(policy: RetryPolicy) -> Self {
        Self {
            backend: RetryBackend::Policy,
            policy: Some(policy),
            ..Default::default()
        }
    }

    /// Set max attempts for policy backend
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        if let Some(policy) = self.policy.take() {
            self.policy = Some(policy.with_max_attempts(attempts));
        }
        self
    }
}

/// Retry with explicit options
pub async fn retry_with<F, Fut, T>(operation: F, options: RetryOptions) -> Result<T, LlmError>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<T, LlmError>> + Send,
    T: Send,
{
    match options.backend {
        RetryBackend::Backoff => match options.backoff_executor.as_ref() {
            Some(executor) => executor.execute(operation).await,
            None => crate::retry::retry_with_backoff(operation).await,
        },
        RetryBackend::Policy => {
            let policy = options.policy.unwrap_or_default();
            crate::retry::RetryExecutor::new(policy)
                .execute(operation)
                .await
        }
    }
}

/// Retry only when options are provided.
pub async fn maybe_retry<F, Fut, T>(
    options: Option<RetryOptions>,
    operation: F,
) -> Result<T, LlmError>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<T, LlmError>> + Send,
    T: Send,
{
    match options {
        Some(opts) => retry_with(operation, opts).await,
        None => operation().await,
    }
}
