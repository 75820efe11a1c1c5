//! Retry Mechanism Module
//!
//! Bounded exponential backoff for provider calls.
//!
//! `max_attempts` counts total attempts, so the default policy (5 attempts,
//! 1s initial delay, x2 multiplier) sleeps at most four times:
//! 1000, 2000, 4000 and 8000 ms. There is no delay after the final attempt.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::LlmError;
use crate::utils::cancel::CancelHandle;

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Backoff multiplier (for exponential backoff)
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays
    pub use_jitter: bool,
    /// Maximum jitter percentage (0.0 to 1.0)
    pub jitter_factor: f64,
    /// Custom retry condition function
    pub retry_condition: Option<fn(&LlmError) -> bool>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            use_jitter: false,
            jitter_factor: 0.1,
            retry_condition: None,
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Single attempt, never retry.
    pub fn none() -> Self {
        Self::default().with_max_attempts(1)
    }

    /// Set maximum attempts (clamped to at least one)
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = if max_attempts == 0 { 1 } else { max_attempts };
        self
    }

    /// Set initial delay
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set maximum delay
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set backoff multiplier
    pub const fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Enable or disable jitter
    pub const fn with_jitter(mut self, use_jitter: bool) -> Self {
        self.use_jitter = use_jitter;
        self
    }

    /// Set jitter factor
    pub fn with_jitter_factor(mut self, factor: f64) -> Self {
        self.jitter_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Set custom retry condition
    pub fn with_retry_condition(mut self, condition: fn(&LlmError) -> bool) -> Self {
        self.retry_condition = Some(condition);
        self
    }

    /// Check if an error should be retried
    pub fn should_retry(&self, error: &LlmError) -> bool {
        if let Some(condition) = self.retry_condition {
            condition(error)
        } else {
            error.is_retryable()
        }
    }

    /// Delay after the `failures`-th failure (0-based): `initial * multiplier^failures`.
    pub fn calculate_delay(&self, failures: u32) -> Duration {
        let exponent = i32::try_from(failures).unwrap_or(i32::MAX);
        let base_delay =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let capped = base_delay.min(self.max_delay.as_millis() as f64).max(0.0);

        let delay = Duration::from_millis(capped as u64);

        if self.use_jitter {
            self.add_jitter(delay)
        } else {
            delay
        }
    }

    /// Add jitter to a delay
    fn add_jitter(&self, delay: Duration) -> Duration {
        let jitter_range = delay.as_millis() as f64 * self.jitter_factor;
        if jitter_range <= 0.0 {
            return delay;
        }
        let mut rng = rand::thread_rng();
        let jitter = rng.gen_range(-jitter_range..=jitter_range);

        let new_delay = delay.as_millis() as f64 + jitter;
        Duration::from_millis(new_delay.max(0.0) as u64)
    }
}

/// Retry executor that handles the actual retry logic.
///
/// Attempt counting is local to each `execute*` call; one executor can serve
/// any number of concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    /// Create a new retry executor
    pub const fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute a function with retry logic
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        self.run(operation, None, |_, _, _| true).await
    }

    /// Execute with retry logic; `cancel` aborts both the in-flight attempt and
    /// any pending backoff delay with `LlmError::Cancelled`.
    pub async fn execute_cancellable<F, Fut, T>(
        &self,
        operation: F,
        cancel: &CancelHandle,
    ) -> Result<T, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        self.run(operation, Some(cancel), |_, _, _| true).await
    }

    /// Execute with a handler invoked before every backoff delay with the
    /// failure, the 1-based attempt that failed and the delay about to be
    /// slept. Returning `false` stops retrying and surfaces the failure as is.
    pub async fn execute_with_handler<F, Fut, T, H>(
        &self,
        operation: F,
        cancel: Option<&CancelHandle>,
        handler: H,
    ) -> Result<T, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
        H: FnMut(&LlmError, u32, Duration) -> bool,
    {
        self.run(operation, cancel, handler).await
    }

    async fn run<F, Fut, T, H>(
        &self,
        mut operation: F,
        cancel: Option<&CancelHandle>,
        mut handler: H,
    ) -> Result<T, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
        H: FnMut(&LlmError, u32, Duration) -> bool,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            if cancel.is_some_and(CancelHandle::is_cancelled) {
                return Err(LlmError::Cancelled);
            }

            let outcome = match cancel {
                Some(token) => tokio::select! {
                    biased;
                    () = token.cancelled() => return Err(LlmError::Cancelled),
                    result = operation() => result,
                },
                None => operation().await,
            };

            let error = match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!(target: "medigen::retry", attempt, "succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if !self.policy.should_retry(&error) {
                tracing::debug!(target: "medigen::retry", attempt, err = %error, "permanent failure, not retrying");
                return Err(error);
            }

            if attempt >= max_attempts {
                tracing::warn!(target: "medigen::retry", attempt, err = %error, "retry budget exhausted");
                return Err(LlmError::retries_exhausted(attempt, error));
            }

            let delay = self.policy.calculate_delay(attempt - 1);
            if !handler(&error, attempt, delay) {
                return Err(error);
            }
            tracing::warn!(
                target: "medigen::retry",
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                err = %error,
                "transient failure, backing off"
            );

            match cancel {
                Some(token) => tokio::select! {
                    biased;
                    () = token.cancelled() => return Err(LlmError::Cancelled),
                    () = sleep(delay) => {}
                },
                None => sleep(delay).await,
            }
        }
    }
}
