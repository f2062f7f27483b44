//! Retry manager with exponential backoff
//!
//! Bounded retry around calls to an unreliable model endpoint:
//! - Attempts: 1 initial call + `max_retries` retries
//! - Delay: binary exponential, capped, with ±25% jitter
//! - Exhaustion: `RetryExhausted` carrying the last error

use crate::errors::{EvalError, Result};
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Base delay for exponential backoff (500 ms)
const BASE_DELAY_MS: u64 = 500;

/// Maximum delay cap (8 seconds)
const MAX_DELAY_MS: u64 = 8000;

/// Retry manager with exponential backoff
#[derive(Debug, Clone)]
pub struct RetryManager {
    /// Retries after the first attempt
    max_retries: u32,

    /// Base delay in milliseconds
    base_delay_ms: u64,

    /// Maximum delay cap in milliseconds
    max_delay_ms: u64,

    /// Enable jitter
    enable_jitter: bool,
}

impl Default for RetryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryManager {
    /// Create new retry manager with default settings
    pub fn new() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: BASE_DELAY_MS,
            max_delay_ms: MAX_DELAY_MS,
            enable_jitter: true,
        }
    }

    /// Create retry manager with custom settings
    pub fn with_config(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            max_delay_ms: MAX_DELAY_MS,
            enable_jitter: true,
        }
    }

    /// Execute operation, retrying transient failures
    pub async fn execute_with_retry<F, Fut, T>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !Self::is_retryable(&e) {
                        return Err(e);
                    }

                    if attempt > self.max_retries {
                        return Err(EvalError::RetryExhausted {
                            attempts: attempt,
                            last: Box::new(e),
                        });
                    }

                    let delay = self.calculate_delay(attempt - 1);
                    warn!(attempt, error = %e, delay_ms = delay.as_millis() as u64, "attempt failed, retrying");
                    sleep(delay).await;
                }
            }
        }
    }

    /// Calculate delay before the retry following `attempt` failures
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponential_delay = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt));

        let delay_ms = exponential_delay.min(self.max_delay_ms);

        let final_delay = if self.enable_jitter && delay_ms > 0 {
            let jitter = (delay_ms / 4) as i64;
            let random_jitter = (rand::random::<f64>() * 2.0 - 1.0) * jitter as f64;
            ((delay_ms as i64) + random_jitter as i64).max(0) as u64
        } else {
            delay_ms
        };

        Duration::from_millis(final_delay)
    }

    /// Check if error is retryable
    pub fn is_retryable(error: &EvalError) -> bool {
        match error {
            // Transient
            EvalError::LlmApiError(_) => true,
            EvalError::MalformedJudgeOutput(_) => true,
            EvalError::HttpError(_) => true,
            EvalError::Timeout { .. } => true,
            EvalError::IndexError(_) => true,
            EvalError::SerializationError(_) => true,

            // Permanent
            EvalError::ConfigError(_) => false,
            EvalError::DatasetError(_) => false,
            EvalError::EmptyInput(_) => false,
            EvalError::RetryExhausted { .. } => false,

            _ => false,
        }
    }

}
