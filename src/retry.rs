//! Retry Logic with Exponential Backoff
//!
//! Wraps calls to the Epic and Discord APIs. Only errors that classify
//! themselves as retryable are attempted again.

use crate::error::{DiscordError, EpicError};
use std::fmt::Display;
use std::future::Future;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Errors that know whether another attempt can succeed
pub trait Retryable: Display {
    fn is_retryable(&self) -> bool;

    /// Delay requested by the server, overriding the backoff schedule
    fn retry_after_ms(&self) -> Option<u64> {
        None
    }
}

impl Retryable for EpicError {
    fn is_retryable(&self) -> bool {
        EpicError::is_retryable(self)
    }
}

impl Retryable for DiscordError {
    fn is_retryable(&self) -> bool {
        DiscordError::is_retryable(self)
    }

    fn retry_after_ms(&self) -> Option<u64> {
        DiscordError::retry_after_ms(self)
    }
}

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay between retries in milliseconds
    pub initial_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_delay_ms: u64,
    /// Backoff multiplier
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 10_000,
            backoff_factor: 2.0,
        }
    }
}

/// Execute an async closure with retry logic.
pub async fn with_retry<T, E, F, Fut>(config: &RetryConfig, operation_name: &str, mut f: F) -> Result<T, E>
where
    E: Retryable,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    let mut delay_ms = config.initial_delay_ms;

    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(err) => {
                attempt += 1;

                if !err.is_retryable() || attempt > config.max_retries {
                    if attempt > config.max_retries {
                        warn!("[Retry] {} failed after {} attempts: {}", operation_name, attempt, err);
                    }
                    return Err(err);
                }

                let wait_ms = err.retry_after_ms().unwrap_or(delay_ms).min(config.max_delay_ms);
                debug!(
                    "[Retry] {} attempt {}/{} failed ({}), retrying in {}ms",
                    operation_name, attempt, config.max_retries, err, wait_ms
                );

                sleep(Duration::from_millis(wait_ms)).await;

                delay_ms = ((delay_ms as f64 * config.backoff_factor) as u64).min(config.max_delay_ms);
            }
        }
    }
}
