use serde::{Deserialize, Serialize};

/// Retry policy for transient delivery failures.
///
/// `backoff_multiplier == 1` gives a fixed delay, larger values grow it
/// exponentially up to `max_delay_ms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: u64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 5000,
            max_delay_ms: 60_000,
            backoff_multiplier: 1,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Retries happen immediately; used where timing does not matter.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay_ms: 0,
            max_delay_ms: 0,
            backoff_multiplier: 1,
            jitter: false,
        }
    }
}
