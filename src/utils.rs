use std::time::Duration;

use tracing::debug;

use crate::models::retry::RetryConfig;

/// Delay before the `attempt`-th retry (1-based).
///
/// `initial_delay_ms * backoff_multiplier^(attempt - 1)`, capped at
/// `max_delay_ms`, with ±10% jitter when enabled.
pub fn retry_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1);
    let growth = config.backoff_multiplier.max(1).saturating_pow(exponent);
    let base_ms = config.initial_delay_ms.saturating_mul(growth);
    let delay_ms = std::cmp::min(base_ms, config.max_delay_ms.max(config.initial_delay_ms));

    if !config.jitter || delay_ms == 0 {
        return Duration::from_millis(delay_ms);
    }

    let jitter = rand::random_range(-0.1..=0.1);
    let jittered_delay = (delay_ms as f64 * (1.0 + jitter)) as u64;

    debug!(attempt, delay_ms, jittered_delay, "Computed retry delay");

    Duration::from_millis(jittered_delay)
}
