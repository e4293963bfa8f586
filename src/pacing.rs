//! Request pacing with randomized delays
//!
//! Human-cadence jitter between requests and exponential backoff between
//! retry attempts. Correctness never depends on these delays; they exist to
//! keep the traffic pattern from looking mechanical.

use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::debug;

/// Jitter added on top of each backoff interval, in milliseconds.
const BACKOFF_JITTER_MS: std::ops::RangeInclusive<u64> = 1000..=3000;

/// Cap on the backoff exponent; 2^5 = 32s is already far beyond the default
/// retry bound.
const MAX_BACKOFF_EXP: u32 = 5;

/// Sleep a uniformly random duration between `min_secs` and `max_secs`.
pub async fn jitter_delay(min_secs: u64, max_secs: u64) {
    jitter_delay_ms(min_secs * 1000, max_secs * 1000).await;
}

/// Sleep a uniformly random duration between `min_ms` and `max_ms`.
pub async fn jitter_delay_ms(min_ms: u64, max_ms: u64) {
    let delay = rand::thread_rng().gen_range(min_ms..=max_ms);
    debug!("Pacing delay {}ms", delay);
    sleep(Duration::from_millis(delay)).await;
}

/// Backoff interval for the given zero-based attempt number:
/// `2^attempt` seconds plus 1-3s of random jitter.
pub fn backoff_duration(attempt: u32) -> Duration {
    let base = Duration::from_secs(1u64 << attempt.min(MAX_BACKOFF_EXP));
    let jitter = Duration::from_millis(rand::thread_rng().gen_range(BACKOFF_JITTER_MS));
    base + jitter
}

/// Sleep the backoff interval for the given attempt.
pub async fn backoff_with_jitter(attempt: u32) {
    let delay = backoff_duration(attempt);
    debug!("Backoff delay {}ms (attempt {})", delay.as_millis(), attempt);
    sleep(delay).await;
}
