use std::thread;
use std::time::Duration;

use crate::transcription::domain::api_error::ApiError;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Bounded retry with exponential back-off for retriable API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO, Duration::ZERO)
    }

    /// Back-off before retry number `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(retry))
            .min(self.max_delay)
    }

    /// Runs `op`, retrying retriable failures up to `max_retries` times.
    pub fn run<T>(
        &self,
        label: &str,
        mut op: impl FnMut() -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut retry = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retriable() && retry < self.max_retries => {
                    let delay = self.delay_for(retry);
                    log::warn!(
                        "{label} failed ({e}), retry {}/{} in {}ms",
                        retry + 1,
                        self.max_retries,
                        delay.as_millis()
                    );
                    thread::sleep(delay);
                    retry += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY)
    }
}
