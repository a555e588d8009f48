//! Reconnect backoff
//!
//! Exponential with full jitter: each delay is drawn uniformly from
//! `0..=min(max, base * 2^attempt)`.

use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
    attempt: u32,
}

impl Backoff {
    #[must_use]
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self {
            base_ms,
            max_ms,
            attempt: 0,
        }
    }

    /// Upper bound of the next delay, before jitter
    #[must_use]
    pub fn ceiling(&self) -> Duration {
        let exp = self
            .base_ms
            .saturating_mul(1u64.checked_shl(self.attempt).unwrap_or(u64::MAX));
        Duration::from_millis(exp.min(self.max_ms))
    }

    /// Draw the next delay and advance
    pub fn next_delay(&mut self) -> Duration {
        let capped = self.ceiling().as_millis() as u64;
        let jittered = if capped == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=capped)
        };
        self.attempt = self.attempt.saturating_add(1);
        Duration::from_millis(jittered)
    }

    /// Start over after a connection reached ACTIVE
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}
