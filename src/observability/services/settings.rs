//! Tunables for queueing and export retries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// What happens when a trace arrives at a full export queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackpressurePolicy {
    /// Evict the oldest queued trace to make room.
    #[default]
    DropOldest,
    /// Refuse new traces while the queue is full.
    RejectNew,
    /// Wait up to the configured block timeout for room, then refuse.
    Block,
}

impl BackpressurePolicy {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DropOldest => "drop_oldest",
            Self::RejectNew => "reject_new",
            Self::Block => "block",
        }
    }
}

impl fmt::Display for BackpressurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for BackpressurePolicy {
    type Error = ParseBackpressurePolicyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "drop_oldest" => Ok(Self::DropOldest),
            "reject_new" => Ok(Self::RejectNew),
            "block" => Ok(Self::Block),
            _ => Err(ParseBackpressurePolicyError(value.to_owned())),
        }
    }
}

/// Error returned while parsing a backpressure policy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown backpressure policy '{0}', expected drop_oldest, reject_new or block")]
pub struct ParseBackpressurePolicyError(pub String);

/// Exponential backoff schedule for export attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `0` means a single attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound for any single delay.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Returns the delay before retry number `retry` (zero-based).
    ///
    /// Delays double from `initial_backoff` and saturate at `max_backoff`.
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2_u32.checked_pow(retry).unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .map_or(self.max_backoff, |delay| delay.min(self.max_backoff))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
        }
    }
}

/// Settings for a [`super::Tracer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracerSettings {
    /// Maximum number of closed traces waiting for export. At least 1.
    pub queue_capacity: usize,
    /// Policy applied when the queue is full.
    pub backpressure: BackpressurePolicy,
    /// How long the [`BackpressurePolicy::Block`] policy waits for room.
    pub block_timeout: Duration,
    /// Export retry schedule.
    pub retry: RetryPolicy,
}

impl TracerSettings {
    /// Returns a copy with the given queue capacity (minimum 1).
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Returns a copy with the given backpressure policy.
    #[must_use]
    pub const fn with_backpressure(mut self, policy: BackpressurePolicy) -> Self {
        self.backpressure = policy;
        self
    }

    /// Returns a copy with the given retry schedule.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for TracerSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            backpressure: BackpressurePolicy::DropOldest,
            block_timeout: Duration::from_millis(50),
            retry: RetryPolicy::default(),
        }
    }
}
