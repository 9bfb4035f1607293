//! Cooldown status reporting.

use serde::{Deserialize, Serialize};

/// Snapshot of the rate-limit cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RateLimitStatus {
    /// Whether outbound requests are currently suppressed.
    pub is_limited: bool,
    /// Whole minutes until the cooldown ends, rounded up. Zero when not limited.
    pub minutes_remaining: u64,
}

impl RateLimitStatus {
    /// Status for a cooldown with `remaining_ms` milliseconds left.
    pub fn from_remaining_ms(remaining_ms: u64) -> Self {
        if remaining_ms == 0 {
            return Self::default();
        }
        Self {
            is_limited: true,
            minutes_remaining: remaining_ms.div_ceil(60_000),
        }
    }
}
