//! Rate-limit cooldown with lazy expiry.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{info, warn};

use crate::clock::Clock;
use crate::storage::{KeyValueStore, RATE_LIMIT_KEY};

/// How long outbound requests stay suppressed after a 429: one hour.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(3600);

/// Cooldown deadline persisted under [`RATE_LIMIT_KEY`].
pub struct Cooldown {
    until: Mutex<Option<u64>>,
    duration: Duration,
    clock: Arc<dyn Clock>,
    store: Arc<dyn KeyValueStore>,
}

impl Cooldown {
    /// Load the persisted deadline, discarding it if it already elapsed.
    pub fn load(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        duration: Duration,
    ) -> Self {
        let until = match store.get(RATE_LIMIT_KEY) {
            Ok(Some(raw)) => {
                let parsed = parse_deadline(&raw);
                if parsed.is_none() {
                    warn!(value = %raw, "unreadable persisted cooldown, ignoring");
                }
                parsed
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "failed to read persisted cooldown");
                None
            }
        };
        let cooldown = Self {
            until: Mutex::new(until),
            duration,
            clock,
            store,
        };
        // Drops an elapsed (or unreadable) deadline from the store as well.
        if cooldown.remaining_ms() == 0 {
            cooldown.forget();
        }
        cooldown
    }

    /// Milliseconds until the cooldown ends; zero when inactive.
    ///
    /// An elapsed deadline is cleared here, in memory and in the store.
    pub fn remaining_ms(&self) -> u64 {
        let mut until = self.until.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(deadline) = *until else {
            return 0;
        };
        let now = self.clock.now_ms();
        if now < deadline {
            return deadline - now;
        }
        *until = None;
        // Still under the lock, so a concurrent `start` persists after us.
        self.remove_persisted();
        info!("translation cooldown expired");
        0
    }

    /// Whether outbound requests are currently suppressed.
    pub fn is_active(&self) -> bool {
        self.remaining_ms() > 0
    }

    /// Start (or extend) the cooldown from now. Returns the new deadline.
    pub fn start(&self) -> u64 {
        let deadline = self.clock.now_ms() + self.duration.as_millis() as u64;
        let mut until = self.until.lock().unwrap_or_else(PoisonError::into_inner);
        *until = Some(deadline);
        if let Err(e) = self.store.set(RATE_LIMIT_KEY, &encode_deadline(deadline)) {
            warn!(error = %e, "failed to persist cooldown");
        }
        deadline
    }

    /// End the cooldown immediately.
    pub fn reset(&self) {
        self.forget();
    }

    /// Configured cooldown length.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    fn forget(&self) {
        let mut until = self.until.lock().unwrap_or_else(PoisonError::into_inner);
        *until = None;
        self.remove_persisted();
    }

    /// Callers hold `until`, keeping store writes in the same order as
    /// memory updates.
    fn remove_persisted(&self) {
        if let Err(e) = self.store.remove(RATE_LIMIT_KEY) {
            warn!(error = %e, "failed to remove persisted cooldown");
        }
    }
}

/// Persisted form of a deadline: a JSON string of epoch milliseconds.
fn encode_deadline(deadline: u64) -> String {
    serde_json::Value::String(deadline.to_string()).to_string()
}

/// Parse a persisted deadline: plain digits, a JSON number, or a JSON string
/// of digits.
fn parse_deadline(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(ms) = raw.parse::<u64>() {
        return Some(ms);
    }
    match serde_json::from_str::<serde_json::Value>(raw).ok()? {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
