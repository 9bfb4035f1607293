//! Telemetry metric name constants.
//!
//! Centralised metric names for tolk operations. Consumers install their own
//! `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `tolk_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider`: provider name (e.g. "mymemory")
//! - `status`: outcome: "ok", "rate_limited", "timeout" or "error"

/// Total outbound translation requests.
///
/// Labels: `provider`, `status`.
pub const REQUESTS_TOTAL: &str = "tolk_requests_total";

/// Outbound request duration in seconds.
///
/// Labels: `provider`.
pub const REQUEST_DURATION_SECONDS: &str = "tolk_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `provider`.
pub const RETRIES_TOTAL: &str = "tolk_retries_total";

/// Lookups answered from the in-memory table.
pub const CACHE_HITS_TOTAL: &str = "tolk_cache_hits_total";

/// Lookups that found no cached translation.
pub const CACHE_MISSES_TOTAL: &str = "tolk_cache_misses_total";

/// Calls that joined an already in-flight request instead of issuing one.
pub const DEDUP_JOINS_TOTAL: &str = "tolk_dedup_joins_total";

/// Provider responses that started a cooldown.
pub const RATE_LIMITED_TOTAL: &str = "tolk_rate_limited_total";

/// Calls that skipped the provider because a cooldown was active.
pub const COOLDOWN_SKIPS_TOTAL: &str = "tolk_cooldown_skips_total";
