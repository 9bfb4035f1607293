//! Tests for metrics integration.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use tolk::clock::ManualClock;
use tolk::telemetry;
use tolk::{Language, Result, RetryConfig, Tolk, TolkError, TranslationProvider};

// ============================================================================
// Mock providers
// ============================================================================

struct EchoProvider;

#[async_trait]
impl TranslationProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    async fn translate(&self, text: &str, _source: &Language, target: &Language) -> Result<String> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(format!("{target}:{text}"))
    }
}

struct FailingProvider {
    error: fn() -> TolkError,
}

#[async_trait]
impl TranslationProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn translate(&self, _text: &str, _source: &Language, _target: &Language) -> Result<String> {
        Err((self.error)())
    }
}

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Sum counter values for `name` carrying the label `label=value`.
fn counter_with_label(snapshot: &SnapshotVec, name: &str, label: &str, value: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| {
            key.kind() == MetricKind::Counter
                && key.key().name() == name
                && key
                    .key()
                    .labels()
                    .any(|l| l.key() == label && l.value() == value)
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Check if any histogram entries exist for a given metric name.
fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

/// Runs async code on a current-thread runtime inside a local recorder scope.
///
/// Request tasks are spawned, so everything must stay on this thread for the
/// thread-local recorder to see their metrics.
fn record<F, Fut>(f: F) -> SnapshotVec
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    snapshotter.snapshot().into_vec()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn miss_then_hit_records_cache_metrics() {
    let snapshot = record(|| async {
        let cache = Tolk::builder()
            .language("fr")
            .provider(Arc::new(EchoProvider))
            .build()
            .unwrap();
        cache.translate("Hello", None).await;
        cache.translate("Hello", None).await;
    });

    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL), 1);
    assert_eq!(
        counter_with_label(&snapshot, telemetry::REQUESTS_TOTAL, "status", "ok"),
        1
    );
    assert!(
        has_histogram(&snapshot, telemetry::REQUEST_DURATION_SECONDS),
        "expected a duration histogram entry"
    );
}

#[test]
fn joined_requests_are_counted() {
    let snapshot = record(|| async {
        let cache = Tolk::builder()
            .language("fr")
            .provider(Arc::new(EchoProvider))
            .build()
            .unwrap();
        futures_util::future::join_all((0..4).map(|_| cache.translate("Hello", None))).await;
    });

    assert_eq!(counter_total(&snapshot, telemetry::DEDUP_JOINS_TOTAL), 3);
    assert_eq!(counter_total(&snapshot, telemetry::REQUESTS_TOTAL), 1);
}

#[test]
fn rate_limit_records_cooldown_metrics() {
    let snapshot = record(|| async {
        let cache = Tolk::builder()
            .language("fr")
            .provider(Arc::new(FailingProvider {
                error: || TolkError::RateLimited { retry_after: None },
            }))
            .clock(Arc::new(ManualClock::new(0)))
            .build()
            .unwrap();
        cache.translate("Hello", None).await;
        cache.translate("Goodbye", None).await;
    });

    assert_eq!(counter_total(&snapshot, telemetry::RATE_LIMITED_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::COOLDOWN_SKIPS_TOTAL), 1);
    assert_eq!(
        counter_with_label(&snapshot, telemetry::REQUESTS_TOTAL, "status", "rate_limited"),
        1
    );
}

#[test]
fn failed_request_records_error_status() {
    let snapshot = record(|| async {
        let cache = Tolk::builder()
            .language("fr")
            .provider(Arc::new(FailingProvider {
                error: || TolkError::EmptyResponse,
            }))
            .build()
            .unwrap();
        cache.translate("Hello", None).await;
    });

    assert_eq!(
        counter_with_label(&snapshot, telemetry::REQUESTS_TOTAL, "status", "error"),
        1
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::REQUESTS_TOTAL, "provider", "failing"),
        1
    );
}

#[test]
fn retries_are_counted() {
    let snapshot = record(|| async {
        let cache = Tolk::builder()
            .language("fr")
            .provider(Arc::new(FailingProvider {
                error: || TolkError::Http("reset".into()),
            }))
            .retry(
                RetryConfig::new()
                    .max_attempts(3)
                    .initial_delay(Duration::from_millis(1)),
            )
            .build()
            .unwrap();
        cache.translate("Hello", None).await;
    });

    assert_eq!(counter_total(&snapshot, telemetry::RETRIES_TOTAL), 2);
    assert_eq!(counter_total(&snapshot, telemetry::REQUESTS_TOTAL), 1);
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let cache = Tolk::builder()
        .language("fr")
        .provider(Arc::new(EchoProvider))
        .build()
        .unwrap();
    assert_eq!(cache.translate("Hello", None).await, "fr:Hello");
}
