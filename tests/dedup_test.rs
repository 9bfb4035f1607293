//! In-flight request deduplication, request timeout and the concurrency cap.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use tolk::storage::MemoryStore;
use tolk::{Language, Result, Tolk, TranslationCache, TranslationProvider};

/// Sleeps for `delay` before answering; tracks call count and peak
/// concurrency.
struct SlowProvider {
    delay: Duration,
    calls: AtomicU32,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl SlowProvider {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: AtomicU32::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for SlowProvider {
    fn name(&self) -> &str {
        "slow"
    }

    async fn translate(&self, text: &str, _source: &Language, target: &Language) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(format!("{text} ({target})"))
    }
}

fn cache_with(provider: Arc<SlowProvider>) -> TranslationCache {
    Tolk::builder()
        .language("fr")
        .provider(provider)
        .store(Arc::new(MemoryStore::new()))
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn concurrent_identical_requests_share_one_call() {
    let provider = Arc::new(SlowProvider::new(Duration::from_millis(200)));
    let cache = cache_with(provider.clone());

    let results = join_all((0..10).map(|_| cache.translate("Book now", None))).await;

    assert_eq!(provider.call_count(), 1);
    assert!(results.iter().all(|r| r == "Book now (fr)"));
    assert_eq!(cache.pending_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn normalized_keys_share_one_call() {
    let provider = Arc::new(SlowProvider::new(Duration::from_millis(200)));
    let cache = cache_with(provider.clone());

    let (a, b) = tokio::join!(
        cache.translate("Book now", None),
        cache.translate(" book NOW", None),
    );

    assert_eq!(provider.call_count(), 1);
    assert_eq!(a, b);
}

#[tokio::test(start_paused = true)]
async fn different_languages_are_not_deduplicated() {
    let provider = Arc::new(SlowProvider::new(Duration::from_millis(200)));
    let cache = cache_with(provider.clone());

    let (fr, de) = tokio::join!(
        cache.translate("Hello", Some("fr")),
        cache.translate("Hello", Some("de")),
    );

    assert_eq!(provider.call_count(), 2);
    assert_eq!(fr, "Hello (fr)");
    assert_eq!(de, "Hello (de)");
}

#[tokio::test(start_paused = true)]
async fn pending_slot_is_visible_while_in_flight() {
    let provider = Arc::new(SlowProvider::new(Duration::from_secs(1)));
    let cache = cache_with(provider.clone());

    let task = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.translate("Hello", None).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(cache.pending_requests(), 1);

    assert_eq!(task.await.unwrap(), "Hello (fr)");
    assert_eq!(cache.pending_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn request_outlives_dropped_caller() {
    let provider = Arc::new(SlowProvider::new(Duration::from_millis(100)));
    let cache = cache_with(provider.clone());

    let task = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.translate("Hello", None).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    task.abort();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(cache.translate_sync("Hello", None), "Hello (fr)");
    assert_eq!(cache.pending_requests(), 0);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn timeout_returns_text_and_frees_slot() {
    let provider = Arc::new(SlowProvider::new(Duration::from_secs(60)));
    let cache = Tolk::builder()
        .language("fr")
        .provider(provider.clone())
        .request_timeout(Duration::from_millis(500))
        .build()
        .unwrap();

    assert_eq!(cache.translate("Hello", None).await, "Hello");
    assert_eq!(cache.pending_requests(), 0);
    assert_eq!(cache.cached_entries(), 0);
    assert!(!cache.rate_limit_status().is_limited);

    // The slot is free, so a new call starts a new request.
    assert_eq!(cache.translate("Hello", None).await, "Hello");
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn concurrency_is_capped() {
    let provider = Arc::new(SlowProvider::new(Duration::from_millis(100)));
    let cache = Tolk::builder()
        .language("fr")
        .provider(provider.clone())
        .max_concurrent_requests(2)
        .build()
        .unwrap();

    let texts: Vec<String> = (0..6).map(|i| format!("text {i}")).collect();
    let out = cache.translate_batch(&texts, None).await;

    assert_eq!(provider.call_count(), 6);
    assert_eq!(provider.peak_concurrency(), 2);
    assert_eq!(out[5], "text 5 (fr)");
}

#[tokio::test(start_paused = true)]
async fn zero_cap_means_unbounded() {
    let provider = Arc::new(SlowProvider::new(Duration::from_millis(100)));
    let cache = Tolk::builder()
        .language("fr")
        .provider(provider.clone())
        .max_concurrent_requests(0)
        .build()
        .unwrap();

    let texts: Vec<String> = (0..20).map(|i| format!("text {i}")).collect();
    cache.translate_batch(&texts, None).await;

    assert_eq!(provider.peak_concurrency(), 20);
}
