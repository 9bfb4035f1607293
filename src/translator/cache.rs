//! The translation cache context object.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use futures_util::future::{BoxFuture, FutureExt, Shared, join_all};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::cache::{Cooldown, TranslationStore};
use crate::providers::TranslationProvider;
use crate::storage::KeyValueStore;
use crate::telemetry;
use crate::types::{Language, RateLimitStatus, normalize_key};
use crate::{Result, TolkError};

/// An in-flight translation, shared by every caller that asks for the same
/// (key, language) while it runs. Resolves to the string the callers return.
type PendingTranslation = Shared<BoxFuture<'static, String>>;

/// Persisted translation cache with request deduplication and a rate-limit
/// cooldown.
///
/// Construct one at startup (via [`Tolk::builder()`](crate::Tolk::builder) or
/// [`TranslationCache::init`]) and hand clones to whoever renders text. Clones
/// share all state.
///
/// Translation never fails from the caller's point of view: network errors,
/// malformed responses, timeouts and rate limiting all degrade to returning
/// the source text.
#[derive(Clone)]
pub struct TranslationCache {
    inner: Arc<Inner>,
}

struct Inner {
    language: RwLock<Language>,
    provider: Arc<dyn TranslationProvider>,
    translations: TranslationStore,
    cooldown: Cooldown,
    pending: Mutex<HashMap<String, PendingTranslation>>,
    limiter: Option<Arc<Semaphore>>,
    request_timeout: Duration,
}

impl TranslationCache {
    /// Create a cache with default timing, persisting through `store`.
    ///
    /// Shorthand for the builder with only language, provider and store set.
    pub fn init(
        language: impl Into<Language>,
        provider: Arc<dyn TranslationProvider>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        crate::Tolk::builder()
            .language(language)
            .provider(provider)
            .store(store)
            .build()
    }

    pub(crate) fn from_parts(
        language: Language,
        provider: Arc<dyn TranslationProvider>,
        translations: TranslationStore,
        cooldown: Cooldown,
        max_concurrent_requests: usize,
        request_timeout: Duration,
    ) -> Self {
        let limiter =
            (max_concurrent_requests > 0).then(|| Arc::new(Semaphore::new(max_concurrent_requests)));
        Self {
            inner: Arc::new(Inner {
                language: RwLock::new(language),
                provider,
                translations,
                cooldown,
                pending: Mutex::new(HashMap::new()),
                limiter,
                request_timeout,
            }),
        }
    }

    // ========================================================================
    // Active language
    // ========================================================================

    /// Set the active language. No I/O.
    pub fn set_language(&self, language: impl Into<Language>) {
        *self
            .inner
            .language
            .write()
            .unwrap_or_else(PoisonError::into_inner) = language.into();
    }

    /// The active language.
    pub fn language(&self) -> Language {
        self.inner
            .language
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn resolve_language(&self, target: Option<&str>) -> Language {
        target
            .map(Language::new)
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.language())
    }

    // ========================================================================
    // Translation
    // ========================================================================

    /// Translate `text` into `target` (or the active language).
    ///
    /// Answers from the cache when possible, joins an identical in-flight
    /// request when one exists, and otherwise issues exactly one outbound
    /// request. Returns `text` unchanged when it is blank, when the target
    /// is the source language, during a cooldown, or on any failure.
    ///
    /// # Panics
    ///
    /// Panics if a cache miss has to start a request while not running on a
    /// tokio runtime (the request is spawned with [`tokio::spawn`]). Blank
    /// text, the source language and cache hits return without touching the
    /// runtime; use [`translate_sync`](Self::translate_sync) where no runtime
    /// is available.
    pub async fn translate(&self, text: &str, target: Option<&str>) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }
        let language = self.resolve_language(target);
        if language.is_source() {
            return text.to_string();
        }

        let key = normalize_key(text);
        if let Some(hit) = self.inner.translations.get(&key, &language) {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
            return hit;
        }
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);

        let request = {
            let mut pending = self
                .inner
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let slot = pending_slot(&key, &language);

            if let Some(existing) = pending.get(&slot) {
                debug!(language = %language, "joining in-flight translation");
                metrics::counter!(telemetry::DEDUP_JOINS_TOTAL).increment(1);
                existing.clone()
            } else if let Some(hit) = self.inner.translations.get(&key, &language) {
                // Settled between the first lookup and taking the lock.
                return hit;
            } else if self.inner.cooldown.is_active() {
                metrics::counter!(telemetry::COOLDOWN_SKIPS_TOTAL).increment(1);
                return text.to_string();
            } else {
                let request = self.spawn_request(slot.clone(), key, language, text.to_string());
                pending.insert(slot, request.clone());
                request
            }
        };

        request.await
    }

    /// Cache-only lookup. Never performs I/O or starts a request.
    pub fn translate_sync(&self, text: &str, target: Option<&str>) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }
        let language = self.resolve_language(target);
        if language.is_source() {
            return text.to_string();
        }
        self.inner
            .translations
            .get(&normalize_key(text), &language)
            .unwrap_or_else(|| text.to_string())
    }

    /// Translate every text concurrently. Output is index-aligned with input.
    ///
    /// # Panics
    ///
    /// Same as [`translate`](Self::translate): panics if any text needs an
    /// outbound request and there is no tokio runtime.
    pub async fn translate_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        target: Option<&str>,
    ) -> Vec<String> {
        join_all(texts.iter().map(|t| self.translate(t.as_ref(), target))).await
    }

    /// Register-side half of a cache miss: run the provider call on its own
    /// task so it settles (and clears its slot) even if every caller goes away.
    ///
    /// Must be called with the pending map locked; the task's cleanup takes
    /// the same lock, so it cannot remove the slot before it is inserted.
    fn spawn_request(
        &self,
        slot: String,
        key: String,
        language: Language,
        text: String,
    ) -> PendingTranslation {
        let inner = Arc::clone(&self.inner);
        let fallback = text.clone();
        let handle = tokio::spawn(async move {
            let _slot = SlotGuard {
                inner: Arc::clone(&inner),
                slot,
            };
            inner.fetch(&key, &language, &text).await
        });

        async move {
            handle.await.unwrap_or_else(|e| {
                warn!(error = %e, "translation task failed");
                fallback
            })
        }
        .boxed()
        .shared()
    }

    // ========================================================================
    // Administration
    // ========================================================================

    /// Drop every cached translation, in memory and in the store.
    ///
    /// Does not touch the cooldown.
    pub fn clear_cache(&self) {
        self.inner.translations.clear();
    }

    /// Whether outbound requests are suppressed, and for how long.
    ///
    /// An elapsed cooldown is cleared as a side effect.
    pub fn rate_limit_status(&self) -> RateLimitStatus {
        RateLimitStatus::from_remaining_ms(self.inner.cooldown.remaining_ms())
    }

    /// End an active cooldown immediately.
    pub fn reset_rate_limit(&self) {
        self.inner.cooldown.reset();
    }

    /// Number of distinct source texts with at least one cached translation.
    pub fn cached_entries(&self) -> usize {
        self.inner.translations.len()
    }

    /// Number of outbound requests currently in flight.
    pub fn pending_requests(&self) -> usize {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Inner {
    /// Issue one outbound request and fold the outcome into cache state.
    async fn fetch(&self, key: &str, language: &Language, text: &str) -> String {
        let _permit = match &self.limiter {
            Some(limiter) => Arc::clone(limiter).acquire_owned().await.ok(),
            None => None,
        };
        // A 429 may have landed while this request waited for a permit.
        if self.cooldown.is_active() {
            metrics::counter!(telemetry::COOLDOWN_SKIPS_TOTAL).increment(1);
            return text.to_string();
        }

        let provider = self.provider.name().to_owned();
        let start = Instant::now();
        let outcome = tokio::time::timeout(
            self.request_timeout,
            self.provider.translate(text, &Language::source(), language),
        )
        .await
        .unwrap_or(Err(TolkError::Timeout));

        match outcome {
            Ok(translated) => {
                record_request(&provider, start, "ok");
                self.translations.insert(key, language, translated.clone());
                translated
            }
            Err(e) if e.is_rate_limited() => {
                record_request(&provider, start, "rate_limited");
                metrics::counter!(telemetry::RATE_LIMITED_TOTAL).increment(1);
                let until = self.cooldown.start();
                warn!(
                    provider = %provider,
                    until_ms = until,
                    cooldown_secs = self.cooldown.duration().as_secs(),
                    "translation provider rate limited, pausing requests"
                );
                text.to_string()
            }
            Err(e) => {
                let status = if matches!(e, TolkError::Timeout) {
                    "timeout"
                } else {
                    "error"
                };
                record_request(&provider, start, status);
                warn!(provider = %provider, language = %language, error = %e, "translation failed");
                text.to_string()
            }
        }
    }
}

/// Removes a pending slot when its request task ends, however it ends.
struct SlotGuard {
    inner: Arc<Inner>,
    slot: String,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.slot);
    }
}

fn pending_slot(key: &str, language: &Language) -> String {
    format!("{key}:{language}")
}

/// Record request outcome metrics (counter + histogram).
fn record_request(provider: &str, start: Instant, status: &'static str) {
    metrics::counter!(telemetry::REQUESTS_TOTAL,
        "provider" => provider.to_owned(),
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
        "provider" => provider.to_owned(),
    )
    .record(start.elapsed().as_secs_f64());
}
