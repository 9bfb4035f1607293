//! Builder for configuring translation cache instances

use std::sync::Arc;
use std::time::Duration;

use super::TranslationCache;
use crate::cache::{Cooldown, DEFAULT_COOLDOWN, TranslationStore};
use crate::clock::{Clock, SystemClock};
use crate::providers::{MyMemoryClient, RetryConfig, RetryingProvider, TranslationProvider};
use crate::storage::{KeyValueStore, MemoryStore};
use crate::types::Language;
use crate::{Result, TolkError};

/// Default timeout for a single outbound request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cap on simultaneous outbound requests.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 16;

/// Main entry point for creating translation caches.
pub struct Tolk;

impl Tolk {
    /// Create a new builder for configuring the cache.
    pub fn builder() -> TolkBuilder {
        TolkBuilder::new()
    }
}

/// Builder for configuring translation cache instances.
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use tolk::{Tolk, storage::FileStore};
/// let cache = Tolk::builder()
///     .language("fr")
///     .store(Arc::new(FileStore::default_location()))
///     .build()?;
/// # Ok::<(), tolk::TolkError>(())
/// ```
pub struct TolkBuilder {
    language: Language,
    provider: Option<Arc<dyn TranslationProvider>>,
    store: Option<Arc<dyn KeyValueStore>>,
    clock: Option<Arc<dyn Clock>>,
    cooldown: Duration,
    request_timeout: Duration,
    max_concurrent_requests: usize,
    retry: Option<RetryConfig>,
}

impl TolkBuilder {
    pub fn new() -> Self {
        Self {
            language: Language::source(),
            provider: None,
            store: None,
            clock: None,
            cooldown: DEFAULT_COOLDOWN,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            retry: None,
        }
    }

    /// Initial active language (default: `en`).
    pub fn language(mut self, language: impl Into<Language>) -> Self {
        self.language = language.into();
        self
    }

    /// Translation backend (default: [`MyMemoryClient`]).
    pub fn provider(mut self, provider: Arc<dyn TranslationProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Persistence adapter (default: [`MemoryStore`]).
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Time source for cooldown deadlines (default: [`SystemClock`]).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// How long to stop calling the provider after it rate limits us
    /// (default: 1 hour).
    pub fn cooldown(mut self, duration: Duration) -> Self {
        self.cooldown = duration;
        self
    }

    /// Upper bound on a single outbound request (default: 10s).
    ///
    /// A request that exceeds it degrades to the source text and frees its
    /// deduplication slot.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Cap on simultaneous outbound requests (default: 16, `0` = unbounded).
    pub fn max_concurrent_requests(mut self, n: usize) -> Self {
        self.max_concurrent_requests = n;
        self
    }

    /// Retry transient provider failures (default: single attempt).
    ///
    /// Rate-limit responses are never retried.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = Some(config);
        self
    }

    /// Build the cache, loading persisted translations and cooldown state.
    ///
    /// Unreadable persisted state is logged and replaced with empty state;
    /// only invalid builder settings produce an error.
    pub fn build(self) -> Result<TranslationCache> {
        if self.language.is_empty() {
            return Err(TolkError::InvalidInput(
                "language code must not be empty".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(TolkError::Configuration(
                "request timeout must be greater than zero".to_string(),
            ));
        }

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let mut provider = self
            .provider
            .unwrap_or_else(|| Arc::new(MyMemoryClient::new()));
        if let Some(config) = self.retry
            && config.max_attempts > 1
        {
            provider = Arc::new(RetryingProvider::new(provider, config));
        }

        let translations = TranslationStore::load(store.clone());
        let cooldown = Cooldown::load(store, clock, self.cooldown);

        Ok(TranslationCache::from_parts(
            self.language,
            provider,
            translations,
            cooldown,
            self.max_concurrent_requests,
            self.request_timeout,
        ))
    }
}

impl Default for TolkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
