//! Tolk - persisted translation cache for UI strings
//!
//! Tolk sits between code that renders text and a remote translation
//! provider. It answers repeated lookups from memory, persists what it
//! learns, collapses concurrent identical requests into one outbound call,
//! and backs off for an hour when the provider answers with HTTP 429.
//!
//! Translation never fails from the caller's point of view: every error
//! path returns the source text unchanged.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tolk::Tolk;
//! use tolk::storage::FileStore;
//!
//! #[tokio::main]
//! async fn main() -> tolk::Result<()> {
//!     let cache = Tolk::builder()
//!         .language("fr")
//!         .store(Arc::new(FileStore::default_location()))
//!         .build()?;
//!
//!     // First call goes to the provider; later calls are served from cache.
//!     let label = cache.translate("Book now", None).await;
//!     println!("{label}");
//!
//!     // Synchronous lookup for render passes that cannot await.
//!     println!("{}", cache.translate_sync("Book now", None));
//!     Ok(())
//! }
//! ```
//!
//! Requests run on the ambient tokio runtime, so `translate` must be awaited
//! from within one.

pub mod cache;
pub mod clock;
#[cfg(feature = "cli")]
pub mod config;
pub mod error;
pub mod providers;
pub mod storage;
pub mod telemetry;
pub mod translator;
pub mod types;

// Re-export main types at crate root
pub use error::{Result, TolkError};
pub use providers::{MyMemoryClient, RetryConfig, TranslationProvider};
pub use translator::{Tolk, TolkBuilder, TranslationCache};
pub use types::{Language, RateLimitStatus, SOURCE_LANGUAGE, TranslationTable, normalize_key};
