//! Provider trait for remote translation backends.
//!
//! Providers report failures through [`TolkError`](crate::TolkError) and let
//! the cache decide what to do with them:
//!
//! - `RateLimited` starts the cooldown
//! - anything else degrades the single call to the source text
//!
//! # Example
//!
//! ```ignore
//! async fn translate(&self, text: &str, source: &Language, target: &Language) -> Result<String> {
//!     if response.status() == 429 {
//!         return Err(TolkError::RateLimited { retry_after: None });
//!     }
//!     // ... parse body
//! }
//! ```

use async_trait::async_trait;

use crate::Result;
use crate::types::Language;

/// A remote service that translates text between two languages.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Provider name for logging/metrics.
    fn name(&self) -> &str;

    /// Translate `text` from `source` into `target`.
    async fn translate(&self, text: &str, source: &Language, target: &Language)
    -> Result<String>;
}
