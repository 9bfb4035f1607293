//! Translation provider implementations.
//!
//! [`MyMemoryClient`] talks to the MyMemory public API. [`RetryingProvider`]
//! wraps any [`TranslationProvider`] with backoff on transient failures.

pub mod mymemory;
pub mod retry;
pub mod traits;

pub use mymemory::MyMemoryClient;
pub use retry::{RetryConfig, RetryingProvider};
pub use traits::TranslationProvider;
