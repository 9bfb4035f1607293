//! Cache state owned by a [`TranslationCache`](crate::TranslationCache).
//!
//! Two pieces of shared state, both written through to a
//! [`KeyValueStore`](crate::storage::KeyValueStore) so they survive restarts:
//!
//! - [`TranslationStore`]: the translation table, keyed on normalized source
//!   text and then language code. Entries are only ever removed by a full
//!   clear.
//! - [`Cooldown`]: the deadline before which no outbound requests are made
//!   after the provider signalled rate limiting. Expiry is lazy: a past
//!   deadline is dropped (in memory and in the store) the next time it is
//!   read.
//!
//! In-flight request deduplication lives with the cache itself, since it is
//! never persisted.

pub mod cooldown;
pub mod store;

pub use cooldown::{Cooldown, DEFAULT_COOLDOWN};
pub use store::TranslationStore;
