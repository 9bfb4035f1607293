//! Persistence port.
//!
//! The cache persists through a small string key-value interface so the core
//! logic never branches on the host environment. Two adapters ship:
//!
//! - [`FileStore`]: durable, one JSON file per key under a directory
//!   (default `~/.cache/tolk/`).
//! - [`MemoryStore`]: process-lifetime only; for hosts without durable
//!   storage and for tests that inspect what was persisted.
//!
//! Callers treat every store error as non-fatal: the cache logs it and keeps
//! working from memory.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use tracing::warn;

use crate::Result;
use crate::types::Language;

/// Key holding the serialized translation table.
pub const CACHE_KEY: &str = "translation_cache";

/// Key holding the cooldown deadline (epoch milliseconds) while one is active.
pub const RATE_LIMIT_KEY: &str = "translation_rate_limit";

/// Key holding the application's last selected language.
pub const LANGUAGE_KEY: &str = "app_language";

/// Durable string key-value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write (or overwrite) a value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Load the application's saved language, if any.
///
/// Read errors are logged and treated as "nothing saved".
pub fn load_language(store: &dyn KeyValueStore) -> Option<Language> {
    match store.get(LANGUAGE_KEY) {
        Ok(Some(code)) => {
            let language = Language::new(code);
            (!language.is_empty()).then_some(language)
        }
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "failed to read saved language");
            None
        }
    }
}

/// Persist the application's selected language.
pub fn save_language(store: &dyn KeyValueStore, language: &Language) -> Result<()> {
    store.set(LANGUAGE_KEY, language.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_round_trip() {
        let store = MemoryStore::new();
        assert!(load_language(&store).is_none());

        save_language(&store, &Language::new("de")).unwrap();
        assert_eq!(load_language(&store), Some(Language::new("de")));
        assert_eq!(store.get(LANGUAGE_KEY).unwrap().as_deref(), Some("de"));
    }

    #[test]
    fn blank_saved_language_is_ignored() {
        let store = MemoryStore::new();
        store.set(LANGUAGE_KEY, "   ").unwrap();
        assert!(load_language(&store).is_none());
    }
}
