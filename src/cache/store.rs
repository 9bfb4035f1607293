//! Write-through translation table.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::storage::{CACHE_KEY, KeyValueStore};
use crate::types::{Language, TranslationTable};

/// In-memory translation table persisted under [`CACHE_KEY`].
///
/// Every mutation serializes the whole table while still holding the write
/// lock, so concurrent writers persist in the same order they mutate and the
/// stored copy never lags behind an older snapshot.
pub struct TranslationStore {
    table: RwLock<TranslationTable>,
    store: Arc<dyn KeyValueStore>,
}

impl TranslationStore {
    /// Load the persisted table. Missing or corrupt data yields an empty table.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let table = match store.get(CACHE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<TranslationTable>(&json) {
                Ok(table) => {
                    debug!(entries = table.len(), "loaded persisted translations");
                    table
                }
                Err(e) => {
                    warn!(error = %e, "corrupt persisted translation cache, starting empty");
                    TranslationTable::new()
                }
            },
            Ok(None) => TranslationTable::new(),
            Err(e) => {
                warn!(error = %e, "failed to read persisted translation cache");
                TranslationTable::new()
            }
        };
        Self {
            table: RwLock::new(table),
            store,
        }
    }

    /// Look up a translation of `key` into `language`.
    pub fn get(&self, key: &str, language: &Language) -> Option<String> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.get(key)?.get(language.as_str()).cloned()
    }

    /// Record (or overwrite) a translation and persist the table.
    pub fn insert(&self, key: &str, language: &Language, translated: String) {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        table
            .entry(key.to_string())
            .or_default()
            .insert(language.as_str().to_string(), translated);
        self.persist(&table);
    }

    /// Drop every translation, in memory and in the store.
    pub fn clear(&self) {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        table.clear();
        if let Err(e) = self.store.remove(CACHE_KEY) {
            warn!(error = %e, "failed to remove persisted translation cache");
        }
    }

    /// Number of distinct source keys.
    pub fn len(&self) -> usize {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self, table: &TranslationTable) {
        let json = match serde_json::to_string(table) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize translation cache");
                return;
            }
        };
        if let Err(e) = self.store.set(CACHE_KEY, &json) {
            warn!(error = %e, "failed to persist translation cache");
        }
    }
}
