//! The persisted translation table.

use std::collections::HashMap;

/// Normalized source text → (language code → translated text).
pub type TranslationTable = HashMap<String, HashMap<String, String>>;

/// Normalize source text into a table key (trimmed, lower-cased).
pub fn normalize_key(text: &str) -> String {
    text.trim().to_lowercase()
}
