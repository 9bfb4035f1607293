//! Language codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Code of the language UI strings are authored in.
///
/// Translation into this language is a no-op.
pub const SOURCE_LANGUAGE: &str = "en";

/// A language code such as `"fr"` or `"pt-br"`.
///
/// Codes are trimmed and lower-cased on construction so `"FR "` and `"fr"`
/// address the same cache slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    /// Create a language from a code.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_lowercase())
    }

    /// The source language (`en`).
    pub fn source() -> Self {
        Self(SOURCE_LANGUAGE.to_string())
    }

    /// The normalized code.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the source language.
    pub fn is_source(&self) -> bool {
        self.0 == SOURCE_LANGUAGE
    }

    /// Whether the code is empty after trimming.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::source()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Language {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for Language {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}
