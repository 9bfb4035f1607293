//! Public types for the Tolk API.

mod language;
mod status;
mod table;

pub use language::{Language, SOURCE_LANGUAGE};
pub use status::RateLimitStatus;
pub use table::{TranslationTable, normalize_key};
