//! Translation cache and its builder

mod builder;
mod cache;

pub use builder::{Tolk, TolkBuilder};
pub use cache::TranslationCache;
