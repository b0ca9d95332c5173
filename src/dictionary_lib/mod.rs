//! Dictionary loading and caching.
//!
//! [`Dictionary`] is the immutable phrase table applied by the matcher, and
//! [`DictionaryCache`] makes sure each file is parsed at most once per engine.
//! Users generally reach these through [`crate::OpenCC`], but they are public
//! for custom chains and for precompiling dictionaries.

mod dictionary;
mod dictionary_cache;

pub use dictionary::Dictionary;
pub use dictionary_cache::{DictFormat, DictionaryCache};
