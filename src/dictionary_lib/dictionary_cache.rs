use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::Dictionary;
use crate::error::Result;

/// How a dictionary file is stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictFormat {
    /// `key<TAB>value` lines.
    Text,
    /// zstd-compressed CBOR written by [`Dictionary::save_compressed`].
    Compressed,
}

/// Path-keyed cache of loaded dictionaries, owned by one engine.
///
/// A second [`load`](Self::load) of the same path returns the already-built
/// `Arc` without touching the file again. Entries are never evicted, so
/// switching conversions back and forth reuses everything already parsed.
#[derive(Debug, Default)]
pub struct DictionaryCache {
    dicts: FxHashMap<PathBuf, Arc<Dictionary>>,
}

impl DictionaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a text dictionary, or returns the cached instance.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<Arc<Dictionary>> {
        self.load_with(path, DictFormat::Text)
    }

    /// Loads a dictionary in the given format, or returns the cached instance.
    ///
    /// A failed load leaves the cache untouched.
    pub fn load_with<P: AsRef<Path>>(
        &mut self,
        path: P,
        format: DictFormat,
    ) -> Result<Arc<Dictionary>> {
        let path = path.as_ref();
        if let Some(dict) = self.dicts.get(path) {
            debug!(path = %path.display(), "dictionary cache hit");
            return Ok(Arc::clone(dict));
        }

        let dict = match format {
            DictFormat::Text => Dictionary::load_text(path)?,
            DictFormat::Compressed => Dictionary::load_compressed(path)?,
        };
        let dict = Arc::new(dict);
        self.dicts.insert(path.to_path_buf(), Arc::clone(&dict));
        Ok(dict)
    }

    /// Registers an already-built dictionary under `path`, replacing any
    /// previous entry.
    pub fn insert<P: Into<PathBuf>>(&mut self, path: P, dict: Dictionary) -> Arc<Dictionary> {
        let dict = Arc::new(dict);
        self.dicts.insert(path.into(), Arc::clone(&dict));
        dict
    }

    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<Arc<Dictionary>> {
        self.dicts.get(path.as_ref()).cloned()
    }

    pub fn contains<P: AsRef<Path>>(&self, path: P) -> bool {
        self.dicts.contains_key(path.as_ref())
    }

    pub fn len(&self) -> usize {
        self.dicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dicts.is_empty()
    }

    pub fn clear(&mut self) {
        self.dicts.clear();
    }
}
