//! Immutable phrase dictionary with tracked key-length bounds.
//!
//! A [`Dictionary`] maps source phrases to target phrases. Keys are stored as
//! `Box<[char]>` so the matcher can probe with a borrowed `&[char]` window of
//! the run without allocating a `String` per candidate.
//!
//! ## Text format
//!
//! One entry per line, `key<TAB>value`. A value may hold several alternatives
//! separated by a single space; [`Dictionary::lookup`] always yields the first.
//!
//! ```
//! use opencc_chain::dictionary_lib::Dictionary;
//!
//! let dict = Dictionary::from_text("儘\t尽 侭\n鼠标\t滑鼠\n", "inline").unwrap();
//! assert_eq!(dict.max_len(), 2);
//! assert_eq!(dict.min_len(), 1);
//!
//! let key: Vec<char> = "儘".chars().collect();
//! assert_eq!(dict.lookup(&key), Some("尽"));
//! ```

use std::collections::hash_map::Entry;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zstd::{Decoder, Encoder};

use crate::error::{OpenccError, Result};

/// zstd level used for compiled dictionaries.
const ZSTD_LEVEL: i32 = 19;

/// A phrase dictionary plus the metadata the longest-match scan relies on.
///
/// # Invariants
/// - every key is non-empty;
/// - `max_len` / `min_len` are the longest / shortest key length in chars
///   (both `0` for an empty dictionary);
/// - `starter_cap[c]` is the longest key length among keys starting with `c`.
#[derive(Debug, Default, Clone)]
pub struct Dictionary {
    map: FxHashMap<Box<[char]>, Box<str>>,
    max_len: usize,
    min_len: usize,
    starter_cap: FxHashMap<char, usize>,
}

/// On-disk shape of a compiled dictionary. Entries are sorted so that the
/// same source always compiles to the same bytes.
#[derive(Serialize, Deserialize)]
struct CompiledDictionary {
    entries: Vec<(String, String)>,
}

impl Dictionary {
    /// Builds a dictionary from `(key, value)` pairs.
    ///
    /// Duplicate keys follow **last-wins**: a later pair overwrites an earlier
    /// one. Overwrites with a different value are noted at `debug` level.
    /// Empty keys are ignored.
    pub fn build_from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let it = pairs.into_iter();
        let (lower, _) = it.size_hint();

        let mut map: FxHashMap<Box<[char]>, Box<str>> = FxHashMap::default();
        map.reserve(lower);
        let mut starter_cap: FxHashMap<char, usize> = FxHashMap::default();

        let mut max_len = 0usize;
        let mut min_len = usize::MAX;

        for (k, v) in it {
            let chars: Box<[char]> = k.chars().collect();
            let Some(&c0) = chars.first() else {
                continue;
            };
            let len = chars.len();

            starter_cap
                .entry(c0)
                .and_modify(|m| *m = (*m).max(len))
                .or_insert(len);
            max_len = max_len.max(len);
            min_len = min_len.min(len);

            let new_val: Box<str> = v.into_boxed_str();
            match map.entry(chars) {
                Entry::Vacant(e) => {
                    e.insert(new_val);
                }
                Entry::Occupied(mut e) => {
                    if e.get().as_ref() != new_val.as_ref() {
                        debug!(key = %k, kept = %new_val, dropped = %e.get(), "duplicate key, last wins");
                    }
                    e.insert(new_val);
                }
            }
        }

        if map.is_empty() {
            min_len = 0;
        }

        debug_assert!(min_len <= max_len);

        Self {
            map,
            max_len,
            min_len,
            starter_cap,
        }
    }

    /// Parses dictionary text. `origin` only labels errors (usually the file path).
    ///
    /// Lines are trimmed; blank lines are skipped. A line with no tab, or with
    /// an empty key, is rejected with [`OpenccError::MalformedEntry`]. The
    /// value is everything after the first tab.
    pub fn from_text(content: &str, origin: impl AsRef<Path>) -> Result<Self> {
        let mut pairs = Vec::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            match line.split_once('\t') {
                Some((key, value)) if !key.is_empty() => {
                    pairs.push((key.to_string(), value.to_string()));
                }
                _ => {
                    return Err(OpenccError::MalformedEntry {
                        path: origin.as_ref().to_path_buf(),
                        line: idx + 1,
                        content: raw.to_string(),
                    });
                }
            }
        }

        Ok(Self::build_from_pairs(pairs))
    }

    /// Loads a plain-text dictionary file.
    ///
    /// Fails with [`OpenccError::DictionaryNotFound`] when the file cannot be
    /// opened and with [`OpenccError::Io`] when it opens but cannot be read as
    /// UTF-8.
    pub fn load_text<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|source| OpenccError::DictionaryNotFound {
            path: path.to_path_buf(),
            source,
        })?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|err| OpenccError::io(path, err))?;

        let dict = Self::from_text(&content, path)?;
        debug!(
            path = %path.display(),
            entries = dict.len(),
            min_len = dict.min_len,
            max_len = dict.max_len,
            "loaded text dictionary"
        );
        Ok(dict)
    }

    /// Writes the dictionary as zstd-compressed CBOR.
    pub fn save_compressed<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let entries = self
            .entries()
            .into_iter()
            .map(|(k, v)| (k, v.to_string()))
            .collect();
        let compiled = CompiledDictionary { entries };

        let file = File::create(path).map_err(|err| OpenccError::io(path, err))?;
        let writer = BufWriter::new(file);
        let mut encoder =
            Encoder::new(writer, ZSTD_LEVEL).map_err(|err| OpenccError::io(path, err))?;
        serde_cbor::to_writer(&mut encoder, &compiled)
            .map_err(|err| OpenccError::codec(path, err))?;
        let mut writer = encoder.finish().map_err(|err| OpenccError::io(path, err))?;
        writer.flush().map_err(|err| OpenccError::io(path, err))
    }

    /// Loads a dictionary written by [`save_compressed`](Self::save_compressed).
    ///
    /// Length bounds and starter caps are recomputed rather than trusted from
    /// the file.
    pub fn load_compressed<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| OpenccError::DictionaryNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let mut decoder =
            Decoder::new(BufReader::new(file)).map_err(|err| OpenccError::io(path, err))?;
        let compiled: CompiledDictionary =
            serde_cbor::from_reader(&mut decoder).map_err(|err| OpenccError::codec(path, err))?;

        let dict = Self::build_from_pairs(compiled.entries);
        debug!(
            path = %path.display(),
            entries = dict.len(),
            max_len = dict.max_len,
            "loaded compiled dictionary"
        );
        Ok(dict)
    }

    /// Returns the first alternative mapped to `key`, if any.
    #[inline]
    pub fn lookup(&self, key: &[char]) -> Option<&str> {
        self.map.get(key).map(|v| first_alternative(v))
    }

    /// Returns the stored value for `key` with all of its alternatives.
    pub fn get_raw(&self, key: &str) -> Option<&str> {
        let chars: Vec<char> = key.chars().collect();
        self.map.get(chars.as_slice()).map(|v| v.as_ref())
    }

    /// Every `(key, value)` pair with all alternatives kept, sorted by key.
    pub fn entries(&self) -> Vec<(String, &str)> {
        let mut entries: Vec<(String, &str)> = self
            .map
            .iter()
            .map(|(k, v)| (k.iter().collect(), v.as_ref()))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Longest key length (chars) among keys that start with `c`; `0` if none.
    #[inline]
    pub fn starter_cap(&self, c: char) -> usize {
        self.starter_cap.get(&c).copied().unwrap_or(0)
    }

    #[inline]
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    #[inline]
    pub fn min_len(&self) -> usize {
        self.min_len
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// The text before the first space of a multi-alternative value.
#[inline]
fn first_alternative(value: &str) -> &str {
    match value.split_once(' ') {
        Some((first, _)) => first,
        None => value,
    }
}
