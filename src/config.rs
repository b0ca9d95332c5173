//! Engine settings and the JSON conversion-config format.
//!
//! A conversion config names the dictionaries a conversion applies, in order:
//!
//! ```json
//! {
//!   "name": "Simplified Chinese to Traditional Chinese",
//!   "conversion_chain": [
//!     {"dict": {"type": "group", "policy": "per_segment", "dicts": [
//!       {"type": "txt", "file": "STPhrases.txt"},
//!       {"type": "txt", "file": "STCharacters.txt"}
//!     ]}}
//!   ]
//! }
//! ```
//!
//! Chain entries may also be the bare descriptor without the `"dict"`
//! wrapper. A group without `"policy"` uses [`GroupPolicy::FirstMatch`].
//! Unknown fields are ignored.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::chain::GroupPolicy;
use crate::error::{OpenccError, Result};

/// Environment variable overriding [`EngineConfig::config_dir`].
pub const CONFIG_DIR_ENV: &str = "OPENCC_CONFIG_DIR";
/// Environment variable overriding [`EngineConfig::dict_dir`].
pub const DICT_DIR_ENV: &str = "OPENCC_DICT_DIR";

const DEFAULT_CONFIG_DIR: &str = "config";
const DEFAULT_DICT_DIR: &str = "dictionary";

/// Where an engine looks for conversion configs and dictionaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Directory holding `<conversion>.json` files.
    pub config_dir: PathBuf,
    /// Base directory for relative dictionary paths in configs.
    pub dict_dir: PathBuf,
    /// Convert text runs on the rayon pool instead of sequentially.
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            dict_dir: PathBuf::from(DEFAULT_DICT_DIR),
            parallel: false,
        }
    }
}

impl EngineConfig {
    pub fn new(config_dir: impl Into<PathBuf>, dict_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            dict_dir: dict_dir.into(),
            parallel: false,
        }
    }

    /// Defaults, overridden by `OPENCC_CONFIG_DIR` / `OPENCC_DICT_DIR` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = env::var_os(CONFIG_DIR_ENV) {
            config.config_dir = PathBuf::from(dir);
        }
        if let Some(dir) = env::var_os(DICT_DIR_ENV) {
            config.dict_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Path of the config file for `conversion`.
    pub fn config_path(&self, conversion: &str) -> PathBuf {
        self.config_dir.join(format!("{conversion}.json"))
    }

    /// Resolves a dictionary path from a config against [`dict_dir`](Self::dict_dir).
    /// Absolute paths are returned as-is.
    pub fn dict_path(&self, file: &Path) -> PathBuf {
        self.dict_dir.join(file)
    }
}

/// A parsed `<conversion>.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversionConfig {
    /// Human-readable name of the conversion.
    #[serde(default)]
    pub name: String,
    pub conversion_chain: Vec<ChainEntry>,
}

/// One element of `conversion_chain`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChainEntry {
    /// `{"dict": {...}}`
    Wrapped { dict: DictDescriptor },
    /// `{...}`
    Bare(DictDescriptor),
}

impl ChainEntry {
    pub fn descriptor(&self) -> &DictDescriptor {
        match self {
            ChainEntry::Wrapped { dict } | ChainEntry::Bare(dict) => dict,
        }
    }
}

/// A dictionary reference inside a chain.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DictDescriptor {
    /// Plain-text `key<TAB>value` dictionary.
    Txt { file: PathBuf },
    /// Compiled (zstd + CBOR) dictionary.
    Zst { file: PathBuf },
    /// Ordered alternatives; members must be leaves.
    Group {
        dicts: Vec<DictDescriptor>,
        #[serde(default)]
        policy: GroupPolicy,
    },
}

impl ConversionConfig {
    /// Parses a config document. `conversion` only labels errors.
    pub fn from_json(conversion: &str, json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| OpenccError::ConversionNotFound {
            name: conversion.to_string(),
            reason: format!("invalid config: {err}"),
        })
    }

    /// Reads and parses a config file. Any failure, missing file included,
    /// is reported as [`OpenccError::ConversionNotFound`].
    pub fn load(conversion: &str, path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|err| OpenccError::ConversionNotFound {
            name: conversion.to_string(),
            reason: format!("{}: {err}", path.display()),
        })?;
        Self::from_json(conversion, &json)
    }
}
