//! OpenCC-style Chinese script conversion driven by dictionary chains.
//!
//! A named conversion (e.g. `s2twp`) is described by a JSON config listing
//! dictionaries in order. [`OpenCC`] loads the config and its dictionaries on
//! first use, splits input around punctuation, and rewrites each run with
//! greedy longest-match substitution, one chain step at a time.
//!
//! ```no_run
//! use opencc_chain::{EngineConfig, OpenCC};
//!
//! let mut opencc = OpenCC::with_config(EngineConfig::new("data/config", "data/dictionary"));
//! opencc.set_conversion("s2twp");
//! let output = opencc.convert("鼠标是一种很常见的电脑输入设备。").unwrap();
//! println!("{output}");
//! ```

use std::fs;
use std::sync::Arc;

use tracing::debug;

pub mod chain;
pub mod config;
pub mod delimiter_set;
pub mod dictionary_lib;
pub mod error;
pub mod matcher;
pub mod segmenter;

pub use crate::chain::{ChainStep, ConversionChain, DictGroup, GroupPolicy};
pub use crate::config::{ConversionConfig, EngineConfig};
pub use crate::dictionary_lib::{Dictionary, DictionaryCache};
pub use crate::error::{OpenccError, Result};

/// The conversion engine.
///
/// Holds the current conversion name, the lazily built chain for it, and the
/// dictionary cache. Switching conversions only drops the chain; dictionaries
/// already parsed stay cached for the life of the engine.
///
/// Building a chain mutates the cache, which is why [`convert`](Self::convert)
/// takes `&mut self`. To convert from several threads, build once with
/// [`prepare`](Self::prepare) and share the returned chain.
#[derive(Debug, Default)]
pub struct OpenCC {
    config: EngineConfig,
    conversion: Option<String>,
    chain: Option<Arc<ConversionChain>>,
    cache: DictionaryCache,
}

impl OpenCC {
    /// An engine with default paths and no conversion bound.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// An engine with default paths bound to `conversion`. Nothing is loaded
    /// until the first [`convert`](Self::convert).
    pub fn with_conversion(conversion: &str) -> Self {
        let mut opencc = Self::new();
        opencc.set_conversion(conversion);
        opencc
    }

    /// Binds the engine to `conversion`.
    ///
    /// Setting the current name again is a no-op. A different name discards
    /// the built chain; it is rebuilt on the next [`convert`](Self::convert).
    pub fn set_conversion(&mut self, conversion: &str) {
        if self.conversion.as_deref() == Some(conversion) {
            return;
        }
        debug!(from = ?self.conversion, to = conversion, "conversion changed, chain marked stale");
        self.conversion = Some(conversion.to_string());
        self.chain = None;
    }

    /// The bound conversion name, if any.
    pub fn conversion_name(&self) -> Option<&str> {
        self.conversion.as_deref()
    }

    /// The display name from the config, once the chain has been built.
    pub fn display_name(&self) -> Option<&str> {
        self.chain.as_deref().map(ConversionChain::display_name)
    }

    /// The built chain, if it is current.
    pub fn chain(&self) -> Option<&Arc<ConversionChain>> {
        self.chain.as_ref()
    }

    pub fn cache(&self) -> &DictionaryCache {
        &self.cache
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_parallel(&mut self, is_parallel: bool) {
        self.config.parallel = is_parallel;
    }

    pub fn get_parallel(&self) -> bool {
        self.config.parallel
    }

    /// Builds the chain for the bound conversion if needed and returns it.
    ///
    /// # Errors
    /// [`OpenccError::ConversionNotConfigured`] when no conversion was set;
    /// otherwise any config or dictionary error raised while building.
    /// A failed build leaves the engine without a chain, so the next call
    /// retries from scratch.
    pub fn prepare(&mut self) -> Result<Arc<ConversionChain>> {
        let name = self
            .conversion
            .as_deref()
            .ok_or(OpenccError::ConversionNotConfigured)?;

        if let Some(chain) = &self.chain {
            return Ok(Arc::clone(chain));
        }

        let config = ConversionConfig::load(name, &self.config.config_path(name))?;
        let chain = Arc::new(ConversionChain::build(
            name,
            &config,
            &self.config,
            &mut self.cache,
        )?);
        self.chain = Some(Arc::clone(&chain));
        Ok(chain)
    }

    /// Converts `text` with the bound conversion.
    ///
    /// ```
    /// # use opencc_chain::{OpenCC, OpenccError};
    /// let mut opencc = OpenCC::new();
    /// assert!(matches!(opencc.convert("汉字"), Err(OpenccError::ConversionNotConfigured)));
    /// ```
    pub fn convert(&mut self, text: &str) -> Result<String> {
        let chain = self.prepare()?;
        Ok(chain.convert(text, self.config.parallel))
    }

    /// Conversion names available in the config directory, sorted.
    pub fn available_conversions(&self) -> Result<Vec<String>> {
        let dir = &self.config.config_dir;
        let entries = fs::read_dir(dir).map_err(|err| OpenccError::Io {
            path: dir.clone(),
            source: err,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|err| OpenccError::Io {
                    path: dir.clone(),
                    source: err,
                })?
                .path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
