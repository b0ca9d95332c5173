//! Error types for opencc-chain.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`OpenccError`].
pub type Result<T> = std::result::Result<T, OpenccError>;

/// Every failure the engine can surface to its caller.
///
/// All variants are fatal to the call that raised them. A substring with no
/// dictionary match is never an error; it simply passes through unchanged.
#[derive(Error, Debug)]
pub enum OpenccError {
    /// `convert` was called before any conversion name was set.
    #[error("conversion is not set")]
    ConversionNotConfigured,

    /// The named conversion config is absent or cannot be parsed.
    #[error("conversion '{name}' not found: {reason}")]
    ConversionNotFound { name: String, reason: String },

    /// The config parsed, but describes a chain the engine cannot build
    /// (nested or empty groups).
    #[error("invalid conversion chain '{name}': {reason}")]
    InvalidChain { name: String, reason: String },

    /// A dictionary file referenced by a chain cannot be opened.
    #[error("dictionary not found: {}", .path.display())]
    DictionaryNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A dictionary line lacks the `key<TAB>value` shape.
    #[error("malformed entry at {}:{line}: {content:?}", .path.display())]
    MalformedEntry {
        path: PathBuf,
        line: usize,
        content: String,
    },

    /// Reading or writing a file failed after it was located.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A compiled (CBOR + zstd) dictionary could not be encoded or decoded.
    #[error("dictionary codec error on {}: {reason}", .path.display())]
    Codec { path: PathBuf, reason: String },
}

impl OpenccError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        OpenccError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn codec(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        OpenccError::Codec {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid_chain(name: &str, reason: impl Into<String>) -> Self {
        OpenccError::InvalidChain {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        let err = OpenccError::MalformedEntry {
            path: PathBuf::from("dicts/STPhrases.txt"),
            line: 7,
            content: "无制表符".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("dicts/STPhrases.txt:7"), "{msg}");
        assert!(msg.contains("无制表符"), "{msg}");

        let err = OpenccError::ConversionNotFound {
            name: "s2x".to_string(),
            reason: "missing".to_string(),
        };
        assert_eq!(err.to_string(), "conversion 's2x' not found: missing");
    }

    #[test]
    fn dictionary_not_found_keeps_io_source() {
        use std::error::Error;

        let err = OpenccError::DictionaryNotFound {
            path: PathBuf::from("nope.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "dictionary not found: nope.txt");
    }
}
