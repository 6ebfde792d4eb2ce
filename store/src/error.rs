//! Error type for storage adapters.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failure reported by a storage adapter or while preparing one.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An N-Triples document is malformed.
    #[error("N-Triples parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        message: String,
    },

    /// Connection parameters could not be decoded.
    #[error("invalid connection parameters: {0}")]
    Config(#[from] toml::de::Error),

    /// The requested adapter kind has no implementation in this build.
    #[error("unsupported adapter kind: {0}")]
    UnsupportedAdapter(String),

    /// The backend rejected or failed an operation.
    #[error("backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Creates a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        StoreError::Backend(msg.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
