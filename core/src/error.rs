//! Error type for the mapping engine.
//!
//! Absence is never an error: a missing attribute is
//! [`AttributeValue::Absent`](crate::AttributeValue::Absent), a finder with no
//! match returns an empty `Vec`, and an unknown URI looks up as `None`.

use std::path::PathBuf;

use activerdf_store::StoreError;
use thiserror::Error;

use crate::kind::ValueKind;

/// Result alias for mapping operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Mapping engine error.
#[derive(Debug, Error)]
pub enum Error {
    /// The attribute is not declared on the resource's kind.
    #[error("kind `{kind}` has no attribute `{attribute}`")]
    UnknownAttribute {
        /// Kind name.
        kind: String,
        /// Requested attribute.
        attribute: String,
    },

    /// A mutation was attempted on a deleted resource.
    #[error("resource <{uri}> has been deleted and is frozen")]
    FrozenResource {
        /// URI of the deleted resource.
        uri: String,
    },

    /// The storage adapter failed. The cause is kept intact.
    #[error("adapter failure: {0}")]
    Adapter(#[from] StoreError),

    /// A literal was given for a resource-valued attribute or the reverse.
    #[error("attribute `{attribute}` expects a {expected} value")]
    ValueKindMismatch {
        /// Attribute name.
        attribute: String,
        /// What the declaration asks for.
        expected: ValueKind,
    },

    /// A method-style finder name could not be translated.
    #[error("invalid finder: {0}")]
    InvalidFinder(String),

    /// No kind with this name is declared in the session schema.
    #[error("unknown kind `{0}`")]
    UnknownKind(String),

    /// A session configuration file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A session configuration file could not be decoded.
    #[error("invalid session configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn unknown_attribute(kind: &str, attribute: &str) -> Self {
        Error::UnknownAttribute {
            kind: kind.to_owned(),
            attribute: attribute.to_owned(),
        }
    }

    pub(crate) fn frozen(uri: &str) -> Self {
        Error::FrozenResource {
            uri: uri.to_owned(),
        }
    }
}
