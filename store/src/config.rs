//! Connection parameters.
//!
//! The mapping engine treats these as an opaque capability: it reads the
//! context name and hands the rest to [`ConnectionParams::open`]. Keys the
//! selected adapter does not know are kept in [`ConnectionParams::options`].
//!
//! ```toml
//! adapter = "memory"
//! context = "test_create_person"
//! seed = "people.nt"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::adapter::TripleStore;
use crate::error::{Result, StoreError};
use crate::memory::MemoryStore;

/// Store kind selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// Process-local [`MemoryStore`].
    #[default]
    Memory,
    /// YARS over HTTP. Recognised but not implemented.
    Yars,
    /// Redland. Recognised but not implemented.
    Redland,
}

impl AdapterKind {
    /// Returns the string used in configuration files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AdapterKind::Memory => "memory",
            AdapterKind::Yars => "yars",
            AdapterKind::Redland => "redland",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for opening a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Which adapter to open.
    #[serde(default)]
    pub adapter: AdapterKind,
    /// Store host, for networked adapters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Store port, for networked adapters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Context (named graph) every read and write is scoped to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// N-Triples file loaded into the context when the store is opened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<PathBuf>,
    /// Adapter-specific keys, passed through untouched.
    #[serde(flatten)]
    pub options: BTreeMap<String, toml::Value>,
}

impl ConnectionParams {
    /// Parameters for an empty in-memory store in the default graph.
    #[must_use]
    pub fn memory() -> Self {
        Self::default()
    }

    /// Sets the context.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Sets the seed file.
    #[must_use]
    pub fn with_seed(mut self, seed: impl Into<PathBuf>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    /// Decodes parameters from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the document does not decode.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Reads parameters from a TOML file. A relative `seed` is taken relative
    /// to the file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        let mut params = Self::from_toml_str(&content)?;
        if let Some(dir) = path.parent() {
            params.resolve_relative(dir);
        }
        Ok(params)
    }

    /// Rebases a relative `seed` path onto `base`.
    pub fn resolve_relative(&mut self, base: &Path) {
        if let Some(seed) = &self.seed {
            if seed.is_relative() {
                self.seed = Some(base.join(seed));
            }
        }
    }

    /// Returns the context as a borrowed option.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Opens the selected adapter.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnsupportedAdapter`] for adapter kinds without an
    /// implementation, or an I/O / parse error if the seed file fails to load.
    pub fn open(&self) -> Result<Arc<dyn TripleStore>> {
        match self.adapter {
            AdapterKind::Memory => {
                let store = MemoryStore::new();
                if let Some(seed) = &self.seed {
                    let added = store.load_file(seed, self.context())?;
                    info!(seed = %seed.display(), context = ?self.context(), added, "seeded memory store");
                }
                Ok(Arc::new(store))
            }
            other => Err(StoreError::UnsupportedAdapter(other.to_string())),
        }
    }
}
