//! The session: one store handle, one context, one identity map.
//!
//! Everything a client does goes through a [`Session`]. There is no ambient
//! registry; two sessions over the same store have independent identity maps
//! and hand out independent handles.
//!
//! The attribute resolver, the mutation engine and the finder synthesizer
//! are `impl Session` blocks in their own modules.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use activerdf_store::{iris, ConnectionParams, Term, Triple, TriplePattern, TripleStore};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};
use crate::identity::IdentityMap;
use crate::kind::{Kind, Schema};
use crate::resource::Resource;

/// What [`Session::delete`] removes besides the resource's own triples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeletePolicy {
    /// Remove `(uri, *, *)` only. Triples elsewhere that point at the deleted
    /// resource are left dangling.
    #[default]
    SubjectOnly,
    /// Also remove `(*, *, uri)`.
    Cascade,
}

/// Tunables of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Referential cleanup on delete.
    #[serde(default)]
    pub delete_policy: DeletePolicy,
}

/// A session declared in TOML: connection, options and kinds.
///
/// ```toml
/// [connection]
/// adapter = "memory"
/// context = "test_create_person"
///
/// [session]
/// delete_policy = "cascade"
///
/// [[kinds]]
/// name = "Person"
/// class = "http://m3pe.org/activerdf/test/Person"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// Store to open.
    #[serde(default)]
    pub connection: ConnectionParams,
    /// Session tunables.
    #[serde(default)]
    pub session: SessionOptions,
    /// Kind declarations.
    #[serde(default)]
    pub kinds: Vec<Kind>,
}

impl SessionConfig {
    /// Decodes a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the document does not decode.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Reads a configuration file. A relative seed path is taken relative to
    /// the file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or [`Error::Config`]
    /// if it does not decode.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        if let Some(dir) = path.parent() {
            config.connection.resolve_relative(dir);
        }
        Ok(config)
    }

    /// Opens the store and builds the session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Adapter`] if the store cannot be opened.
    pub fn open(self) -> Result<Session> {
        let schema = Schema::from_kinds(self.kinds);
        Ok(Session::connect(&self.connection, schema)?.with_options(self.session))
    }
}

/// Per-URI write locks.
///
/// Writers to the same URI queue up; writers to different URIs do not
/// contend beyond the short map lookup.
///
/// An entry is created on the first write to a URI and lives as long as the
/// session, so every writer of a URI contends on one mutex, including writers
/// racing a delete. Memory grows with the number of distinct URIs written.
#[derive(Debug, Default)]
pub(crate) struct WriteLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl WriteLocks {
    pub(crate) fn lock_for(&self, uri: &str) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.lock().entry(uri.to_owned()).or_default())
    }
}

/// A mapping session over one store and one context.
pub struct Session {
    pub(crate) store: Arc<dyn TripleStore>,
    pub(crate) context: Option<String>,
    pub(crate) schema: Schema,
    pub(crate) identity: IdentityMap,
    pub(crate) locks: WriteLocks,
    pub(crate) options: SessionOptions,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("context", &self.context)
            .field("kinds", &self.schema.len())
            .field("resources", &self.identity.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a session over `store` in the default graph.
    pub fn new(store: Arc<dyn TripleStore>, schema: Schema) -> Self {
        Self {
            store,
            context: None,
            schema,
            identity: IdentityMap::new(),
            locks: WriteLocks::default(),
            options: SessionOptions::default(),
        }
    }

    /// Opens the store described by `params`, scoped to its context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Adapter`] if the adapter cannot be opened.
    pub fn connect(params: &ConnectionParams, schema: Schema) -> Result<Self> {
        let store = params.open()?;
        let session = Self::new(store, schema);
        Ok(match params.context() {
            Some(context) => session.with_context(context),
            None => session,
        })
    }

    /// Scopes the session to a context.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Replaces the session options.
    #[must_use]
    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn TripleStore> {
        &self.store
    }

    /// The context reads and writes are scoped to.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// The declared kinds.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The identity map.
    #[must_use]
    pub fn identity(&self) -> &IdentityMap {
        &self.identity
    }

    /// The session options.
    #[must_use]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Looks up a kind by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownKind`] if no such kind is declared.
    pub fn kind(&self, name: &str) -> Result<Arc<Kind>> {
        self.schema
            .kind(name)
            .ok_or_else(|| Error::UnknownKind(name.to_owned()))
    }

    /// Returns the handle for `uri` without consulting the store, creating it
    /// as `kind` if the URI is unseen. A handle held as the generic kind is
    /// upgraded to `kind`.
    pub fn resolve(&self, uri: &str, kind: &Arc<Kind>) -> Resource {
        self.identity.resolve(uri, kind)
    }

    /// Resolve-by-URI. Returns the registered handle, or a new one if the
    /// store holds any triple about `uri`, or `None`.
    ///
    /// A new handle, or one held as the generic kind, takes the first declared
    /// kind among the resource's `rdf:type` values, falling back to the
    /// generic kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Adapter`] if the store fails.
    pub fn lookup(&self, uri: &str) -> Result<Option<Resource>> {
        let cached = self.identity.get(uri);
        if cached.as_ref().is_some_and(|r| !r.kind().is_generic()) {
            return Ok(cached);
        }
        let triples = self.query(&TriplePattern::any().with_subject(uri))?;
        if triples.is_empty() {
            return Ok(cached);
        }
        let kind = triples
            .iter()
            .filter(|t| t.predicate == iris::RDF_TYPE)
            .filter_map(|t| t.object.as_uri())
            .find_map(|class| self.schema.by_class(class))
            .unwrap_or_else(|| self.schema.generic());
        Ok(Some(self.identity.resolve(uri, &kind)))
    }

    /// Every handle currently in the identity map.
    #[must_use]
    pub fn resources(&self) -> Vec<Resource> {
        self.identity.all()
    }

    /// Every triple in the session context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Adapter`] if the store fails.
    pub fn export(&self) -> Result<Vec<Triple>> {
        Ok(self.store.export(self.context())?)
    }

    pub(crate) fn query(&self, pattern: &TriplePattern) -> Result<Vec<Triple>> {
        trace!(%pattern, context = ?self.context, "query");
        Ok(self.store.query(pattern, self.context())?)
    }

    pub(crate) fn insert(&self, subject: &str, predicate: &str, object: Term) -> Result<bool> {
        let triple = Triple::new(subject, predicate, object);
        trace!(subject, predicate, object = %triple.object, context = ?self.context, "insert");
        Ok(self.store.insert(&triple, self.context())?)
    }

    pub(crate) fn remove(&self, pattern: &TriplePattern) -> Result<usize> {
        trace!(%pattern, context = ?self.context, "delete");
        Ok(self.store.delete(pattern, self.context())?)
    }
}
