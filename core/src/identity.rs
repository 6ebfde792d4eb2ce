//! Identity map: one handle per URI per session.
//!
//! Lookups of known URIs share a read lock. Registering an unseen URI takes
//! the write lock and re-checks under it, so two callers racing on the same
//! URI observe the same handle.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::kind::Kind;
use crate::resource::Resource;

/// URI-keyed cache of resource handles.
#[derive(Debug, Default)]
pub struct IdentityMap {
    entries: RwLock<BTreeMap<String, Resource>>,
}

impl IdentityMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `uri`, creating it as `kind` if the URI is
    /// unseen.
    ///
    /// A handle held as the generic kind is upgraded to a declared `kind`.
    /// A declared kind is never downgraded to the generic one.
    pub fn resolve(&self, uri: &str, kind: &Arc<Kind>) -> Resource {
        let found = self.entries.read().get(uri).cloned();
        let resource = match found {
            Some(found) => found,
            None => self
                .entries
                .write()
                .entry(uri.to_owned())
                .or_insert_with(|| {
                    debug!(uri, kind = %kind.name, "identity map miss");
                    Resource::new(uri, Arc::clone(kind))
                })
                .clone(),
        };
        if !kind.is_generic() && resource.kind().is_generic() {
            debug!(uri, kind = %kind.name, "upgrading generic handle");
            resource.rebind(kind);
        }
        resource
    }

    /// Returns the handle for `uri` bound to `kind`, whatever declared kind
    /// it was mapped as before. Used where the store has confirmed
    /// `rdf:type`. The generic kind still never displaces a declared one.
    pub fn resolve_as(&self, uri: &str, kind: &Arc<Kind>) -> Resource {
        let resource = self.resolve(uri, kind);
        let current = resource.kind();
        if !kind.is_generic() && current.name != kind.name {
            debug!(uri, from = %current.name, to = %kind.name, "rebinding handle");
            resource.rebind(kind);
        }
        resource
    }

    /// Returns the handle for `uri` if one is registered.
    #[must_use]
    pub fn get(&self, uri: &str) -> Option<Resource> {
        self.entries.read().get(uri).cloned()
    }

    /// Returns true if a handle is registered for `uri`.
    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        self.entries.read().contains_key(uri)
    }

    /// Registers `resource` under its URI, returning the handle it displaced.
    pub fn register(&self, resource: Resource) -> Option<Resource> {
        self.entries
            .write()
            .insert(resource.uri().to_owned(), resource)
    }

    /// Removes whatever handle is registered for `uri`.
    pub fn evict(&self, uri: &str) -> Option<Resource> {
        self.entries.write().remove(uri)
    }

    /// Removes `resource` only if it is the handle registered for its URI.
    pub fn evict_handle(&self, resource: &Resource) -> bool {
        let mut entries = self.entries.write();
        match entries.get(resource.uri()) {
            Some(current) if current.ptr_eq(resource) => {
                entries.remove(resource.uri());
                true
            }
            _ => false,
        }
    }

    /// Every registered handle, ordered by URI.
    #[must_use]
    pub fn all(&self) -> Vec<Resource> {
        self.entries.read().values().cloned().collect()
    }

    /// Every registered handle of the named kind, ordered by URI.
    #[must_use]
    pub fn all_of(&self, kind: &str) -> Vec<Resource> {
        self.entries
            .read()
            .values()
            .filter(|r| r.kind().name == kind)
            .cloned()
            .collect()
    }

    /// Number of registered handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops every handle.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
