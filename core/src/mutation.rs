//! Mutation engine: attribute writes, creation and deletion.
//!
//! Every write goes straight to the store. Writers to one URI are serialized
//! by a per-URI lock held for the whole store round-trip; the last writer
//! wins.

use std::sync::Arc;

use activerdf_store::{iris, Term, TriplePattern};
use tracing::debug;

use crate::error::{Error, Result};
use crate::kind::Kind;
use crate::resolver::URI_ATTRIBUTE;
use crate::resource::{AttributeValue, Resource};
use crate::session::{DeletePolicy, Session};

/// Initial attribute values for [`Session::create_with`], in write order.
#[derive(Debug, Clone, Default)]
pub struct Attributes(Vec<(String, AttributeValue)>);

impl Attributes {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an attribute value.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.0.push((name.into(), value.into()));
        self
    }
}

impl IntoIterator for Attributes {
    type Item = (String, AttributeValue);
    type IntoIter = std::vec::IntoIter<(String, AttributeValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Session {
    /// Replaces the values of an attribute.
    ///
    /// Deletes every `(uri, predicate, *)` triple, then inserts one triple per
    /// element of `value`. [`AttributeValue::Absent`] clears the attribute.
    /// Writing the `uri` attribute is silently ignored: a resource's URI is
    /// fixed at construction.
    ///
    /// The delete and the inserts are separate store calls. If an insert
    /// fails, the attribute is left cleared or partially written rather than
    /// restored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrozenResource`] on a deleted resource,
    /// [`Error::UnknownAttribute`] for an undeclared attribute,
    /// [`Error::ValueKindMismatch`] if a value does not fit the declaration,
    /// or [`Error::Adapter`] if the store fails.
    pub fn set(
        &self,
        resource: &Resource,
        attribute: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<()> {
        self.write(resource, attribute, value.into(), true)
    }

    /// Adds values to an attribute without removing existing ones.
    ///
    /// # Errors
    ///
    /// Same as [`Session::set`].
    pub fn add(
        &self,
        resource: &Resource,
        attribute: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<()> {
        self.write(resource, attribute, value.into(), false)
    }

    fn write(
        &self,
        resource: &Resource,
        attribute: &str,
        value: AttributeValue,
        replace: bool,
    ) -> Result<()> {
        if resource.is_frozen() {
            return Err(Error::frozen(resource.uri()));
        }
        if attribute == URI_ATTRIBUTE {
            debug!(uri = resource.uri(), "ignoring write to the uri attribute");
            return Ok(());
        }
        let kind = resource.kind();
        let decl = kind.require(attribute)?;
        let objects = decl.objects(&value)?;

        let lock = self.locks.lock_for(resource.uri());
        let _guard = lock.lock();
        if resource.is_frozen() {
            return Err(Error::frozen(resource.uri()));
        }
        let removed = if replace {
            self.remove(
                &TriplePattern::any()
                    .with_subject(resource.uri())
                    .with_predicate(&decl.predicate),
            )?
        } else {
            0
        };
        let mut inserted = 0;
        for object in objects {
            if self.insert(resource.uri(), &decl.predicate, object)? {
                inserted += 1;
            }
        }
        debug!(uri = resource.uri(), attribute, removed, inserted, "attribute written");
        Ok(())
    }

    /// Creates (or finds) the resource at `uri` as `kind` without initial
    /// attributes.
    ///
    /// # Errors
    ///
    /// Same as [`Session::create_with`].
    pub fn create(&self, kind: &Arc<Kind>, uri: &str) -> Result<Resource> {
        self.create_with(kind, uri, Attributes::new())
    }

    /// Creates the resource at `uri` as `kind` and writes `initial` with
    /// [`Session::set`] semantics.
    ///
    /// If the URI is already known, the existing handle is returned and the
    /// triples already in the store stay visible through it, now mapped as
    /// `kind`. The type triple `(uri, rdf:type, kind.class)` is asserted if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrozenResource`] if the registered handle was deleted
    /// concurrently, any error [`Session::set`] returns for an initial
    /// attribute, or [`Error::Adapter`] if the store fails.
    pub fn create_with(&self, kind: &Arc<Kind>, uri: &str, initial: Attributes) -> Result<Resource> {
        let resource = self.identity.resolve_as(uri, kind);
        {
            let lock = self.locks.lock_for(uri);
            let _guard = lock.lock();
            if resource.is_frozen() {
                return Err(Error::frozen(uri));
            }
            let typed = self.insert(uri, iris::RDF_TYPE, Term::uri(&kind.class))?;
            debug!(uri, kind = %kind.name, typed, "resource created");
        }
        for (name, value) in initial {
            self.set(&resource, &name, value)?;
        }
        Ok(resource)
    }

    /// Deletes a resource.
    ///
    /// Removes every triple with the resource as subject, and with
    /// [`DeletePolicy::Cascade`] every triple with it as object. The handle
    /// is then frozen and evicted from the identity map. Returns the number of
    /// triples removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrozenResource`] if the resource was already deleted,
    /// or [`Error::Adapter`] if the store fails. On a store failure the handle
    /// is left live.
    pub fn delete(&self, resource: &Resource) -> Result<usize> {
        let uri = resource.uri();
        let lock = self.locks.lock_for(uri);
        let _guard = lock.lock();
        if resource.is_frozen() {
            return Err(Error::frozen(uri));
        }
        let mut removed = self.remove(&TriplePattern::any().with_subject(uri))?;
        if self.options.delete_policy == DeletePolicy::Cascade {
            removed += self.remove(&TriplePattern::any().with_object(Term::uri(uri)))?;
        }
        resource.freeze();
        self.identity.evict_handle(resource);
        debug!(uri, removed, policy = ?self.options.delete_policy, "resource deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use activerdf_store::{MemoryStore, StoreError, Triple, TripleStore};

    use super::*;
    use crate::kind::{AttributeDecl, Schema, ValueKind};
    use crate::resource::Value;
    use crate::session::SessionOptions;

    const NS: &str = "http://ex.org/";

    fn schema() -> (Schema, Arc<Kind>) {
        let mut schema = Schema::new();
        let person = schema.register(
            Kind::new("Person", format!("{NS}Person"))
                .with(AttributeDecl::literal("name", format!("{NS}name")))
                .with(AttributeDecl::literal("age", format!("{NS}age")))
                .with(AttributeDecl::resource("knows", format!("{NS}knows"), "Person").multi()),
        );
        (schema, person)
    }

    fn session(policy: DeletePolicy) -> (Session, Arc<Kind>) {
        let (schema, person) = schema();
        let session = Session::new(Arc::new(MemoryStore::new()), schema)
            .with_options(SessionOptions {
                delete_policy: policy,
            });
        (session, person)
    }

    /// A memory store whose operations can be switched to fail.
    #[derive(Default)]
    struct FailingStore {
        inner: MemoryStore,
        fail_query: AtomicBool,
        fail_insert: AtomicBool,
        fail_delete: AtomicBool,
    }

    impl FailingStore {
        fn check(flag: &AtomicBool, op: &str) -> activerdf_store::Result<()> {
            if flag.load(Ordering::SeqCst) {
                return Err(StoreError::backend(format!("{op} refused")));
            }
            Ok(())
        }
    }

    impl TripleStore for FailingStore {
        fn query(
            &self,
            pattern: &TriplePattern,
            context: Option<&str>,
        ) -> activerdf_store::Result<Vec<Triple>> {
            Self::check(&self.fail_query, "query")?;
            self.inner.query(pattern, context)
        }

        fn insert(&self, triple: &Triple, context: Option<&str>) -> activerdf_store::Result<bool> {
            Self::check(&self.fail_insert, "insert")?;
            self.inner.insert(triple, context)
        }

        fn delete(
            &self,
            pattern: &TriplePattern,
            context: Option<&str>,
        ) -> activerdf_store::Result<usize> {
            Self::check(&self.fail_delete, "delete")?;
            self.inner.delete(pattern, context)
        }
    }

    fn failing_session() -> (Session, Arc<FailingStore>, Arc<Kind>) {
        let (schema, person) = schema();
        let store = Arc::new(FailingStore::default());
        let session = Session::new(Arc::clone(&store) as Arc<dyn TripleStore>, schema);
        (session, store, person)
    }

    #[test]
    fn set_replaces_previous_values() {
        let (session, person) = session(DeletePolicy::SubjectOnly);
        let a = session.create(&person, &format!("{NS}a")).unwrap();
        session.set(&a, "age", "23").unwrap();
        session.set(&a, "age", 24_i64).unwrap();
        assert_eq!(session.get(&a, "age").unwrap().as_str(), Some("24"));
    }

    #[test]
    fn sequence_writes_one_triple_each_and_add_appends() {
        let (session, person) = session(DeletePolicy::SubjectOnly);
        let a = session.create(&person, &format!("{NS}a")).unwrap();
        let b = session.create(&person, &format!("{NS}b")).unwrap();
        let c = session.create(&person, &format!("{NS}c")).unwrap();
        session.set(&a, "knows", [&b, &c]).unwrap();
        assert_eq!(session.get(&a, "knows").unwrap().len(), 2);
        session.set(&a, "knows", &b).unwrap();
        assert_eq!(session.get(&a, "knows").unwrap().as_resource(), Some(&b));
        session.add(&a, "knows", &c).unwrap();
        assert_eq!(session.get(&a, "knows").unwrap().len(), 2);
    }

    #[test]
    fn absent_clears() {
        let (session, person) = session(DeletePolicy::SubjectOnly);
        let a = session
            .create_with(&person, &format!("{NS}a"), Attributes::new().with("name", "x"))
            .unwrap();
        session.set(&a, "name", AttributeValue::Absent).unwrap();
        assert!(session.get(&a, "name").unwrap().is_absent());
    }

    #[test]
    fn uri_write_is_ignored() {
        let (session, person) = session(DeletePolicy::SubjectOnly);
        let a = session.create(&person, &format!("{NS}a")).unwrap();
        let before = session.export().unwrap();
        session.set(&a, "uri", "http://false_uri").unwrap();
        assert_eq!(a.uri(), "http://ex.org/a");
        assert_eq!(session.export().unwrap(), before);
    }

    #[test]
    fn kind_mismatch_writes_nothing() {
        let (session, person) = session(DeletePolicy::SubjectOnly);
        let a = session
            .create_with(&person, &format!("{NS}a"), Attributes::new().with("name", "x"))
            .unwrap();
        assert!(matches!(
            session.set(&a, "knows", "not a resource"),
            Err(Error::ValueKindMismatch { expected: ValueKind::Resource, .. })
        ));
        assert!(matches!(
            session.set(&a, "name", &a),
            Err(Error::ValueKindMismatch { expected: ValueKind::Literal, .. })
        ));
        assert_eq!(session.get(&a, "name").unwrap().as_str(), Some("x"));
    }

    #[test]
    fn create_asserts_type_once() {
        let (session, person) = session(DeletePolicy::SubjectOnly);
        let a = session.create(&person, &format!("{NS}a")).unwrap();
        let again = session.create(&person, &format!("{NS}a")).unwrap();
        assert_eq!(a, again);
        let typed = session
            .store()
            .query(
                &TriplePattern::any()
                    .with_subject(format!("{NS}a"))
                    .with_predicate(iris::RDF_TYPE),
                None,
            )
            .unwrap();
        assert_eq!(typed.len(), 1);
    }

    #[test]
    fn delete_freezes_and_evicts() {
        let (session, person) = session(DeletePolicy::SubjectOnly);
        let a = session
            .create_with(
                &person,
                &format!("{NS}a"),
                Attributes::new().with("name", "new person").with("age", "20"),
            )
            .unwrap();
        assert_eq!(session.delete(&a).unwrap(), 3);
        assert!(a.is_frozen());
        assert!(session.identity().get(a.uri()).is_none());
        assert!(session.lookup(a.uri()).unwrap().is_none());
        assert!(matches!(
            session.set(&a, "name", "ghost"),
            Err(Error::FrozenResource { .. })
        ));
        assert!(matches!(session.delete(&a), Err(Error::FrozenResource { .. })));
    }

    #[test]
    fn subject_only_leaves_dangling_references() {
        let (session, person) = session(DeletePolicy::SubjectOnly);
        let a = session.create(&person, &format!("{NS}a")).unwrap();
        let b = session.create(&person, &format!("{NS}b")).unwrap();
        session.set(&a, "knows", &b).unwrap();
        session.delete(&b).unwrap();
        let dangling = session.get(&a, "knows").unwrap();
        let fresh = dangling.as_resource().unwrap();
        assert_eq!(fresh.uri(), b.uri());
        assert_ne!(fresh, &b);
        assert!(!fresh.is_frozen());
    }

    #[test]
    fn cascade_removes_inbound_references() {
        let (session, person) = session(DeletePolicy::Cascade);
        let a = session.create(&person, &format!("{NS}a")).unwrap();
        let b = session.create(&person, &format!("{NS}b")).unwrap();
        session.set(&a, "knows", &b).unwrap();
        assert_eq!(session.delete(&b).unwrap(), 2);
        assert!(session.get(&a, "knows").unwrap().is_absent());
    }

    #[test]
    fn attributes_builder_preserves_order() {
        let attrs = Attributes::new().with("name", "a").with("age", 3_i64);
        let names: Vec<String> = attrs.into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["name", "age"]);
    }

    #[test]
    fn concurrent_writers_leave_one_value() {
        let (session, person) = session(DeletePolicy::SubjectOnly);
        let a = session.create(&person, &format!("{NS}a")).unwrap();
        std::thread::scope(|s| {
            for n in 0..8_i64 {
                let session = &session;
                let a = &a;
                s.spawn(move || session.set(a, "age", n).unwrap());
            }
        });
        let age = session.get(&a, "age").unwrap();
        assert!(matches!(age, AttributeValue::One(Value::Literal(_))));
    }

    #[test]
    fn store_failure_on_read_is_an_adapter_error() {
        let (session, store, person) = failing_session();
        let a = session
            .create_with(&person, &format!("{NS}a"), Attributes::new().with("name", "x"))
            .unwrap();
        store.fail_query.store(true, Ordering::SeqCst);
        assert!(matches!(
            session.get(&a, "name"),
            Err(Error::Adapter(StoreError::Backend(_)))
        ));
        assert!(matches!(
            session.find(&person, &[crate::finder::Condition::new("name", "x")]),
            Err(Error::Adapter(StoreError::Backend(_)))
        ));
        assert!(matches!(session.find_all(&person), Err(Error::Adapter(_))));
    }

    #[test]
    fn failed_insert_leaves_attribute_cleared() {
        let (session, store, person) = failing_session();
        let a = session
            .create_with(&person, &format!("{NS}a"), Attributes::new().with("name", "old"))
            .unwrap();
        store.fail_insert.store(true, Ordering::SeqCst);
        assert!(matches!(
            session.set(&a, "name", "new"),
            Err(Error::Adapter(StoreError::Backend(_)))
        ));
        store.fail_insert.store(false, Ordering::SeqCst);
        assert!(session.get(&a, "name").unwrap().is_absent());
    }

    #[test]
    fn failed_delete_leaves_handle_live() {
        let (session, store, person) = failing_session();
        let a = session
            .create_with(&person, &format!("{NS}a"), Attributes::new().with("name", "x"))
            .unwrap();
        store.fail_delete.store(true, Ordering::SeqCst);
        assert!(matches!(session.delete(&a), Err(Error::Adapter(_))));
        assert!(!a.is_frozen());
        assert_eq!(session.identity().get(a.uri()), Some(a.clone()));
        store.fail_delete.store(false, Ordering::SeqCst);
        assert_eq!(session.get(&a, "name").unwrap().as_str(), Some("x"));
        assert_eq!(session.delete(&a).unwrap(), 2);
    }

    #[test]
    fn delete_keeps_the_uri_lock() {
        let (session, person) = session(DeletePolicy::SubjectOnly);
        let uri = format!("{NS}a");
        let a = session.create(&person, &uri).unwrap();
        let before = session.locks.lock_for(&uri);
        session.delete(&a).unwrap();
        assert!(Arc::ptr_eq(&before, &session.locks.lock_for(&uri)));
    }

    #[test]
    fn create_refuses_a_frozen_registered_handle() {
        let (session, person) = session(DeletePolicy::SubjectOnly);
        let uri = format!("{NS}a");
        let a = session.create(&person, &uri).unwrap();
        session.delete(&a).unwrap();
        session.identity().register(a.clone());
        assert!(matches!(
            session.create(&person, &uri),
            Err(Error::FrozenResource { .. })
        ));
        assert!(session.export().unwrap().is_empty());
    }

    #[test]
    fn create_rebinds_a_generic_handle() {
        let (session, person) = session(DeletePolicy::SubjectOnly);
        let uri = format!("{NS}a");
        let early = session.resolve(&uri, &session.schema().generic());
        assert!(matches!(
            session.get(&early, "name"),
            Err(Error::UnknownAttribute { .. })
        ));
        let created = session
            .create_with(&person, &uri, Attributes::new().with("name", "x"))
            .unwrap();
        assert!(created.ptr_eq(&early));
        assert_eq!(early.kind().name, "Person");
        assert_eq!(session.get(&early, "name").unwrap().as_str(), Some("x"));
    }
}
