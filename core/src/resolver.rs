//! Attribute resolution.
//!
//! Reads `(resource, predicate, ?)` from the store and turns each object
//! into a [`Value`]: literals verbatim, URIs through the identity map as the
//! declared range kind.

use activerdf_store::{Literal, Term, TriplePattern};
use tracing::warn;

use crate::error::Result;
use crate::kind::AttributeDecl;
use crate::resource::{AttributeValue, Resource, Value};
use crate::session::Session;

/// Attribute name addressing a resource's URI. Reads return it as a literal;
/// writes to it are ignored.
pub const URI_ATTRIBUTE: &str = "uri";

impl Session {
    /// Reads an attribute.
    ///
    /// No matching triple gives [`AttributeValue::Absent`], one gives
    /// [`AttributeValue::One`], more give [`AttributeValue::Many`] in the
    /// adapter's order. A resource with no triples at all reads as absent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownAttribute`] if the resource's kind does not
    /// declare `attribute`, or [`crate::Error::Adapter`] if the store fails.
    pub fn get(&self, resource: &Resource, attribute: &str) -> Result<AttributeValue> {
        if attribute == URI_ATTRIBUTE {
            return Ok(AttributeValue::One(Value::Literal(Literal::plain(
                resource.uri(),
            ))));
        }
        let kind = resource.kind();
        let decl = kind.require(attribute)?;
        Ok(AttributeValue::from_values(self.fetch(resource, decl)?))
    }

    /// Reads an attribute as a flat list, whatever the number of matches.
    ///
    /// # Errors
    ///
    /// Same as [`Session::get`].
    pub fn get_all(&self, resource: &Resource, attribute: &str) -> Result<Vec<Value>> {
        Ok(self.get(resource, attribute)?.into_vec())
    }

    /// Reads the lexical form of the first literal value of an attribute.
    ///
    /// # Errors
    ///
    /// Same as [`Session::get`].
    pub fn get_str(&self, resource: &Resource, attribute: &str) -> Result<Option<String>> {
        Ok(self
            .get(resource, attribute)?
            .iter()
            .find_map(Value::as_str)
            .map(str::to_owned))
    }

    /// Reads every declared attribute of the resource's kind, in declaration
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Adapter`] if the store fails.
    pub fn attributes(&self, resource: &Resource) -> Result<Vec<(String, AttributeValue)>> {
        let kind = resource.kind();
        kind.attributes
            .iter()
            .map(|decl| {
                let values = self.fetch(resource, decl)?;
                Ok((decl.name.clone(), AttributeValue::from_values(values)))
            })
            .collect()
    }

    fn fetch(&self, resource: &Resource, decl: &AttributeDecl) -> Result<Vec<Value>> {
        let pattern = TriplePattern::any()
            .with_subject(resource.uri())
            .with_predicate(&decl.predicate);
        let triples = self.query(&pattern)?;
        let range = self.schema.range_of(decl);
        Ok(triples
            .into_iter()
            .map(|t| match t.object {
                Term::Uri(uri) => {
                    if !decl.is_resource() {
                        warn!(subject = resource.uri(), attribute = %decl.name, object = %uri,
                            "resource found on a literal-valued attribute");
                        return Value::Resource(self.identity.resolve(&uri, &self.schema.generic()));
                    }
                    Value::Resource(self.identity.resolve(&uri, &range))
                }
                Term::Literal(lit) => {
                    if decl.is_resource() {
                        warn!(subject = resource.uri(), attribute = %decl.name, literal = %lit,
                            "literal found on a resource-valued attribute");
                    }
                    Value::Literal(lit)
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use activerdf_store::{MemoryStore, Triple, TripleStore};

    use super::*;
    use crate::error::Error;
    use crate::kind::{Kind, Schema};

    const NS: &str = "http://ex.org/";

    fn session() -> (Session, Arc<Kind>) {
        let person = Kind::new("Person", format!("{NS}Person"))
            .with(AttributeDecl::literal("name", format!("{NS}name")))
            .with(AttributeDecl::literal("age", format!("{NS}age")))
            .with(AttributeDecl::resource("knows", format!("{NS}knows"), "Person").multi());
        let store = MemoryStore::new();
        for (s, p, o) in [
            ("a", "name", Term::literal("renaud")),
            ("a", "age", Term::literal("23")),
            ("a", "knows", Term::uri(format!("{NS}b"))),
            ("b", "knows", Term::uri(format!("{NS}a"))),
            ("b", "knows", Term::uri(format!("{NS}c"))),
            ("c", "name", Term::uri(format!("{NS}odd"))),
            ("c", "knows", Term::literal("not a uri")),
        ] {
            store
                .insert(&Triple::new(format!("{NS}{s}"), format!("{NS}{p}"), o), None)
                .unwrap();
        }
        let mut schema = Schema::new();
        let person = schema.register(person);
        (Session::new(Arc::new(store), schema), person)
    }

    #[test]
    fn literals_are_verbatim() {
        let (session, person) = session();
        let a = session.resolve(&format!("{NS}a"), &person);
        assert_eq!(session.get(&a, "name").unwrap().as_str(), Some("renaud"));
        assert_eq!(session.get(&a, "age").unwrap().as_str(), Some("23"));
        assert_eq!(session.get_str(&a, "age").unwrap().as_deref(), Some("23"));
    }

    #[test]
    fn resources_go_through_identity_map() {
        let (session, person) = session();
        let a = session.resolve(&format!("{NS}a"), &person);
        let b = session.get(&a, "knows").unwrap();
        let b = b.as_resource().unwrap();
        assert_eq!(b.kind().name, "Person");
        let back = session.get(b, "knows").unwrap();
        let back = back.as_many().unwrap();
        assert_eq!(back[0].as_resource(), Some(&a));
    }

    #[test]
    fn absent_is_not_an_error() {
        let (session, person) = session();
        let nobody = session.resolve(&format!("{NS}nobody"), &person);
        assert!(session.get(&nobody, "name").unwrap().is_absent());
        assert!(session.get_all(&nobody, "knows").unwrap().is_empty());
        assert_eq!(session.get_str(&nobody, "name").unwrap(), None);
    }

    #[test]
    fn unknown_attribute() {
        let (session, person) = session();
        let a = session.resolve(&format!("{NS}a"), &person);
        assert!(matches!(
            session.get(&a, "email"),
            Err(Error::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn uri_reads_as_literal() {
        let (session, person) = session();
        let a = session.resolve(&format!("{NS}a"), &person);
        assert_eq!(
            session.get(&a, URI_ATTRIBUTE).unwrap().as_str(),
            Some("http://ex.org/a")
        );
    }

    #[test]
    fn mismatched_stored_values_are_returned_as_found() {
        let (session, person) = session();
        let c = session.resolve(&format!("{NS}c"), &person);
        let name = session.get(&c, "name").unwrap();
        assert_eq!(
            name.as_resource().map(|r| r.kind().name.clone()).as_deref(),
            Some("Resource")
        );
        assert_eq!(session.get(&c, "knows").unwrap().as_str(), Some("not a uri"));
    }

    #[test]
    fn attributes_in_declaration_order() {
        let (session, person) = session();
        let a = session.resolve(&format!("{NS}a"), &person);
        let attrs = session.attributes(&a).unwrap();
        let names: Vec<&str> = attrs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["name", "age", "knows"]);
        assert_eq!(attrs[0].1.as_str(), Some("renaud"));
    }
}
