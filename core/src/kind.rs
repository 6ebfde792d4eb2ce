//! Kind declarations.
//!
//! A [`Kind`] is the data-driven replacement for a class with generated
//! accessors: a table from attribute name to predicate URI, value kind and
//! cardinality. The resolver, the mutation engine and the finder all consult
//! it; nothing parses method names at runtime.
//!
//! Kinds deserialize from TOML, so a session can be declared in a file:
//!
//! ```toml
//! [[kinds]]
//! name = "Person"
//! class = "http://m3pe.org/activerdf/test/Person"
//!
//! [[kinds.attributes]]
//! name = "knows"
//! predicate = "http://m3pe.org/activerdf/test/knows"
//! value = "resource"
//! cardinality = "multi"
//! range = "Person"
//! ```

use std::fmt;
use std::sync::Arc;

use activerdf_store::{iris, Term};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::resource::{AttributeValue, Value};

/// Name of the generic kind every schema carries.
pub const GENERIC_KIND: &str = "Resource";

/// Whether an attribute holds literals or references to other resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Scalar literal values.
    #[default]
    Literal,
    /// URIs of other mapped resources.
    Resource,
}

impl ValueKind {
    /// Returns the string used in configuration files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Literal => "literal",
            ValueKind::Resource => "resource",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared cardinality of an attribute.
///
/// Reads do not depend on it: a read returns a bare value for exactly one
/// match and a sequence for more, whatever the declaration says.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// At most one value expected.
    #[default]
    Single,
    /// Any number of values.
    Multi,
}

/// One attribute of a kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDecl {
    /// Attribute name used by client code.
    pub name: String,
    /// Full IRI of the predicate.
    pub predicate: String,
    /// Literal or resource valued.
    #[serde(default)]
    pub value: ValueKind,
    /// Single or multi valued.
    #[serde(default)]
    pub cardinality: Cardinality,
    /// Kind name used to rehydrate resource values. `None` means the generic kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
}

impl AttributeDecl {
    /// Declares a single-valued literal attribute.
    pub fn literal(name: impl Into<String>, predicate: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            predicate: predicate.into(),
            value: ValueKind::Literal,
            cardinality: Cardinality::Single,
            range: None,
        }
    }

    /// Declares a single-valued resource attribute whose values are of kind `range`.
    pub fn resource(
        name: impl Into<String>,
        predicate: impl Into<String>,
        range: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            predicate: predicate.into(),
            value: ValueKind::Resource,
            cardinality: Cardinality::Single,
            range: Some(range.into()),
        }
    }

    /// Marks the attribute multi-valued.
    #[must_use]
    pub fn multi(mut self) -> Self {
        self.cardinality = Cardinality::Multi;
        self
    }

    /// Returns true for resource-valued attributes.
    #[must_use]
    pub fn is_resource(&self) -> bool {
        self.value == ValueKind::Resource
    }

    /// Converts a client value into the triple objects it stands for.
    ///
    /// Resources are compared by URI, so any handle for the right URI will do.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValueKindMismatch`] if an element does not fit the
    /// declared value kind.
    pub fn objects(&self, value: &AttributeValue) -> Result<Vec<Term>> {
        value
            .iter()
            .map(|v| match (self.value, v) {
                (ValueKind::Literal, Value::Literal(lit)) => Ok(Term::Literal(lit.clone())),
                (ValueKind::Resource, Value::Resource(r)) => Ok(Term::uri(r.uri())),
                (expected, _) => Err(Error::ValueKindMismatch {
                    attribute: self.name.clone(),
                    expected,
                }),
            })
            .collect()
    }
}

/// A resource kind, such as `Person`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kind {
    /// Kind name (e.g., `"Person"`).
    pub name: String,
    /// Full IRI of the RDF class instances are typed with.
    pub class: String,
    /// Declared attributes, in declaration order.
    #[serde(default)]
    pub attributes: Vec<AttributeDecl>,
}

impl Kind {
    /// Creates a kind without attributes.
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            attributes: Vec::new(),
        }
    }

    /// The kind used when nothing more specific is known about a resource.
    #[must_use]
    pub fn generic() -> Self {
        Self::new(GENERIC_KIND, iris::RDFS_RESOURCE)
    }

    /// Returns true for the generic `Resource` kind.
    #[must_use]
    pub fn is_generic(&self) -> bool {
        self.name == GENERIC_KIND
    }

    /// Adds an attribute declaration.
    #[must_use]
    pub fn with(mut self, attribute: AttributeDecl) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Looks up an attribute by name. Returns `None` if not declared.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeDecl> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Looks up an attribute by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAttribute`] if it is not declared.
    pub fn require(&self, name: &str) -> Result<&AttributeDecl> {
        self.attribute(name)
            .ok_or_else(|| Error::unknown_attribute(&self.name, name))
    }
}

/// The set of kinds known to a session.
///
/// Always contains the generic kind.
#[derive(Debug, Clone)]
pub struct Schema {
    kinds: Vec<Arc<Kind>>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl Schema {
    /// Creates a schema holding only the generic kind.
    #[must_use]
    pub fn new() -> Self {
        Self {
            kinds: vec![Arc::new(Kind::generic())],
        }
    }

    /// Builds a schema from kind declarations.
    pub fn from_kinds(kinds: impl IntoIterator<Item = Kind>) -> Self {
        let mut schema = Self::new();
        for kind in kinds {
            schema.register(kind);
        }
        schema
    }

    /// Adds a kind, replacing any kind with the same name, and returns the
    /// shared handle.
    pub fn register(&mut self, kind: Kind) -> Arc<Kind> {
        let kind = Arc::new(kind);
        match self.kinds.iter_mut().find(|k| k.name == kind.name) {
            Some(slot) => *slot = Arc::clone(&kind),
            None => self.kinds.push(Arc::clone(&kind)),
        }
        kind
    }

    /// Looks up a kind by name. Returns `None` if not declared.
    #[must_use]
    pub fn kind(&self, name: &str) -> Option<Arc<Kind>> {
        self.kinds.iter().find(|k| k.name == name).cloned()
    }

    /// Looks up a kind by its RDF class IRI. Returns `None` if not declared.
    #[must_use]
    pub fn by_class(&self, class: &str) -> Option<Arc<Kind>> {
        self.kinds.iter().find(|k| k.class == class).cloned()
    }

    /// The generic kind.
    #[must_use]
    pub fn generic(&self) -> Arc<Kind> {
        self.kind(GENERIC_KIND)
            .unwrap_or_else(|| Arc::new(Kind::generic()))
    }

    /// The kind resource values of `attribute` are rehydrated as.
    #[must_use]
    pub fn range_of(&self, attribute: &AttributeDecl) -> Arc<Kind> {
        attribute
            .range
            .as_deref()
            .and_then(|name| self.kind(name))
            .unwrap_or_else(|| self.generic())
    }

    /// Iterates over every declared kind.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Kind>> {
        self.kinds.iter()
    }

    /// Number of kinds, including the generic one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Always false; the generic kind is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Resource;
    use activerdf_store::Literal;

    const NS: &str = "http://ex.org/";

    fn person() -> Kind {
        Kind::new("Person", format!("{NS}Person"))
            .with(AttributeDecl::literal("name", format!("{NS}name")))
            .with(AttributeDecl::resource("knows", format!("{NS}knows"), "Person").multi())
    }

    #[test]
    fn attribute_lookup() {
        let kind = person();
        assert_eq!(kind.attribute("name").map(|a| a.value), Some(ValueKind::Literal));
        assert!(kind.require("knows").unwrap().is_resource());
        assert!(matches!(
            kind.require("email"),
            Err(Error::UnknownAttribute { kind, attribute }) if kind == "Person" && attribute == "email"
        ));
    }

    #[test]
    fn schema_always_has_generic_kind() {
        let schema = Schema::new();
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.generic().class, iris::RDFS_RESOURCE);
    }

    #[test]
    fn register_replaces_same_name() {
        let mut schema = Schema::from_kinds([person()]);
        assert_eq!(schema.len(), 2);
        schema.register(Kind::new("Person", format!("{NS}Human")));
        assert_eq!(schema.len(), 2);
        assert!(schema.by_class(&format!("{NS}Human")).is_some());
        assert!(schema.by_class(&format!("{NS}Person")).is_none());
    }

    #[test]
    fn range_falls_back_to_generic() {
        let schema = Schema::from_kinds([person()]);
        let knows = AttributeDecl::resource("knows", format!("{NS}knows"), "Person");
        assert_eq!(schema.range_of(&knows).name, "Person");
        let loose = AttributeDecl::resource("seeAlso", format!("{NS}seeAlso"), "Document");
        assert_eq!(schema.range_of(&loose).name, GENERIC_KIND);
    }

    #[test]
    fn objects_check_value_kind() {
        let kind = Arc::new(person());
        let name = kind.require("name").unwrap();
        assert_eq!(
            name.objects(&AttributeValue::from("renaud")).unwrap(),
            vec![Term::Literal(Literal::plain("renaud"))]
        );
        let other = Resource::new(format!("{NS}p9"), Arc::clone(&kind));
        assert!(matches!(
            name.objects(&AttributeValue::from(&other)),
            Err(Error::ValueKindMismatch { expected: ValueKind::Literal, .. })
        ));
        let knows = kind.require("knows").unwrap();
        assert_eq!(
            knows.objects(&AttributeValue::from(&other)).unwrap(),
            vec![Term::uri(format!("{NS}p9"))]
        );
    }

    #[test]
    fn kinds_decode_from_toml() {
        #[derive(Deserialize)]
        struct Doc {
            kinds: Vec<Kind>,
        }
        let doc: Doc = toml::from_str(
            r#"
            [[kinds]]
            name = "Person"
            class = "http://ex.org/Person"

            [[kinds.attributes]]
            name = "name"
            predicate = "http://ex.org/name"

            [[kinds.attributes]]
            name = "knows"
            predicate = "http://ex.org/knows"
            value = "resource"
            cardinality = "multi"
            range = "Person"
            "#,
        )
        .unwrap();
        assert_eq!(doc.kinds, vec![person()]);
    }
}
