//! Resource handles and attribute values.
//!
//! A [`Resource`] is a cheap, clonable handle. Clones share one allocation,
//! and equality is reference equality: the identity map hands out one
//! allocation per URI, so two equal handles always name the same resource and
//! the same resource is always represented by equal handles within a session.
//!
//! Handles never own other handles. A resource-valued attribute is re-read
//! from the store and resolved through the identity map on every access, so
//! cyclic graphs cost one hop plus a cache lookup.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use activerdf_store::Literal;
use parking_lot::RwLock;

use crate::kind::{Kind, ValueKind};

struct Inner {
    uri: String,
    kind: RwLock<Arc<Kind>>,
    frozen: AtomicBool,
}

/// Handle to a mapped resource.
#[derive(Clone)]
pub struct Resource(Arc<Inner>);

impl Resource {
    pub(crate) fn new(uri: impl Into<String>, kind: Arc<Kind>) -> Self {
        Resource(Arc::new(Inner {
            uri: uri.into(),
            kind: RwLock::new(kind),
            frozen: AtomicBool::new(false),
        }))
    }

    /// The URI this handle was constructed with. It never changes.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.0.uri
    }

    /// The kind the resource is mapped as.
    ///
    /// A handle first reached as the generic kind is rebound once the
    /// resource is resolved, found or created as a declared kind.
    #[must_use]
    pub fn kind(&self) -> Arc<Kind> {
        Arc::clone(&self.0.kind.read())
    }

    pub(crate) fn rebind(&self, kind: &Arc<Kind>) {
        *self.0.kind.write() = Arc::clone(kind);
    }

    /// Returns true once the resource has been deleted.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.0.frozen.load(Ordering::Acquire)
    }

    pub(crate) fn freeze(&self) {
        self.0.frozen.store(true, Ordering::Release);
    }

    /// Returns true if both handles share one allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Resource) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Resource {}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("uri", &self.0.uri)
            .field("kind", &self.0.kind.read().name)
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0.uri)
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A literal, lexical form preserved.
    Literal(Literal),
    /// Another mapped resource.
    Resource(Resource),
}

impl Value {
    /// Literal or resource.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Literal(_) => ValueKind::Literal,
            Value::Resource(_) => ValueKind::Resource,
        }
    }

    /// The lexical form, if this is a literal.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Literal(lit) => Some(lit.as_str()),
            Value::Resource(_) => None,
        }
    }

    /// The literal, if this is one.
    #[must_use]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Value::Literal(lit) => Some(lit),
            Value::Resource(_) => None,
        }
    }

    /// The resource handle, if this is one.
    #[must_use]
    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            Value::Literal(_) => None,
            Value::Resource(r) => Some(r),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Literal(lit) => f.write_str(lit.as_str()),
            Value::Resource(r) => fmt::Display::fmt(r, f),
        }
    }
}

impl From<Literal> for Value {
    fn from(lit: Literal) -> Self {
        Value::Literal(lit)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Literal(Literal::plain(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Literal(Literal::plain(s))
    }
}

impl From<i64> for Value {
    /// Integers are stored by their decimal text, as a plain literal.
    fn from(n: i64) -> Self {
        Value::Literal(Literal::plain(n.to_string()))
    }
}

impl From<Resource> for Value {
    fn from(r: Resource) -> Self {
        Value::Resource(r)
    }
}

impl From<&Resource> for Value {
    fn from(r: &Resource) -> Self {
        Value::Resource(r.clone())
    }
}

/// The value of an attribute: nothing, one value, or several.
///
/// Reads normalize by count: no triple is [`Absent`](Self::Absent), exactly
/// one is [`One`](Self::One), two or more are [`Many`](Self::Many) in the
/// adapter's order. As an input (a write or a finder condition) `Many` is a
/// sequence: one triple per element on write, any-of on find.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AttributeValue {
    /// No value.
    #[default]
    Absent,
    /// Exactly one value.
    One(Value),
    /// A sequence of values.
    Many(Vec<Value>),
}

impl AttributeValue {
    /// Normalizes a list of values by count.
    #[must_use]
    pub fn from_values(mut values: Vec<Value>) -> Self {
        match values.len() {
            0 => AttributeValue::Absent,
            1 => AttributeValue::One(values.remove(0)),
            _ => AttributeValue::Many(values),
        }
    }

    /// Returns true for [`Absent`](Self::Absent).
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, AttributeValue::Absent)
    }

    /// Number of values held.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            AttributeValue::Absent => 0,
            AttributeValue::One(_) => 1,
            AttributeValue::Many(values) => values.len(),
        }
    }

    /// Returns true if no value is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the values held.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        match self {
            AttributeValue::Absent => Default::default(),
            AttributeValue::One(value) => std::slice::from_ref(value).iter(),
            AttributeValue::Many(values) => values.iter(),
        }
    }

    /// The single value, if exactly one is held as [`One`](Self::One).
    #[must_use]
    pub fn as_one(&self) -> Option<&Value> {
        match self {
            AttributeValue::One(value) => Some(value),
            _ => None,
        }
    }

    /// The lexical form of a single literal value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_one().and_then(Value::as_str)
    }

    /// The handle of a single resource value.
    #[must_use]
    pub fn as_resource(&self) -> Option<&Resource> {
        self.as_one().and_then(Value::as_resource)
    }

    /// The values of a sequence.
    #[must_use]
    pub fn as_many(&self) -> Option<&[Value]> {
        match self {
            AttributeValue::Many(values) => Some(values),
            _ => None,
        }
    }

    /// Flattens into a `Vec` regardless of shape.
    #[must_use]
    pub fn into_vec(self) -> Vec<Value> {
        match self {
            AttributeValue::Absent => Vec::new(),
            AttributeValue::One(value) => vec![value],
            AttributeValue::Many(values) => values,
        }
    }
}

impl<'a> IntoIterator for &'a AttributeValue {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

macro_rules! one_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for AttributeValue {
                fn from(value: $ty) -> Self {
                    AttributeValue::One(Value::from(value))
                }
            }
        )*
    };
}

one_from!(Literal, &str, String, i64, Resource, &Resource);

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        AttributeValue::One(value)
    }
}

impl From<Option<Value>> for AttributeValue {
    fn from(value: Option<Value>) -> Self {
        value.map_or(AttributeValue::Absent, AttributeValue::One)
    }
}

impl<T: Into<Value>> From<Vec<T>> for AttributeValue {
    fn from(values: Vec<T>) -> Self {
        AttributeValue::Many(values.into_iter().map(Into::into).collect())
    }
}

impl From<&[Resource]> for AttributeValue {
    fn from(values: &[Resource]) -> Self {
        AttributeValue::Many(values.iter().map(Value::from).collect())
    }
}

impl<const N: usize> From<[&Resource; N]> for AttributeValue {
    fn from(values: [&Resource; N]) -> Self {
        AttributeValue::Many(values.into_iter().map(Value::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for AttributeValue {
    fn from(values: [&str; N]) -> Self {
        AttributeValue::Many(values.into_iter().map(Value::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(uri: &str) -> Resource {
        Resource::new(uri, Arc::new(Kind::generic()))
    }

    #[test]
    fn equality_is_identity() {
        let a = handle("http://ex.org/a");
        let twin = handle("http://ex.org/a");
        assert_eq!(a, a.clone());
        assert_ne!(a, twin);
        assert_eq!(a.uri(), twin.uri());
    }

    #[test]
    fn freeze_is_visible_through_clones() {
        let a = handle("http://ex.org/a");
        let clone = a.clone();
        a.freeze();
        assert!(clone.is_frozen());
    }

    #[test]
    fn normalizes_by_count() {
        assert!(AttributeValue::from_values(vec![]).is_absent());
        assert_eq!(
            AttributeValue::from_values(vec![Value::from("23")]).as_str(),
            Some("23")
        );
        let many = AttributeValue::from_values(vec![Value::from("a"), Value::from("b")]);
        assert_eq!(many.as_many().map(<[Value]>::len), Some(2));
        assert_eq!(many.as_str(), None);
    }

    #[test]
    fn integers_become_decimal_text() {
        assert_eq!(AttributeValue::from(23_i64).as_str(), Some("23"));
    }

    #[test]
    fn sequence_inputs() {
        let a = handle("http://ex.org/a");
        let b = handle("http://ex.org/b");
        let both = AttributeValue::from([&a, &b]);
        assert_eq!(both.len(), 2);
        let uris: Vec<&str> = both
            .iter()
            .filter_map(Value::as_resource)
            .map(Resource::uri)
            .collect();
        assert_eq!(uris, vec!["http://ex.org/a", "http://ex.org/b"]);
        assert_eq!(AttributeValue::from(vec!["x"]).len(), 1);
        assert!(AttributeValue::from(Vec::<Value>::new()).is_empty());
    }
}
