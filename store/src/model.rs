//! Triple data model.
//!
//! A [`Triple`] is the only persisted fact. Its object is a [`Term`]: either a
//! URI naming another resource or a [`Literal`]. A [`TriplePattern`] is a
//! triple with optional positions, where `None` is a wildcard.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ntriples;

/// A literal value: its lexical form plus an optional datatype or language tag.
///
/// The lexical form is kept verbatim. `"23"` stays the string `"23"`; no
/// numeric coercion happens at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    /// Lexical form.
    pub value: String,
    /// Full IRI of the datatype, or `None` for a plain literal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    /// Language tag (e.g., `"en"`), or `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Literal {
    /// Creates a plain literal.
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// Creates a literal with an explicit datatype IRI.
    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    /// Creates a language-tagged literal.
    pub fn with_language(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    /// Returns the lexical form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// The object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Term {
    /// A reference to another resource. Blank nodes are carried here with
    /// their `_:` prefix.
    Uri(String),
    /// A literal value.
    Literal(Literal),
}

impl Term {
    /// Creates a URI term.
    pub fn uri(uri: impl Into<String>) -> Self {
        Term::Uri(uri.into())
    }

    /// Creates a plain literal term.
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal(Literal::plain(value))
    }

    /// Returns the URI if this term is one.
    #[must_use]
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Term::Uri(uri) => Some(uri),
            Term::Literal(_) => None,
        }
    }

    /// Returns the literal if this term is one.
    #[must_use]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Uri(_) => None,
            Term::Literal(lit) => Some(lit),
        }
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

/// Writes the term in N-Triples syntax.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        ntriples::write_term(&mut out, self);
        f.write_str(&out)
    }
}

/// A single `(subject, predicate, object)` fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    /// Subject URI.
    pub subject: String,
    /// Predicate URI.
    pub predicate: String,
    /// Object term.
    pub object: Term,
}

impl Triple {
    /// Creates a triple.
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }
}

/// A triple pattern. Each `None` position matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TriplePattern {
    /// Subject URI to match, or wildcard.
    pub subject: Option<String>,
    /// Predicate URI to match, or wildcard.
    pub predicate: Option<String>,
    /// Object term to match, or wildcard.
    pub object: Option<Term>,
}

impl TriplePattern {
    /// The all-wildcard pattern.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Binds the subject position.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Binds the predicate position.
    #[must_use]
    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    /// Binds the object position.
    #[must_use]
    pub fn with_object(mut self, object: Term) -> Self {
        self.object = Some(object);
        self
    }

    /// Returns true if `triple` matches every bound position.
    #[must_use]
    pub fn matches(&self, triple: &Triple) -> bool {
        self.subject.as_ref().map_or(true, |s| *s == triple.subject)
            && self.predicate.as_ref().map_or(true, |p| *p == triple.predicate)
            && self.object.as_ref().map_or(true, |o| *o == triple.object)
    }

    /// Returns true if no position is bound.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.subject.is_none() && self.predicate.is_none() && self.object.is_none()
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subject {
            Some(s) => write!(f, "<{s}> ")?,
            None => f.write_str("?s ")?,
        }
        match &self.predicate {
            Some(p) => write!(f, "<{p}> ")?,
            None => f.write_str("?p ")?,
        }
        match &self.object {
            Some(o) => write!(f, "{o}"),
            None => f.write_str("?o"),
        }
    }
}

/// Standard IRI constants.
pub mod iris {
    /// `rdf:type`.
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    /// `rdfs:Resource`.
    pub const RDFS_RESOURCE: &str = "http://www.w3.org/2000/01/rdf-schema#Resource";
    /// `xsd:integer`.
    pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
}
