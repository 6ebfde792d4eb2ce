//! ActiveRDF: resources of a triple store as typed objects.
//!
//! A [`Session`] maps RDF resources onto handles of a declared [`Kind`]. It
//! combines four parts, each an `impl Session` block in its own module:
//!
//! - an identity map ([`IdentityMap`]): one handle per URI per session,
//! - an attribute resolver ([`resolver`]): reads attributes through the
//!   kind's predicate table,
//! - a mutation engine ([`mutation`]): replaces, appends, creates, deletes,
//! - a finder synthesizer ([`finder`], [`dynamic`]): compiles conditions into
//!   triple-pattern conjunctions.
//!
//! Storage is reached only through the [`store::TripleStore`] contract.
//!
//! # Entry Point
//!
//! ```
//! use std::sync::Arc;
//!
//! use activerdf::store::MemoryStore;
//! use activerdf::{AttributeDecl, Condition, Kind, Schema, Session};
//!
//! let mut schema = Schema::new();
//! let person = schema.register(
//!     Kind::new("Person", "http://example.org/Person")
//!         .with(AttributeDecl::literal("name", "http://example.org/name"))
//!         .with(AttributeDecl::resource("knows", "http://example.org/knows", "Person").multi()),
//! );
//! let session = Session::new(Arc::new(MemoryStore::new()), schema);
//!
//! let renaud = session.create(&person, "http://example.org/p7")?;
//! let audrey = session.create(&person, "http://example.org/p9")?;
//! session.set(&renaud, "name", "renaud")?;
//! session.set(&audrey, "knows", &renaud)?;
//!
//! let knows = session.get(&audrey, "knows")?;
//! assert_eq!(knows.as_resource(), Some(&renaud));
//!
//! let found = session.find(&person, &[Condition::new("knows", &renaud)])?;
//! assert_eq!(found, vec![audrey]);
//! # Ok::<(), activerdf::Error>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod dynamic;
pub mod error;
pub mod finder;
pub mod identity;
pub mod kind;
pub mod mutation;
pub mod resolver;
pub mod resource;
pub mod session;

pub use activerdf_store as store;

pub use dynamic::{parse_finder, FINDER_PREFIX};
pub use error::{Error, Result};
pub use finder::{Condition, Conjunct, QueryPlan};
pub use identity::IdentityMap;
pub use kind::{AttributeDecl, Cardinality, Kind, Schema, ValueKind, GENERIC_KIND};
pub use mutation::Attributes;
pub use resolver::URI_ATTRIBUTE;
pub use resource::{AttributeValue, Resource, Value};
pub use session::{DeletePolicy, Session, SessionConfig, SessionOptions};
