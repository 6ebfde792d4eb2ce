//! Shared fixtures for the ActiveRDF test suites.
//!
//! The people graph has four persons in the `test_create_person` context:
//!
//! | URI           | name   | age | knows       |
//! |---------------|--------|-----|-------------|
//! | `Instance_7`  | renaud | 23  | 9           |
//! | `Instance_8`  | eyal   | 27  |             |
//! | `Instance_9`  | audrey | 19  | 7           |
//! | `Instance_10` | regis  | 33  | 9, 7        |

use std::sync::Arc;

use activerdf::{AttributeDecl, Kind, Schema, Session};
use activerdf_store::MemoryStore;

/// Namespace of the test vocabulary.
pub const NS: &str = "http://m3pe.org/activerdf/test/";

/// Context the people graph is loaded into.
pub const CONTEXT: &str = "test_create_person";

/// The people graph as N-Triples.
pub const PEOPLE_NT: &str = include_str!("../fixtures/people.nt");

/// Number of persons in [`PEOPLE_NT`].
pub const PEOPLE: usize = 4;

/// Full IRI of a term in the test vocabulary.
#[must_use]
pub fn iri(local: &str) -> String {
    format!("{NS}{local}")
}

/// URI of `Instance_<n>`.
#[must_use]
pub fn instance(n: u32) -> String {
    iri(&format!("Instance_{n}"))
}

/// The `Person` kind: `name` and `age` literals, multi-valued `knows`.
#[must_use]
pub fn person_kind() -> Kind {
    Kind::new("Person", iri("Person"))
        .with(AttributeDecl::literal("name", iri("name")))
        .with(AttributeDecl::literal("age", iri("age")))
        .with(AttributeDecl::resource("knows", iri("knows"), "Person").multi())
}

/// A schema holding the generic kind and `Person`.
#[must_use]
pub fn schema() -> Schema {
    Schema::from_kinds([person_kind()])
}

/// An empty in-memory session in [`CONTEXT`].
#[must_use]
pub fn empty_session() -> Session {
    Session::new(Arc::new(MemoryStore::new()), schema()).with_context(CONTEXT)
}

/// A session over a fresh in-memory store seeded with [`PEOPLE_NT`].
///
/// # Errors
///
/// Returns an error if the fixture fails to parse.
pub fn people_session() -> activerdf::Result<Session> {
    let store = MemoryStore::new();
    store.load_ntriples(PEOPLE_NT, Some(CONTEXT))?;
    Ok(Session::new(Arc::new(store), schema()).with_context(CONTEXT))
}
