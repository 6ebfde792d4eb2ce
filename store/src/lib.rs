//! Storage layer for ActiveRDF.
//!
//! The `activerdf-store` crate holds everything the mapping engine needs to
//! talk to a triple store without knowing which one it is:
//!
//! - the triple data model ([`Triple`], [`Term`], [`Literal`], [`TriplePattern`]),
//! - the storage-adapter contract ([`TripleStore`]),
//! - an in-memory adapter ([`MemoryStore`]),
//! - an N-Triples reader and writer ([`ntriples`]),
//! - opaque connection parameters ([`ConnectionParams`]).
//!
//! # Entry Point
//!
//! ```
//! use activerdf_store::{MemoryStore, Term, Triple, TriplePattern, TripleStore};
//!
//! let store = MemoryStore::new();
//! let triple = Triple::new(
//!     "http://example.org/p7",
//!     "http://example.org/name",
//!     Term::literal("renaud"),
//! );
//! store.insert(&triple, None).unwrap();
//!
//! let found = store
//!     .query(&TriplePattern::any().with_subject("http://example.org/p7"), None)
//!     .unwrap();
//! assert_eq!(found, vec![triple]);
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod adapter;
pub mod config;
pub mod error;
pub mod memory;
pub mod model;
pub mod ntriples;

pub use adapter::TripleStore;
pub use config::{AdapterKind, ConnectionParams};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use model::{iris, Literal, Term, Triple, TriplePattern};
