//! In-memory triple store.
//!
//! Triples are kept per context in insertion order, which is the natural
//! order returned by [`TripleStore::query`]. A single `RwLock` guards the
//! whole table: queries share it, inserts and deletes take it exclusively.

use std::collections::HashMap;
use std::path::Path;

use parking_lot::RwLock;
use tracing::trace;

use crate::adapter::TripleStore;
use crate::error::{Result, StoreError};
use crate::model::{Triple, TriplePattern};
use crate::ntriples;

/// A [`TripleStore`] held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    graphs: RwLock<HashMap<Option<String>, Vec<Triple>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an N-Triples document and inserts its triples into `context`.
    /// Returns the number of triples that were not already present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Parse`] if the document is malformed. Nothing is
    /// inserted in that case.
    pub fn load_ntriples(&self, input: &str, context: Option<&str>) -> Result<usize> {
        let triples = ntriples::parse(input)?;
        let mut graphs = self.graphs.write();
        let graph = graphs.entry(context.map(str::to_owned)).or_default();
        let mut added = 0;
        for triple in triples {
            if !graph.contains(&triple) {
                graph.push(triple);
                added += 1;
            }
        }
        Ok(added)
    }

    /// Reads an N-Triples file into `context`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load_file(&self, path: &Path, context: Option<&str>) -> Result<usize> {
        let content = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        self.load_ntriples(&content, context)
    }

    /// Serializes `context` to N-Triples.
    #[must_use]
    pub fn to_ntriples(&self, context: Option<&str>) -> String {
        let graphs = self.graphs.read();
        match graphs.get(&context.map(str::to_owned)) {
            Some(graph) => ntriples::to_ntriples(graph),
            None => String::new(),
        }
    }

    /// Number of triples in `context`.
    #[must_use]
    pub fn len(&self, context: Option<&str>) -> usize {
        self.graphs
            .read()
            .get(&context.map(str::to_owned))
            .map_or(0, Vec::len)
    }

    /// Returns true if `context` holds no triples.
    #[must_use]
    pub fn is_empty(&self, context: Option<&str>) -> bool {
        self.len(context) == 0
    }
}

impl TripleStore for MemoryStore {
    fn query(&self, pattern: &TriplePattern, context: Option<&str>) -> Result<Vec<Triple>> {
        let graphs = self.graphs.read();
        let found: Vec<Triple> = graphs
            .get(&context.map(str::to_owned))
            .map(|graph| graph.iter().filter(|t| pattern.matches(t)).cloned().collect())
            .unwrap_or_default();
        trace!(%pattern, ?context, matches = found.len(), "memory query");
        Ok(found)
    }

    fn insert(&self, triple: &Triple, context: Option<&str>) -> Result<bool> {
        let mut graphs = self.graphs.write();
        let graph = graphs.entry(context.map(str::to_owned)).or_default();
        if graph.contains(triple) {
            return Ok(false);
        }
        graph.push(triple.clone());
        Ok(true)
    }

    fn delete(&self, pattern: &TriplePattern, context: Option<&str>) -> Result<usize> {
        let mut graphs = self.graphs.write();
        let Some(graph) = graphs.get_mut(&context.map(str::to_owned)) else {
            return Ok(0);
        };
        let before = graph.len();
        graph.retain(|t| !pattern.matches(t));
        let removed = before - graph.len();
        trace!(%pattern, ?context, removed, "memory delete");
        Ok(removed)
    }
}
