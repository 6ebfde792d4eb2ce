//! The storage-adapter contract.
//!
//! The mapping engine only ever talks to a store through [`TripleStore`].
//! Every call is synchronous and blocking. Timeouts and retries, if any,
//! belong to the implementation.

use crate::error::Result;
use crate::model::{Triple, TriplePattern};

/// A triple store scoped by an optional context (named graph).
///
/// `context = None` addresses the default graph. Contexts are disjoint:
/// a query in one context never sees triples of another.
pub trait TripleStore: Send + Sync {
    /// Returns every triple matching `pattern`, in the store's natural order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn query(&self, pattern: &TriplePattern, context: Option<&str>) -> Result<Vec<Triple>>;

    /// Inserts one triple. Returns `false` if it was already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn insert(&self, triple: &Triple, context: Option<&str>) -> Result<bool>;

    /// Deletes every triple matching `pattern` and returns how many went.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn delete(&self, pattern: &TriplePattern, context: Option<&str>) -> Result<usize>;

    /// Returns true if at least one triple matches `pattern`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn contains(&self, pattern: &TriplePattern, context: Option<&str>) -> Result<bool> {
        Ok(!self.query(pattern, context)?.is_empty())
    }

    /// Returns every triple in `context`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn export(&self, context: Option<&str>) -> Result<Vec<Triple>> {
        self.query(&TriplePattern::any(), context)
    }
}
