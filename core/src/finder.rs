//! Finder synthesis.
//!
//! A find request is an ordered list of [`Condition`]s. It compiles to a
//! [`QueryPlan`]: a conjunction of [`Conjunct`]s over one shared subject
//! variable, where each conjunct is a disjunction of `(?s, predicate, object)`
//! patterns. The first conjunct always restricts subjects to the kind's class.
//!
//! ```text
//! find(Person, [(name, "renaud"), (knows, [p9, p10])])
//!
//!   ?s rdf:type  Person
//!   ?s name      "renaud"
//!   ?s knows     (<p9> | <p10>)
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use activerdf_store::{iris, Term, TriplePattern};
use tracing::debug;

use crate::error::Result;
use crate::kind::Kind;
use crate::resource::{AttributeValue, Resource};
use crate::session::Session;

/// One condition of a find request.
///
/// A sequence value matches subjects having any of the listed values.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Attribute name on the searched kind.
    pub attribute: String,
    /// Value or values to match.
    pub value: AttributeValue,
}

impl Condition {
    /// Creates a condition.
    pub fn new(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// Subjects having `predicate` with any of `alternatives` as object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conjunct {
    /// Predicate IRI.
    pub predicate: String,
    /// Accepted objects. Empty means nothing matches.
    pub alternatives: Vec<Term>,
}

impl Conjunct {
    /// The triple patterns this conjunct unions over.
    pub fn patterns(&self) -> impl Iterator<Item = TriplePattern> + '_ {
        self.alternatives.iter().map(|object| {
            TriplePattern::any()
                .with_predicate(&self.predicate)
                .with_object(object.clone())
        })
    }
}

/// A synthesized triple-pattern query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    /// Name of the kind results are rehydrated as.
    pub kind: String,
    /// Conjuncts, all of which a subject must satisfy.
    pub conjuncts: Vec<Conjunct>,
}

impl QueryPlan {
    /// Returns true if some conjunct has no alternatives.
    #[must_use]
    pub fn is_unsatisfiable(&self) -> bool {
        self.conjuncts.iter().any(|c| c.alternatives.is_empty())
    }
}

impl fmt::Display for QueryPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.conjuncts.iter().enumerate() {
            if i > 0 {
                f.write_str(" . ")?;
            }
            write!(f, "?s <{}> ", c.predicate)?;
            match c.alternatives.as_slice() {
                [one] => write!(f, "{one}")?,
                alternatives => {
                    f.write_str("(")?;
                    for (j, alt) in alternatives.iter().enumerate() {
                        if j > 0 {
                            f.write_str(" | ")?;
                        }
                        write!(f, "{alt}")?;
                    }
                    f.write_str(")")?;
                }
            }
        }
        Ok(())
    }
}

impl Session {
    /// Compiles a find request into a query plan.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownAttribute`] if a condition names an
    /// undeclared attribute, or [`crate::Error::ValueKindMismatch`] if a value
    /// does not fit its attribute.
    pub fn plan(&self, kind: &Kind, conditions: &[Condition]) -> Result<QueryPlan> {
        let mut conjuncts = Vec::with_capacity(conditions.len() + 1);
        conjuncts.push(Conjunct {
            predicate: iris::RDF_TYPE.to_owned(),
            alternatives: vec![Term::uri(&kind.class)],
        });
        for condition in conditions {
            let decl = kind.require(&condition.attribute)?;
            conjuncts.push(Conjunct {
                predicate: decl.predicate.clone(),
                alternatives: decl.objects(&condition.value)?,
            });
        }
        Ok(QueryPlan {
            kind: kind.name.clone(),
            conjuncts,
        })
    }

    /// Runs a plan and rehydrates the matching subjects as `kind`.
    ///
    /// Results follow the adapter's order for the first conjunct, without
    /// duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Adapter`] if the store fails.
    pub fn execute(&self, kind: &Arc<Kind>, plan: &QueryPlan) -> Result<Vec<Resource>> {
        if plan.is_unsatisfiable() {
            debug!(%plan, "unsatisfiable plan");
            return Ok(Vec::new());
        }
        let mut conjuncts = plan.conjuncts.iter();
        let Some(first) = conjuncts.next() else {
            return Ok(Vec::new());
        };
        let mut subjects = self.subjects(first)?;
        for conjunct in conjuncts {
            if subjects.is_empty() {
                break;
            }
            let matched: HashSet<String> = self.subjects(conjunct)?.into_iter().collect();
            subjects.retain(|s| matched.contains(s));
        }
        debug!(%plan, matches = subjects.len(), "finder executed");
        Ok(subjects
            .iter()
            .map(|uri| self.identity.resolve_as(uri, kind))
            .collect())
    }

    /// Finds every resource of `kind` satisfying all conditions.
    ///
    /// Conditions combine by conjunction; a sequence value within one
    /// condition combines by disjunction. No match is an empty `Vec`.
    ///
    /// # Errors
    ///
    /// Same as [`Session::plan`] and [`Session::execute`].
    pub fn find(&self, kind: &Arc<Kind>, conditions: &[Condition]) -> Result<Vec<Resource>> {
        let plan = self.plan(kind, conditions)?;
        self.execute(kind, &plan)
    }

    /// Finds every resource typed with the kind's class.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Adapter`] if the store fails.
    pub fn find_all(&self, kind: &Arc<Kind>) -> Result<Vec<Resource>> {
        self.find(kind, &[])
    }

    fn subjects(&self, conjunct: &Conjunct) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut subjects = Vec::new();
        for pattern in conjunct.patterns() {
            for triple in self.query(&pattern)? {
                if seen.insert(triple.subject.clone()) {
                    subjects.push(triple.subject);
                }
            }
        }
        Ok(subjects)
    }
}
