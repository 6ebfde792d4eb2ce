//! Finders addressed by name.
//!
//! `find_by_name_and_age` names the conditions `name` and `age`, taking one
//! argument each, in order. Names resolve against the kind's declarations, so
//! an attribute whose own name contains `_and_` still parses.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::finder::Condition;
use crate::kind::Kind;
use crate::resource::{AttributeValue, Resource};
use crate::session::Session;

/// Prefix every finder name starts with.
pub const FINDER_PREFIX: &str = "find_by_";

const SEPARATOR: &str = "_and_";

/// Splits a finder name into the attribute names of `kind` it mentions.
///
/// # Errors
///
/// Returns [`Error::InvalidFinder`] if the name lacks the prefix, or if its
/// remainder cannot be split into declared attribute names.
pub fn parse_finder(kind: &Kind, name: &str) -> Result<Vec<String>> {
    let rest = name
        .strip_prefix(FINDER_PREFIX)
        .filter(|rest| !rest.is_empty())
        .ok_or_else(|| Error::InvalidFinder(format!("`{name}` does not start with `{FINDER_PREFIX}`")))?;
    let segments: Vec<&str> = rest.split(SEPARATOR).collect();
    split_segments(kind, &segments).ok_or_else(|| {
        Error::InvalidFinder(format!(
            "`{name}` does not name attributes of {}",
            kind.name
        ))
    })
}

// Longest declared prefix first; backtracks when the tail fails to parse.
fn split_segments(kind: &Kind, segments: &[&str]) -> Option<Vec<String>> {
    if segments.is_empty() {
        return Some(Vec::new());
    }
    (1..=segments.len()).rev().find_map(|take| {
        let candidate = segments[..take].join(SEPARATOR);
        kind.attribute(&candidate)?;
        let mut names = split_segments(kind, &segments[take..])?;
        names.insert(0, candidate);
        Some(names)
    })
}

/// Pairs the attributes named by `name` with `args`, in order.
///
/// # Errors
///
/// Returns [`Error::InvalidFinder`] if the name does not parse or the number
/// of arguments differs from the number of named attributes.
pub fn conditions(kind: &Kind, name: &str, args: Vec<AttributeValue>) -> Result<Vec<Condition>> {
    let attributes = parse_finder(kind, name)?;
    if attributes.len() != args.len() {
        return Err(Error::InvalidFinder(format!(
            "`{name}` takes {} argument(s), got {}",
            attributes.len(),
            args.len()
        )));
    }
    Ok(attributes
        .into_iter()
        .zip(args)
        .map(|(attribute, value)| Condition { attribute, value })
        .collect())
}

impl Session {
    /// Runs the finder named `name` over `kind`.
    ///
    /// ```
    /// # use activerdf::{AttributeDecl, Kind, Schema, Session, Attributes};
    /// # use activerdf::store::MemoryStore;
    /// # use std::sync::Arc;
    /// let mut schema = Schema::new();
    /// let person = schema.register(
    ///     Kind::new("Person", "http://ex.org/Person")
    ///         .with(AttributeDecl::literal("name", "http://ex.org/name"))
    ///         .with(AttributeDecl::literal("age", "http://ex.org/age")),
    /// );
    /// let session = Session::new(Arc::new(MemoryStore::new()), schema);
    /// let eyal = session.create_with(
    ///     &person,
    ///     "http://ex.org/eyal",
    ///     Attributes::new().with("name", "eyal").with("age", 27_i64),
    /// )?;
    /// let found = session.find_by(&person, "find_by_name_and_age", vec!["eyal".into(), 27_i64.into()])?;
    /// assert_eq!(found, vec![eyal]);
    /// # Ok::<(), activerdf::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFinder`] for a malformed name or argument
    /// count, and otherwise the errors of [`Session::find`].
    pub fn find_by(
        &self,
        kind: &Arc<Kind>,
        name: &str,
        args: Vec<AttributeValue>,
    ) -> Result<Vec<Resource>> {
        let conditions = conditions(kind, name, args)?;
        self.find(kind, &conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::AttributeDecl;

    fn person() -> Kind {
        Kind::new("Person", "http://ex.org/Person")
            .with(AttributeDecl::literal("name", "http://ex.org/name"))
            .with(AttributeDecl::literal("age", "http://ex.org/age"))
            .with(AttributeDecl::literal("first_name", "http://ex.org/firstName"))
            .with(AttributeDecl::literal("salt_and_pepper", "http://ex.org/sp"))
    }

    #[test]
    fn splits_on_and() {
        let kind = person();
        assert_eq!(parse_finder(&kind, "find_by_name").unwrap(), vec!["name"]);
        assert_eq!(
            parse_finder(&kind, "find_by_name_and_age").unwrap(),
            vec!["name", "age"]
        );
        assert_eq!(
            parse_finder(&kind, "find_by_first_name_and_age").unwrap(),
            vec!["first_name", "age"]
        );
    }

    #[test]
    fn attribute_names_may_contain_separator() {
        let kind = person();
        assert_eq!(
            parse_finder(&kind, "find_by_salt_and_pepper_and_name").unwrap(),
            vec!["salt_and_pepper", "name"]
        );
    }

    #[test]
    fn rejects_bad_names() {
        let kind = person();
        for bad in ["find_name", "find_by_", "find_by_email", "find_by_name_and_"] {
            assert!(
                matches!(parse_finder(&kind, bad), Err(Error::InvalidFinder(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn argument_count_must_match() {
        let kind = person();
        assert!(matches!(
            conditions(&kind, "find_by_name_and_age", vec!["x".into()]),
            Err(Error::InvalidFinder(_))
        ));
        let conds = conditions(&kind, "find_by_age", vec![23_i64.into()]).unwrap();
        assert_eq!(conds, vec![Condition::new("age", "23")]);
    }
}
