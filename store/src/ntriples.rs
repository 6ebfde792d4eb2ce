//! N-Triples reader and writer.
//!
//! One triple per line, absolute IRIs, `_:` blank node labels. Plain literals
//! are written without a datatype so that a read-then-write cycle leaves a
//! document unchanged.

use crate::error::{Result, StoreError};
use crate::model::{Literal, Term, Triple};

/// Serializes triples to an N-Triples string.
#[must_use]
pub fn to_ntriples<'a>(triples: impl IntoIterator<Item = &'a Triple>) -> String {
    let mut out = String::new();
    for t in triples {
        resource(&mut out, &t.subject);
        out.push(' ');
        resource(&mut out, &t.predicate);
        out.push(' ');
        write_term(&mut out, &t.object);
        out.push_str(" .\n");
    }
    out
}

pub(crate) fn write_term(out: &mut String, term: &Term) {
    match term {
        Term::Uri(uri) => resource(out, uri),
        Term::Literal(lit) => literal(out, lit),
    }
}

fn resource(out: &mut String, uri: &str) {
    if uri.starts_with("_:") {
        out.push_str(uri);
    } else {
        out.push('<');
        out.push_str(uri);
        out.push('>');
    }
}

fn literal(out: &mut String, lit: &Literal) {
    out.push('"');
    for c in lit.value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    if let Some(lang) = &lit.language {
        out.push('@');
        out.push_str(lang);
    } else if let Some(datatype) = &lit.datatype {
        out.push_str("^^<");
        out.push_str(datatype);
        out.push('>');
    }
}

/// Parses an N-Triples document.
///
/// Blank lines and `#` comments are skipped.
///
/// # Errors
///
/// Returns [`StoreError::Parse`] naming the first malformed line.
pub fn parse(input: &str) -> Result<Vec<Triple>> {
    let mut triples = Vec::new();
    for (idx, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut cursor = Cursor {
            line: idx + 1,
            rest: line,
        };
        let subject = cursor.subject()?;
        let predicate = cursor.iri()?;
        let object = cursor.object()?;
        cursor.end()?;
        triples.push(Triple::new(subject, predicate, object));
    }
    Ok(triples)
}

struct Cursor<'a> {
    line: usize,
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn error(&self, message: impl Into<String>) -> StoreError {
        StoreError::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn subject(&mut self) -> Result<String> {
        self.skip_ws();
        if self.rest.starts_with("_:") {
            self.blank()
        } else {
            self.iri()
        }
    }

    fn iri(&mut self) -> Result<String> {
        self.skip_ws();
        let rest: &'a str = self.rest;
        let body = rest
            .strip_prefix('<')
            .ok_or_else(|| self.error("expected '<'"))?;
        let end = body.find('>').ok_or_else(|| self.error("unterminated IRI"))?;
        let iri = unescape(&body[..end]).map_err(|m| self.error(m))?;
        if iri.is_empty() {
            return Err(self.error("empty IRI"));
        }
        self.rest = &body[end + 1..];
        Ok(iri)
    }

    fn blank(&mut self) -> Result<String> {
        let rest: &'a str = self.rest;
        let end = rest
            .find(|c: char| c.is_whitespace())
            .unwrap_or(rest.len());
        let label = rest[..end].trim_end_matches('.');
        if label.len() <= 2 {
            return Err(self.error("empty blank node label"));
        }
        self.rest = &rest[label.len()..];
        Ok(label.to_owned())
    }

    fn object(&mut self) -> Result<Term> {
        self.skip_ws();
        if self.rest.starts_with('<') {
            Ok(Term::Uri(self.iri()?))
        } else if self.rest.starts_with("_:") {
            Ok(Term::Uri(self.blank()?))
        } else if self.rest.starts_with('"') {
            self.literal().map(Term::Literal)
        } else {
            Err(self.error("expected IRI, blank node or literal"))
        }
    }

    fn literal(&mut self) -> Result<Literal> {
        let rest: &'a str = self.rest;
        let body = &rest[1..];
        let mut escaped = false;
        let mut close = None;
        for (i, c) in body.char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' => escaped = true,
                '"' => {
                    close = Some(i);
                    break;
                }
                _ => {}
            }
        }
        let close = close.ok_or_else(|| self.error("unterminated literal"))?;
        let value = unescape(&body[..close]).map_err(|m| self.error(m))?;
        let after: &'a str = &body[close + 1..];

        if let Some(dt) = after.strip_prefix("^^") {
            self.rest = dt;
            let datatype = self.iri()?;
            Ok(Literal::typed(value, datatype))
        } else if let Some(tagged) = after.strip_prefix('@') {
            let end = tagged
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
                .unwrap_or(tagged.len());
            if end == 0 {
                return Err(self.error("empty language tag"));
            }
            self.rest = &tagged[end..];
            Ok(Literal::with_language(value, &tagged[..end]))
        } else {
            self.rest = after;
            Ok(Literal::plain(value))
        }
    }

    fn end(&mut self) -> Result<()> {
        self.skip_ws();
        let rest: &'a str = self.rest;
        let tail = rest
            .strip_prefix('.')
            .ok_or_else(|| self.error("expected '.'"))?
            .trim_start();
        if tail.is_empty() || tail.starts_with('#') {
            Ok(())
        } else {
            Err(self.error("unexpected content after '.'"))
        }
    }
}

fn unescape(s: &str) -> std::result::Result<String, String> {
    if !s.contains('\\') {
        return Ok(s.to_owned());
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some('u') => out.push(hex_char(&mut chars, 4)?),
            Some('U') => out.push(hex_char(&mut chars, 8)?),
            Some(other) => return Err(format!("unknown escape '\\{other}'")),
            None => return Err("dangling '\\'".to_owned()),
        }
    }
    Ok(out)
}

fn hex_char(chars: &mut std::str::Chars<'_>, len: usize) -> std::result::Result<char, String> {
    let digits: String = chars.by_ref().take(len).collect();
    if digits.len() != len {
        return Err("truncated unicode escape".to_owned());
    }
    u32::from_str_radix(&digits, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| format!("invalid unicode escape '{digits}'"))
}
