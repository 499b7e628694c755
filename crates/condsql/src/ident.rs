//! Column references that arrive through the parameter bag.
//!
//! Clause text written by the developer is spliced into SQL as-is. The
//! `OrderBy` bag key, however, usually comes straight from a request, so it
//! is parsed into an [`Ident`] first and rejected unless it is a plain or
//! backtick-quoted MySQL name, optionally qualified (`alias.column`).

use std::fmt;

use crate::error::{SqlError, SqlResult};

/// One segment of a dotted name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    /// `[A-Za-z_][A-Za-z0-9_$]*`
    Bare(String),
    /// Contents of `` `...` `` with doubled backticks unescaped.
    Quoted(String),
}

/// A validated, possibly qualified column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    parts: Vec<IdentPart>,
}

fn bad(input: &str, reason: &str) -> SqlError {
    SqlError::precondition(format!("invalid identifier `{input}`: {reason}"))
}

fn is_bare_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_bare_continue(c: char) -> bool {
    c == '_' || c == '$' || c.is_ascii_alphanumeric()
}

/// Read a quoted segment starting after the opening backtick. Returns the
/// unescaped name and the rest of the input after the closing backtick.
fn quoted_segment<'a>(input: &str, rest: &'a str) -> SqlResult<(String, &'a str)> {
    let mut name = String::new();
    let mut iter = rest.char_indices().peekable();
    while let Some((i, c)) = iter.next() {
        if c != '`' {
            name.push(c);
            continue;
        }
        if matches!(iter.peek(), Some((_, '`'))) {
            iter.next();
            name.push('`');
            continue;
        }
        if name.is_empty() {
            return Err(bad(input, "empty quoted segment"));
        }
        return Ok((name, &rest[i + 1..]));
    }
    Err(bad(input, "missing closing backtick"))
}

/// Read a bare segment. Returns the name and the remaining input.
fn bare_segment<'a>(input: &str, rest: &'a str) -> SqlResult<(String, &'a str)> {
    let end = rest.find('.').unwrap_or(rest.len());
    let (name, tail) = rest.split_at(end);
    let mut chars = name.chars();
    match chars.next() {
        None => return Err(bad(input, "empty segment")),
        Some(c) if !is_bare_start(c) => return Err(bad(input, "segment must start with a letter or `_`")),
        Some(_) => {}
    }
    if let Some(c) = chars.find(|c| !is_bare_continue(*c)) {
        return Err(bad(input, &format!("unexpected character '{c}'")));
    }
    Ok((name.to_string(), tail))
}

impl Ident {
    pub fn parse(input: &str) -> SqlResult<Self> {
        if input.is_empty() {
            return Err(bad(input, "empty"));
        }
        if input.contains('\0') {
            return Err(bad(input, "contains NUL"));
        }

        let mut parts = Vec::new();
        let mut rest = input;
        loop {
            let (part, tail) = match rest.strip_prefix('`') {
                Some(after) => {
                    let (name, tail) = quoted_segment(input, after)?;
                    (IdentPart::Quoted(name), tail)
                }
                None => {
                    let (name, tail) = bare_segment(input, rest)?;
                    (IdentPart::Bare(name), tail)
                }
            };
            parts.push(part);

            if tail.is_empty() {
                break;
            }
            rest = tail
                .strip_prefix('.')
                .ok_or_else(|| bad(input, "segments must be separated by '.'"))?;
            if rest.is_empty() {
                return Err(bad(input, "trailing '.'"));
            }
        }

        Ok(Self { parts })
    }

    pub fn parts(&self) -> &[IdentPart] {
        &self.parts
    }

    /// MySQL text; quoted segments are re-escaped.
    pub fn to_sql(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match part {
                IdentPart::Bare(name) => f.write_str(name)?,
                IdentPart::Quoted(name) => write!(f, "`{}`", name.replace('`', "``"))?,
            }
        }
        Ok(())
    }
}
