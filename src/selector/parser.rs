//! Name selector parsing
//!
//! Grammar:
//!
//! ```text
//! BASE [ "::" COUNT ] [ ("<<" | ">>") OFFSET ]
//! ```
//!
//! `<<n` shifts backward and `>>n` forward; a negative literal flips the
//! direction, so `<<-n` and `>>n` are the same shift. Parsing is purely
//! syntactic and never looks at table data.

use std::fmt;

use crate::errors::{TableError, TableResult};

const COUNT_SEP: &str = "::";
const SHIFT_BACK: &str = "<<";
const SHIFT_FORWARD: &str = ">>";

/// A parsed row selector: base name, occurrence and signed offset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectorDescriptor {
    /// Name (or name pattern) to look up
    pub base: String,
    /// Which occurrence of a repeated name; `None` means the first.
    /// Negative values count from the end.
    pub occurrence: Option<i64>,
    /// Shift applied to the resolved position
    pub offset: i64,
}

impl SelectorDescriptor {
    /// Creates a descriptor for the first occurrence of `base`
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            occurrence: None,
            offset: 0,
        }
    }

    /// Sets the occurrence index
    pub fn with_occurrence(mut self, occurrence: i64) -> Self {
        self.occurrence = Some(occurrence);
        self
    }

    /// Sets the signed offset
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Parses a selector string
    pub fn parse(input: &str) -> TableResult<Self> {
        parse_selector(input)
    }

    /// Returns the descriptor as a `(base, occurrence, offset)` tuple
    pub fn as_tuple(&self) -> (&str, Option<i64>, i64) {
        (&self.base, self.occurrence, self.offset)
    }
}

impl fmt::Display for SelectorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        if let Some(k) = self.occurrence {
            write!(f, "{}{}", COUNT_SEP, k)?;
        }
        if self.offset > 0 {
            write!(f, "{}{}", SHIFT_FORWARD, self.offset)?;
        } else if self.offset < 0 {
            write!(f, "{}{}", SHIFT_BACK, self.offset.unsigned_abs())?;
        }
        Ok(())
    }
}

/// Splits a selector string into base name, occurrence and offset.
pub fn parse_selector(input: &str) -> TableResult<SelectorDescriptor> {
    let (head, offset) = split_offset(input)?;
    let (base, occurrence) = split_count(input, head)?;

    if base.is_empty() {
        return Err(TableError::parse(input, "missing base name"));
    }

    Ok(SelectorDescriptor {
        base: base.to_string(),
        occurrence,
        offset,
    })
}

/// Strips a trailing `<<n` / `>>n` clause.
fn split_offset(input: &str) -> TableResult<(&str, i64)> {
    let back = input.rfind(SHIFT_BACK);
    let forward = input.rfind(SHIFT_FORWARD);

    let (pos, backward) = match (back, forward) {
        (None, None) => return Ok((input, 0)),
        (Some(b), Some(f)) if b > f => (b, true),
        (Some(_), Some(f)) => (f, false),
        (Some(b), None) => (b, true),
        (None, Some(f)) => (f, false),
    };

    let literal = &input[pos + 2..];
    let n = parse_int(input, literal, "offset")?;
    let offset = if backward {
        n.checked_neg()
            .ok_or_else(|| TableError::parse(literal, "offset out of range"))?
    } else {
        n
    };
    Ok((&input[..pos], offset))
}

/// Strips a trailing `::k` clause from what remains after the offset.
fn split_count<'a>(input: &str, head: &'a str) -> TableResult<(&'a str, Option<i64>)> {
    match head.rfind(COUNT_SEP) {
        Some(pos) => {
            let literal = &head[pos + 2..];
            let k = parse_int(input, literal, "occurrence count")?;
            Ok((&head[..pos], Some(k)))
        }
        None => Ok((head, None)),
    }
}

fn parse_int(input: &str, literal: &str, what: &str) -> TableResult<i64> {
    literal.trim().parse::<i64>().map_err(|_| {
        TableError::parse(
            literal,
            format!("{} in selector '{}' is not an integer", what, input),
        )
    })
}
