//! Duplicate-aware name index
//!
//! Maps every distinct value of the identifying column to the ascending list
//! of rows where it appears. Built in one linear pass; never updated in place.
//! A table rebuilds it after any change to the identifying column and tags it
//! with the version of the column state it was built from.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::column::Column;
use crate::errors::{TableError, TableResult};

/// Occurrence lists for the identifying column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameIndex {
    /// Name -> ascending row positions
    positions: HashMap<String, Vec<usize>>,
    /// Distinct names in order of first appearance
    order: Vec<String>,
    /// Row -> (slot in `order`, occurrence number)
    rows: Vec<(usize, usize)>,
    /// Identifying column version this index reflects
    version: u64,
}

impl NameIndex {
    /// Builds the index from an identifying column.
    ///
    /// Non-text columns are indexed by the display form of their values.
    pub fn build(column: &Column, version: u64) -> Self {
        let names = identifying_values(column);

        let mut positions: HashMap<String, Vec<usize>> = HashMap::new();
        let mut order = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();
        let mut rows = Vec::with_capacity(names.len());

        for (row, name) in names.iter().enumerate() {
            let slot = *slots.entry(name.as_str()).or_insert_with(|| {
                order.push(name.clone());
                order.len() - 1
            });
            let seen = positions.entry(name.clone()).or_default();
            rows.push((slot, seen.len()));
            seen.push(row);
        }

        Self {
            positions,
            order,
            rows,
            version,
        }
    }

    /// Number of indexed rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Identifying column version this index was built from
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns true if `name` occurs at least once
    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Distinct names in order of first appearance
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Ascending rows where `name` occurs (empty if absent)
    pub fn occurrences(&self, name: &str) -> &[usize] {
        self.positions.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true iff `name` occurs more than once.
    ///
    /// Absent names are simply not repeated.
    pub fn is_repeated(&self, name: &str) -> bool {
        self.occurrences(name).len() > 1
    }

    /// Row of the given occurrence of `name`.
    ///
    /// `None` selects the first occurrence; negative occurrences count from
    /// the end (`-1` is the last).
    pub fn get_index(&self, name: &str, occurrence: Option<i64>) -> TableResult<usize> {
        let rows = self
            .positions
            .get(name)
            .ok_or_else(|| TableError::name(name))?;

        let k = occurrence.unwrap_or(0);
        let slot = normalize(k, rows.len()).ok_or_else(|| {
            TableError::index(
                k,
                format!("occurrences of '{}' ({} found)", name, rows.len()),
            )
        })?;
        Ok(rows[slot])
    }

    /// Resolves a descriptor to a signed absolute position.
    ///
    /// The result is not range-checked against the table; callers decide
    /// whether to clamp or reject.
    pub fn resolve(&self, base: &str, occurrence: Option<i64>, offset: i64) -> TableResult<i64> {
        let row = self.get_index(base, occurrence)? as i64;
        row.checked_add(offset)
            .ok_or_else(|| TableError::index(offset, format!("offset from '{}'", base)))
    }

    /// Reverse lookup: the name at `row` and which occurrence of it the row is
    pub fn occurrence_of(&self, row: usize) -> Option<(&str, usize)> {
        let &(slot, k) = self.rows.get(row)?;
        Some((self.order[slot].as_str(), k))
    }
}

/// Maps a possibly negative index into `0..len`
pub(crate) fn normalize(k: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let idx = if k < 0 { len + k } else { k };
    if (0..len).contains(&idx) {
        Some(idx as usize)
    } else {
        None
    }
}

/// The identifying column's values as strings.
///
/// Text columns are borrowed; other kinds are rendered.
pub fn identifying_values(column: &Column) -> Cow<'_, [String]> {
    match column.as_text_slice() {
        Some(names) => Cow::Borrowed(names),
        None => Cow::Owned(
            (0..column.len())
                .filter_map(|row| column.get(row))
                .map(|v| v.to_string())
                .collect(),
        ),
    }
}
