//! Row selector resolution

use std::cell::OnceCell;
use std::sync::Arc;

use super::pattern::{is_pattern, NamePattern};
use super::slice::slice_positions;
use super::RowSelector;
use crate::column::Scalar;
use crate::config::BoundPolicy;
use crate::errors::{TableError, TableResult};
use crate::expr::ColumnSource;
use crate::index::{normalize, NameIndex};
use crate::selector::SelectorDescriptor;

/// A table-like source rows can be selected from
pub trait RowSource: ColumnSource {
    /// Number of rows
    fn row_count(&self) -> usize;

    /// Name of the row-identifying column
    fn identifying_column(&self) -> &str;

    /// Index over the identifying column; NameError if it is missing
    fn name_index(&self) -> TableResult<Arc<NameIndex>>;

    /// Policy for name-range bounds outside the table
    fn range_bounds(&self) -> BoundPolicy {
        BoundPolicy::Clamp
    }
}

/// Resolved rows, in absolute positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Exactly one row, from a single-row selector
    Single(usize),
    /// Ordered positions, duplicates allowed
    Rows(Vec<usize>),
    /// One flag per row
    Mask(Vec<bool>),
}

impl Selection {
    /// The row, if this is a single-row selection
    pub fn single(&self) -> Option<usize> {
        match self {
            Selection::Single(row) => Some(*row),
            _ => None,
        }
    }

    /// Selected positions in selection order
    pub fn positions(&self) -> Vec<usize> {
        match self {
            Selection::Single(row) => vec![*row],
            Selection::Rows(rows) => rows.clone(),
            Selection::Mask(bits) => mask_positions(bits),
        }
    }

    /// Selection as a mask over `len` rows. Order and duplicates are lost.
    pub fn to_mask(&self, len: usize) -> Vec<bool> {
        match self {
            Selection::Mask(bits) => bits.clone(),
            other => {
                let mut bits = vec![false; len];
                for row in other.positions() {
                    if let Some(bit) = bits.get_mut(row) {
                        *bit = true;
                    }
                }
                bits
            }
        }
    }

    /// Number of selected rows
    pub fn len(&self) -> usize {
        match self {
            Selection::Single(_) => 1,
            Selection::Rows(rows) => rows.len(),
            Selection::Mask(bits) => bits.iter().filter(|b| **b).count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn mask_positions(bits: &[bool]) -> Vec<usize> {
    bits.iter()
        .enumerate()
        .filter(|(_, b)| **b)
        .map(|(i, _)| i)
        .collect()
}

/// Rows visible to one resolution stage
struct Scope<'s, S: ?Sized> {
    source: &'s S,
    /// Absolute positions; `None` is every row
    rows: Option<Vec<usize>>,
    index: OnceCell<Arc<NameIndex>>,
}

impl<'s, S: RowSource + ?Sized> Scope<'s, S> {
    fn full(source: &'s S) -> Self {
        Self {
            source,
            rows: None,
            index: OnceCell::new(),
        }
    }

    fn subset(source: &'s S, rows: Vec<usize>) -> Self {
        Self {
            source,
            rows: Some(rows),
            index: OnceCell::new(),
        }
    }

    fn len(&self) -> usize {
        match &self.rows {
            Some(rows) => rows.len(),
            None => self.source.row_count(),
        }
    }

    fn absolute(&self, row: usize) -> usize {
        match &self.rows {
            Some(rows) => rows[row],
            None => row,
        }
    }

    fn absolute_all(&self, rows: impl IntoIterator<Item = usize>) -> Vec<usize> {
        rows.into_iter().map(|r| self.absolute(r)).collect()
    }

    /// Name index over the visible rows; positions are scope-relative
    fn index(&self) -> TableResult<Arc<NameIndex>> {
        if let Some(index) = self.index.get() {
            return Ok(Arc::clone(index));
        }
        let index = match &self.rows {
            None => self.source.name_index()?,
            Some(rows) => {
                let name = self.source.identifying_column();
                let column = self
                    .source
                    .column(name)
                    .ok_or_else(|| TableError::name(name))?;
                Arc::new(NameIndex::build(&column.take(rows), 0))
            }
        };
        let _ = self.index.set(Arc::clone(&index));
        Ok(index)
    }
}

/// Resolves row selectors against a source.
///
/// Strict mode (the default) rejects a top-level plain name that matches
/// nothing with a lookup error; lenient mode yields an empty selection.
pub struct RowDispatcher<'a, S: RowSource + ?Sized> {
    source: &'a S,
    lenient: bool,
}

impl<'a, S: RowSource + ?Sized> RowDispatcher<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            lenient: false,
        }
    }

    /// Unmatched plain names select nothing instead of failing
    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }

    /// Resolves `selector` to absolute rows
    pub fn select(&self, selector: &RowSelector) -> TableResult<Selection> {
        let scope = Scope::full(self.source);
        self.resolve(&scope, selector, !self.lenient)
    }

    /// Resolves `selector` to ordered absolute positions
    pub fn positions(&self, selector: &RowSelector) -> TableResult<Vec<usize>> {
        Ok(self.select(selector)?.positions())
    }

    /// Resolves `selector` to a mask over every row
    pub fn mask(&self, selector: &RowSelector) -> TableResult<Vec<bool>> {
        Ok(self.select(selector)?.to_mask(self.source.row_count()))
    }

    fn resolve(
        &self,
        scope: &Scope<'_, S>,
        selector: &RowSelector,
        strict: bool,
    ) -> TableResult<Selection> {
        match selector {
            RowSelector::All => Ok(Selection::Rows(scope.absolute_all(0..scope.len()))),
            RowSelector::Index(i) => {
                let row = normalize(*i, scope.len())
                    .ok_or_else(|| out_of_range(*i, scope.len()))?;
                Ok(Selection::Single(scope.absolute(row)))
            }
            RowSelector::Name(text) => self.resolve_name(scope, text, strict),
            RowSelector::Descriptor(descriptor) => {
                let index = scope.index()?;
                let row = resolve_exact(&index, descriptor, scope.len())?;
                Ok(Selection::Single(scope.absolute(row)))
            }
            RowSelector::Slice { start, stop, step } => {
                let rows = slice_positions(scope.len(), *start, *stop, *step)?;
                Ok(Selection::Rows(scope.absolute_all(rows)))
            }
            RowSelector::NameRange { start, stop } => {
                self.resolve_name_range(scope, start.as_deref(), stop.as_deref())
            }
            RowSelector::ValueRange { column, low, high } => {
                self.resolve_value_range(scope, column, low.as_ref(), high.as_ref())
            }
            RowSelector::Indices(indices) => {
                let len = scope.len();
                let rows = indices
                    .iter()
                    .map(|&i| {
                        normalize(i, len)
                            .map(|r| scope.absolute(r))
                            .ok_or_else(|| out_of_range(i, len))
                    })
                    .collect::<TableResult<Vec<_>>>()?;
                Ok(Selection::Rows(rows))
            }
            RowSelector::Names(names) => {
                let mut rows = Vec::new();
                for name in names {
                    rows.extend(self.resolve_name(scope, name, false)?.positions());
                }
                Ok(Selection::Rows(rows))
            }
            RowSelector::Mask(bits) => self.resolve_mask(scope, bits),
            RowSelector::Chain(stages) => self.resolve_chain(scope, stages, strict),
        }
    }

    fn resolve_name(
        &self,
        scope: &Scope<'_, S>,
        text: &str,
        strict: bool,
    ) -> TableResult<Selection> {
        let index = scope.index()?;
        let len = scope.len();

        // Verbatim names win over the selector grammar
        if index.contains(text) {
            let row = resolve_exact(&index, &SelectorDescriptor::new(text), len)?;
            return Ok(Selection::Single(scope.absolute(row)));
        }

        let descriptor = match SelectorDescriptor::parse(text) {
            Ok(descriptor) => descriptor,
            Err(_) if !strict => return Ok(Selection::Rows(Vec::new())),
            Err(err) => return Err(err),
        };

        if index.contains(&descriptor.base) {
            let row = resolve_exact(&index, &descriptor, len)?;
            return Ok(Selection::Single(scope.absolute(row)));
        }

        if is_pattern(&descriptor.base) {
            let matches = pattern_matches(&index, &descriptor.base)?;
            return match descriptor.occurrence {
                Some(_) if matches.is_empty() => Ok(Selection::Rows(Vec::new())),
                Some(k) => {
                    let row = shift(pick_match(&matches, k, &descriptor.base)?, descriptor.offset);
                    let row = checked_row(row, len)?;
                    Ok(Selection::Single(scope.absolute(row)))
                }
                None => {
                    let rows = matches
                        .into_iter()
                        .filter_map(|m| checked_row(shift(m, descriptor.offset), len).ok())
                        .map(|r| scope.absolute(r))
                        .collect();
                    Ok(Selection::Rows(rows))
                }
            };
        }

        if strict {
            Err(TableError::lookup(text, self.source.identifying_column()))
        } else {
            Ok(Selection::Rows(Vec::new()))
        }
    }

    fn resolve_name_range(
        &self,
        scope: &Scope<'_, S>,
        start: Option<&str>,
        stop: Option<&str>,
    ) -> TableResult<Selection> {
        let len = scope.len();
        let lo = match start {
            Some(text) => self.range_bound(scope, text)?,
            None => 0,
        };
        let hi = match stop {
            Some(text) => self.range_bound(scope, text)?,
            None if len == 0 => return Ok(Selection::Rows(Vec::new())),
            None => len - 1,
        };
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        Ok(Selection::Rows(scope.absolute_all(lo..=hi)))
    }

    /// One end of a name range, as a scope-relative row
    fn range_bound(&self, scope: &Scope<'_, S>, text: &str) -> TableResult<usize> {
        let index = scope.index()?;
        let len = scope.len();

        let row = if index.contains(text) {
            index.resolve(text, None, 0)?
        } else {
            let descriptor = SelectorDescriptor::parse(text)?;
            if index.contains(&descriptor.base) {
                index.resolve(&descriptor.base, descriptor.occurrence, descriptor.offset)?
            } else if is_pattern(&descriptor.base) {
                let matches = pattern_matches(&index, &descriptor.base)?;
                if matches.is_empty() {
                    return Err(TableError::lookup(text, self.source.identifying_column()));
                }
                let k = descriptor.occurrence.unwrap_or(0);
                shift(pick_match(&matches, k, &descriptor.base)?, descriptor.offset)
            } else {
                return Err(TableError::lookup(text, self.source.identifying_column()));
            }
        };

        match self.source.range_bounds() {
            BoundPolicy::Fail => checked_row(row, len),
            BoundPolicy::Clamp if len == 0 => Err(out_of_range(row, len)),
            BoundPolicy::Clamp => Ok(row.clamp(0, len as i64 - 1) as usize),
        }
    }

    fn resolve_value_range(
        &self,
        scope: &Scope<'_, S>,
        column: &str,
        low: Option<&Scalar>,
        high: Option<&Scalar>,
    ) -> TableResult<Selection> {
        let values = self
            .source
            .column(column)
            .ok_or_else(|| TableError::name(column))?;
        let text_column = values.as_text_slice().is_some();
        for bound in low.iter().chain(high.iter()) {
            if matches!(bound, Scalar::Text(_)) != text_column {
                return Err(TableError::type_mismatch(format!(
                    "cannot bound {} column '{}' by {} value {}",
                    values.kind().as_str(),
                    column,
                    bound.kind_name(),
                    bound
                )));
            }
        }

        let within = |value: &Scalar| {
            let above = low.map_or(true, |lo| value.compare(lo).map_or(false, |o| o.is_ge()));
            let below = high.map_or(true, |hi| value.compare(hi).map_or(false, |o| o.is_le()));
            above && below
        };

        let rows = (0..scope.len())
            .map(|r| scope.absolute(r))
            .filter(|&row| values.get(row).map_or(false, |v| within(&v)))
            .collect();
        Ok(Selection::Rows(rows))
    }

    fn resolve_mask(&self, scope: &Scope<'_, S>, bits: &[bool]) -> TableResult<Selection> {
        let len = scope.len();
        if scope.rows.is_none() && bits.len() == len {
            return Ok(Selection::Mask(bits.to_vec()));
        }
        if bits.len() == len {
            return Ok(Selection::Rows(scope.absolute_all(mask_positions(bits))));
        }
        // A full-length mask applied inside a narrower scope
        if bits.len() == self.source.row_count() {
            let rows = scope
                .absolute_all(0..len)
                .into_iter()
                .filter(|&row| bits[row])
                .collect();
            return Ok(Selection::Rows(rows));
        }
        Err(TableError::type_mismatch(format!(
            "mask has {} entries for {} rows",
            bits.len(),
            len
        )))
    }

    fn resolve_chain(
        &self,
        scope: &Scope<'_, S>,
        stages: &[RowSelector],
        strict: bool,
    ) -> TableResult<Selection> {
        let Some((last, init)) = stages.split_last() else {
            return Ok(Selection::Rows(scope.absolute_all(0..scope.len())));
        };

        let mut rows = scope.rows.clone();
        for stage in init {
            let stage_scope = match rows {
                Some(rows) => Scope::subset(self.source, rows),
                None => Scope::full(self.source),
            };
            rows = Some(self.resolve(&stage_scope, stage, strict)?.positions());
        }

        let last_scope = match rows {
            Some(rows) => Scope::subset(self.source, rows),
            None => Scope::full(self.source),
        };
        self.resolve(&last_scope, last, strict)
    }
}

fn resolve_exact(
    index: &NameIndex,
    descriptor: &SelectorDescriptor,
    len: usize,
) -> TableResult<usize> {
    let row = index.resolve(&descriptor.base, descriptor.occurrence, descriptor.offset)?;
    checked_row(row, len)
}

/// Rows whose name fully matches `pattern`, ascending
fn pattern_matches(index: &NameIndex, pattern: &str) -> TableResult<Vec<usize>> {
    let pattern = NamePattern::compile(pattern)?;
    let mut rows: Vec<usize> = index
        .names()
        .filter(|name| pattern.matches(name))
        .flat_map(|name| index.occurrences(name).iter().copied())
        .collect();
    rows.sort_unstable();
    Ok(rows)
}

fn pick_match(matches: &[usize], k: i64, pattern: &str) -> TableResult<usize> {
    normalize(k, matches.len())
        .map(|i| matches[i])
        .ok_or_else(|| {
            TableError::index(
                k,
                format!("matches of '{}' ({} found)", pattern, matches.len()),
            )
        })
}

fn shift(row: usize, offset: i64) -> i64 {
    (row as i64).saturating_add(offset)
}

fn checked_row(row: i64, len: usize) -> TableResult<usize> {
    if row >= 0 && (row as u64) < len as u64 {
        Ok(row as usize)
    } else {
        Err(out_of_range(row, len))
    }
}

fn out_of_range(row: i64, len: usize) -> TableError {
    TableError::index(row, format!("table with {} rows", len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use std::collections::HashMap;

    struct Lattice {
        columns: HashMap<String, Column>,
        index: Arc<NameIndex>,
        bounds: BoundPolicy,
    }

    impl Lattice {
        fn new() -> Self {
            let names = Column::from_text(["ip1", "ip2", "ip2", "ip3", "tab$end"]);
            let index = Arc::new(NameIndex::build(&names, 0));
            let mut columns = HashMap::new();
            columns.insert("name".to_string(), names);
            columns.insert("s".to_string(), Column::from_f64(vec![1.0, 2.0, 2.1, 3.0, 4.0]));
            columns.insert("turns".to_string(), Column::from_i64(vec![5, 4, 3, 2, 1]));
            Self {
                columns,
                index,
                bounds: BoundPolicy::Clamp,
            }
        }
    }

    impl ColumnSource for Lattice {
        fn column(&self, name: &str) -> Option<&Column> {
            self.columns.get(name)
        }
    }

    impl RowSource for Lattice {
        fn row_count(&self) -> usize {
            5
        }

        fn identifying_column(&self) -> &str {
            "name"
        }

        fn name_index(&self) -> TableResult<Arc<NameIndex>> {
            Ok(Arc::clone(&self.index))
        }

        fn range_bounds(&self) -> BoundPolicy {
            self.bounds
        }
    }

    fn rows(selector: impl Into<RowSelector>) -> Vec<usize> {
        let lattice = Lattice::new();
        RowDispatcher::new(&lattice)
            .positions(&selector.into())
            .unwrap()
    }

    fn select(selector: impl Into<RowSelector>) -> TableResult<Selection> {
        let lattice = Lattice::new();
        RowDispatcher::new(&lattice).select(&selector.into())
    }

    #[test]
    fn test_index() {
        assert_eq!(select(1).unwrap(), Selection::Single(1));
        assert_eq!(select(-1).unwrap(), Selection::Single(4));
        assert_eq!(select(5).unwrap_err().code(), "TABLE_INDEX");
    }

    #[test]
    fn test_exact_names() {
        assert_eq!(select("ip2").unwrap(), Selection::Single(1));
        assert_eq!(select("ip2::1").unwrap(), Selection::Single(2));
        assert_eq!(select("ip2::-1>>1").unwrap(), Selection::Single(3));
        assert_eq!(select("tab$end").unwrap(), Selection::Single(4));
    }

    #[test]
    fn test_exact_name_out_of_range() {
        assert_eq!(select("tab$end>>1").unwrap_err().code(), "TABLE_INDEX");
        assert_eq!(select("ip2::2").unwrap_err().code(), "TABLE_INDEX");
    }

    #[test]
    fn test_unmatched_name_is_lookup_error() {
        let err = select("notthere").unwrap_err();
        assert_eq!(err.to_string(), "Cannot find 'notthere' in column 'name'");
    }

    #[test]
    fn test_lenient_unmatched_name_is_empty() {
        let lattice = Lattice::new();
        let selection = RowDispatcher::new(&lattice)
            .lenient()
            .select(&"notthere".into())
            .unwrap();
        assert!(selection.is_empty());
    }

    #[test]
    fn test_patterns() {
        assert_eq!(rows("ip[23]"), vec![1, 2, 3]);
        assert_eq!(rows("ip.*"), vec![0, 1, 2, 3]);
        assert_eq!(select("ip.*::1").unwrap(), Selection::Single(1));
        assert_eq!(select("ip.*::-1").unwrap(), Selection::Single(3));
        assert!(rows("x.*").is_empty());
    }

    #[test]
    fn test_pattern_offset_drops_out_of_range() {
        assert_eq!(rows("ip[23]>>2"), vec![3, 4]);
        assert_eq!(rows("ip.*<<1"), vec![0, 1, 2]);
    }

    #[test]
    fn test_descriptor() {
        assert_eq!(select(("ip2", 1)).unwrap(), Selection::Single(2));
        assert_eq!(select(("ip2", 1, -1)).unwrap(), Selection::Single(1));
        let err = select(("bbb", 0)).unwrap_err();
        assert_eq!(err, TableError::name("bbb"));
    }

    #[test]
    fn test_slices() {
        assert_eq!(rows(RowSelector::slice(Some(1), Some(4), Some(3))), vec![1]);
        assert_eq!(rows(1..3), vec![1, 2]);
        assert_eq!(rows(..), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_name_range() {
        assert_eq!(rows(RowSelector::name_range("ip2::1<<1", "ip2::1>>1")), vec![1, 2, 3]);
        assert_eq!(rows(RowSelector::name_range("ip3", "ip1")), vec![0, 1, 2, 3]);
        let open = RowSelector::NameRange {
            start: Some("ip3".into()),
            stop: None,
        };
        assert_eq!(rows(open), vec![3, 4]);
    }

    #[test]
    fn test_name_range_bound_policy() {
        assert_eq!(rows(RowSelector::name_range("ip3", "tab$end>>3")), vec![3, 4]);

        let mut lattice = Lattice::new();
        lattice.bounds = BoundPolicy::Fail;
        let err = RowDispatcher::new(&lattice)
            .select(&RowSelector::name_range("ip3", "tab$end>>3"))
            .unwrap_err();
        assert_eq!(err.code(), "TABLE_INDEX");
    }

    #[test]
    fn test_value_range() {
        assert_eq!(rows(RowSelector::value_range("s", 1.5, 2.5)), vec![1, 2]);
        assert_eq!(rows(RowSelector::value_range("turns", 2, 4)), vec![1, 2, 3]);
        assert_eq!(rows(RowSelector::value_range("name", "ip1", "ip3")), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_value_range_kind_mismatch() {
        let err = select(RowSelector::value_range("name", 1.0, 2.0)).unwrap_err();
        assert_eq!(err.code(), "TABLE_TYPE");
        assert_eq!(select(RowSelector::value_range("nope", 1.0, 2.0)).unwrap_err().code(), "TABLE_NAME");
    }

    #[test]
    fn test_lists() {
        assert_eq!(rows(vec![3, 1, 1]), vec![3, 1, 1]);
        assert_eq!(rows(vec!["ip3", "nothere", "ip[12]"]), vec![3, 0, 1, 2]);
        assert_eq!(select(vec![0, 9]).unwrap_err().code(), "TABLE_INDEX");
    }

    #[test]
    fn test_mask() {
        let mask = vec![false, true, false, true, false];
        assert_eq!(select(mask.clone()).unwrap(), Selection::Mask(mask));
        assert_eq!(select(vec![true, false]).unwrap_err().code(), "TABLE_TYPE");
    }

    #[test]
    fn test_mask_of_positions() {
        let lattice = Lattice::new();
        let mask = RowDispatcher::new(&lattice)
            .mask(&RowSelector::Indices(vec![2, 1]))
            .unwrap();
        assert_eq!(mask, vec![false, true, true, false, false]);
    }

    #[test]
    fn test_chain_relative_index() {
        let above_one = RowSelector::Mask(vec![false, true, true, true, true]);
        let chain = RowSelector::chain([above_one, RowSelector::Index(1)]);
        assert_eq!(select(chain).unwrap(), Selection::Single(2));
    }

    #[test]
    fn test_chain_names_resolve_within_stage() {
        // ip2 first occurrence among rows 2.. is row 2
        let chain = RowSelector::chain([RowSelector::from(2..5), RowSelector::from("ip2")]);
        assert_eq!(select(chain).unwrap(), Selection::Single(2));
    }

    #[test]
    fn test_chain_full_length_mask_in_later_stage() {
        let chain = RowSelector::chain([
            RowSelector::from(1..5),
            RowSelector::Mask(vec![true, false, true, true, false]),
        ]);
        assert_eq!(rows(chain), vec![2, 3]);
    }

    #[test]
    fn test_empty_chain_is_all() {
        assert_eq!(rows(RowSelector::Chain(Vec::new())), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_selection_helpers() {
        let s = Selection::Rows(vec![3, 1]);
        assert_eq!(s.len(), 2);
        assert_eq!(s.single(), None);
        assert_eq!(s.to_mask(4), vec![false, true, false, true]);
        assert_eq!(Selection::Single(0).single(), Some(0));
    }
}
