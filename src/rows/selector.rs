//! Row selector shapes

use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo};

use crate::column::{Column, Scalar};
use crate::errors::{TableError, TableResult};
use crate::selector::SelectorDescriptor;

/// How rows are addressed.
///
/// Every accepted selector shape is a variant; resolution matches on them
/// exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSelector {
    /// Every row
    All,
    /// One absolute position; negative counts from the end
    Index(i64),
    /// Exact name (`ip2::1>>1`) or full-match pattern (`ip.*`)
    Name(String),
    /// Explicit descriptor, resolved as an exact name
    Descriptor(SelectorDescriptor),
    /// Positional half-open slice with optional step
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    },
    /// Inclusive range between two named rows
    NameRange {
        start: Option<String>,
        stop: Option<String>,
    },
    /// Rows whose value in `column` lies in the inclusive interval
    ValueRange {
        column: String,
        low: Option<Scalar>,
        high: Option<Scalar>,
    },
    /// Positions in list order, duplicates allowed
    Indices(Vec<i64>),
    /// Names resolved independently and concatenated
    Names(Vec<String>),
    /// Boolean mask, one entry per row
    Mask(Vec<bool>),
    /// Stages, each resolved against the rows the previous one selected
    Chain(Vec<RowSelector>),
}

impl RowSelector {
    /// Positional slice, `[start:stop:step]`
    pub fn slice(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        RowSelector::Slice { start, stop, step }
    }

    /// Inclusive name range, `"start":"stop"`
    pub fn name_range(start: impl Into<String>, stop: impl Into<String>) -> Self {
        RowSelector::NameRange {
            start: Some(start.into()),
            stop: Some(stop.into()),
        }
    }

    /// Inclusive value range on `column`, `low:high:"column"`
    pub fn value_range(
        column: impl Into<String>,
        low: impl Into<Scalar>,
        high: impl Into<Scalar>,
    ) -> Self {
        RowSelector::ValueRange {
            column: column.into(),
            low: Some(low.into()),
            high: Some(high.into()),
        }
    }

    /// Multi-stage selector
    pub fn chain(stages: impl IntoIterator<Item = RowSelector>) -> Self {
        RowSelector::Chain(stages.into_iter().collect())
    }

    /// Mask from a boolean column, e.g. an evaluated comparison
    pub fn from_mask_column(column: &Column) -> TableResult<Self> {
        column
            .as_bool_slice()
            .map(|bits| RowSelector::Mask(bits.to_vec()))
            .ok_or_else(|| {
                TableError::type_mismatch(format!(
                    "a row mask must be a bool column, got {}",
                    column.kind().as_str()
                ))
            })
    }
}

/// Positional conversions for each integer type a caller may hold.
/// Bare literals infer as `i32`.
macro_rules! impl_positional {
    ($($int:ty),*) => {$(
        impl From<$int> for RowSelector {
            fn from(index: $int) -> Self {
                RowSelector::Index(index as i64)
            }
        }

        impl From<Vec<$int>> for RowSelector {
            fn from(indices: Vec<$int>) -> Self {
                RowSelector::Indices(indices.into_iter().map(|i| i as i64).collect())
            }
        }

        impl From<Range<$int>> for RowSelector {
            fn from(r: Range<$int>) -> Self {
                RowSelector::slice(Some(r.start as i64), Some(r.end as i64), None)
            }
        }

        impl From<RangeFrom<$int>> for RowSelector {
            fn from(r: RangeFrom<$int>) -> Self {
                RowSelector::slice(Some(r.start as i64), None, None)
            }
        }

        impl From<RangeTo<$int>> for RowSelector {
            fn from(r: RangeTo<$int>) -> Self {
                RowSelector::slice(None, Some(r.end as i64), None)
            }
        }

        /// Inclusive positional range; `a..=-1` ends at the last row
        impl From<RangeInclusive<$int>> for RowSelector {
            fn from(r: RangeInclusive<$int>) -> Self {
                let (start, end) = r.into_inner();
                let end = end as i64;
                let stop = if end == -1 { None } else { Some(end.saturating_add(1)) };
                RowSelector::slice(Some(start as i64), stop, None)
            }
        }
    )*};
}

impl_positional!(i64, i32, usize);

impl From<&str> for RowSelector {
    fn from(name: &str) -> Self {
        RowSelector::Name(name.to_string())
    }
}

impl From<String> for RowSelector {
    fn from(name: String) -> Self {
        RowSelector::Name(name)
    }
}

impl From<SelectorDescriptor> for RowSelector {
    fn from(descriptor: SelectorDescriptor) -> Self {
        RowSelector::Descriptor(descriptor)
    }
}

/// `(name, occurrence)`
impl<K: Into<i64>> From<(&str, K)> for RowSelector {
    fn from((base, occurrence): (&str, K)) -> Self {
        RowSelector::Descriptor(SelectorDescriptor::new(base).with_occurrence(occurrence.into()))
    }
}

/// `(name, occurrence, offset)`
impl<K: Into<i64>, N: Into<i64>> From<(&str, K, N)> for RowSelector {
    fn from((base, occurrence, offset): (&str, K, N)) -> Self {
        RowSelector::Descriptor(
            SelectorDescriptor::new(base)
                .with_occurrence(occurrence.into())
                .with_offset(offset.into()),
        )
    }
}

impl From<Vec<&str>> for RowSelector {
    fn from(names: Vec<&str>) -> Self {
        RowSelector::Names(names.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for RowSelector {
    fn from(names: Vec<String>) -> Self {
        RowSelector::Names(names)
    }
}

impl From<Vec<bool>> for RowSelector {
    fn from(mask: Vec<bool>) -> Self {
        RowSelector::Mask(mask)
    }
}

impl From<RangeFull> for RowSelector {
    fn from(_: RangeFull) -> Self {
        RowSelector::All
    }
}
