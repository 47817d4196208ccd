//! Typed column storage
//!
//! Each variant owns its buffer through an `Arc`, so cloning a column (and
//! therefore handing it out of a table) never copies data. Mutation goes
//! through `Arc::make_mut`: a buffer still shared with a view is copied first,
//! and outstanding views keep the old contents.

use std::sync::Arc;

use super::scalar::Scalar;
use crate::errors::{TableError, TableResult};

/// Element type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Float,
    Int,
    Text,
    Bool,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Float => "float",
            ColumnKind::Int => "int",
            ColumnKind::Text => "text",
            ColumnKind::Bool => "bool",
        }
    }
}

/// A named table column is a homogeneous, fixed-length sequence of values.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// 64-bit floats
    Float(Arc<Vec<f64>>),
    /// 64-bit signed integers
    Int(Arc<Vec<i64>>),
    /// UTF-8 strings
    Text(Arc<Vec<String>>),
    /// Booleans (typically a mask)
    Bool(Arc<Vec<bool>>),
}

impl Column {
    /// Create a float column
    pub fn from_f64(data: Vec<f64>) -> Self {
        Column::Float(Arc::new(data))
    }

    /// Create an integer column
    pub fn from_i64(data: Vec<i64>) -> Self {
        Column::Int(Arc::new(data))
    }

    /// Create a text column
    pub fn from_text<I, S>(data: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Column::Text(Arc::new(data.into_iter().map(Into::into).collect()))
    }

    /// Create a boolean column
    pub fn from_bool(data: Vec<bool>) -> Self {
        Column::Bool(Arc::new(data))
    }

    /// Create a column of `len` copies of `value`
    pub fn full(value: &Scalar, len: usize) -> Self {
        match value {
            Scalar::Float(v) => Column::from_f64(vec![*v; len]),
            Scalar::Int(v) => Column::from_i64(vec![*v; len]),
            Scalar::Text(v) => Column::from_text(vec![v.clone(); len]),
            Scalar::Bool(v) => Column::from_bool(vec![*v; len]),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Float(data) => data.len(),
            Column::Int(data) => data.len(),
            Column::Text(data) => data.len(),
            Column::Bool(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Float(_) => ColumnKind::Float,
            Column::Int(_) => ColumnKind::Int,
            Column::Text(_) => ColumnKind::Text,
            Column::Bool(_) => ColumnKind::Bool,
        }
    }

    /// Gets the value at `row`, if in range
    pub fn get(&self, row: usize) -> Option<Scalar> {
        match self {
            Column::Float(data) => data.get(row).copied().map(Scalar::Float),
            Column::Int(data) => data.get(row).copied().map(Scalar::Int),
            Column::Text(data) => data.get(row).cloned().map(Scalar::Text),
            Column::Bool(data) => data.get(row).copied().map(Scalar::Bool),
        }
    }

    /// Float slice, if this is a float column
    pub fn as_f64_slice(&self) -> Option<&[f64]> {
        match self {
            Column::Float(data) => Some(data),
            _ => None,
        }
    }

    /// Integer slice, if this is an integer column
    pub fn as_i64_slice(&self) -> Option<&[i64]> {
        match self {
            Column::Int(data) => Some(data),
            _ => None,
        }
    }

    /// Text slice, if this is a text column
    pub fn as_text_slice(&self) -> Option<&[String]> {
        match self {
            Column::Text(data) => Some(data),
            _ => None,
        }
    }

    /// Boolean slice, if this is a boolean column
    pub fn as_bool_slice(&self) -> Option<&[bool]> {
        match self {
            Column::Bool(data) => Some(data),
            _ => None,
        }
    }

    /// Numeric values as floats (integers and booleans are promoted)
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        match self {
            Column::Float(data) => Some(data.as_ref().clone()),
            Column::Int(data) => Some(data.iter().map(|&v| v as f64).collect()),
            Column::Bool(data) => Some(data.iter().map(|&v| if v { 1.0 } else { 0.0 }).collect()),
            Column::Text(_) => None,
        }
    }

    /// Gathers the rows at `positions`, in order; duplicates are repeated.
    ///
    /// Positions must be in range.
    pub fn take(&self, positions: &[usize]) -> Column {
        match self {
            Column::Float(data) => Column::from_f64(positions.iter().map(|&i| data[i]).collect()),
            Column::Int(data) => Column::from_i64(positions.iter().map(|&i| data[i]).collect()),
            Column::Text(data) => {
                Column::from_text(positions.iter().map(|&i| data[i].clone()).collect::<Vec<_>>())
            }
            Column::Bool(data) => Column::from_bool(positions.iter().map(|&i| data[i]).collect()),
        }
    }

    /// Returns true if both columns point at the same buffer
    pub fn shares_storage_with(&self, other: &Column) -> bool {
        match (self, other) {
            (Column::Float(a), Column::Float(b)) => Arc::ptr_eq(a, b),
            (Column::Int(a), Column::Int(b)) => Arc::ptr_eq(a, b),
            (Column::Text(a), Column::Text(b)) => Arc::ptr_eq(a, b),
            (Column::Bool(a), Column::Bool(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Overwrites every element with `value`, in place.
    ///
    /// Integers are widened into float columns; any other kind change is a
    /// type mismatch and leaves the column untouched.
    pub fn fill(&mut self, value: &Scalar) -> TableResult<()> {
        match (self, value) {
            (Column::Float(data), Scalar::Float(v)) => Arc::make_mut(data).fill(*v),
            (Column::Float(data), Scalar::Int(v)) => Arc::make_mut(data).fill(*v as f64),
            (Column::Int(data), Scalar::Int(v)) => Arc::make_mut(data).fill(*v),
            (Column::Text(data), Scalar::Text(v)) => {
                Arc::make_mut(data).iter_mut().for_each(|s| s.clone_from(v))
            }
            (Column::Bool(data), Scalar::Bool(v)) => Arc::make_mut(data).fill(*v),
            (col, value) => {
                return Err(TableError::type_mismatch(format!(
                    "cannot broadcast {} value into {} column",
                    value.kind_name(),
                    col.kind().as_str()
                )))
            }
        }
        Ok(())
    }
}

impl From<Vec<f64>> for Column {
    fn from(data: Vec<f64>) -> Self {
        Column::from_f64(data)
    }
}

impl From<Vec<i64>> for Column {
    fn from(data: Vec<i64>) -> Self {
        Column::from_i64(data)
    }
}

impl From<Vec<bool>> for Column {
    fn from(data: Vec<bool>) -> Self {
        Column::from_bool(data)
    }
}

impl From<Vec<String>> for Column {
    fn from(data: Vec<String>) -> Self {
        Column::Text(Arc::new(data))
    }
}

impl From<Vec<&str>> for Column {
    fn from(data: Vec<&str>) -> Self {
        Column::from_text(data)
    }
}
