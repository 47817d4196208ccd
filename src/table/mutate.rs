//! Column assignment, deletion and ordering

use std::collections::HashSet;

use super::Table;
use crate::column::{Column, Scalar};
use crate::errors::{TableError, TableResult};
use crate::observability::Event;

/// Right-hand side of a column assignment
#[derive(Debug, Clone, PartialEq)]
pub enum Assign {
    /// A full-length column
    Column(Column),
    /// One value written into every row
    Scalar(Scalar),
}

impl From<Column> for Assign {
    fn from(column: Column) -> Self {
        Assign::Column(column)
    }
}

impl From<Scalar> for Assign {
    fn from(value: Scalar) -> Self {
        Assign::Scalar(value)
    }
}

impl From<f64> for Assign {
    fn from(value: f64) -> Self {
        Assign::Scalar(Scalar::Float(value))
    }
}

impl From<i64> for Assign {
    fn from(value: i64) -> Self {
        Assign::Scalar(Scalar::Int(value))
    }
}

impl From<i32> for Assign {
    fn from(value: i32) -> Self {
        Assign::Scalar(Scalar::Int(i64::from(value)))
    }
}

impl From<bool> for Assign {
    fn from(value: bool) -> Self {
        Assign::Scalar(Scalar::Bool(value))
    }
}

impl From<&str> for Assign {
    fn from(value: &str) -> Self {
        Assign::Scalar(Scalar::Text(value.to_string()))
    }
}

impl From<Vec<f64>> for Assign {
    fn from(values: Vec<f64>) -> Self {
        Assign::Column(Column::from_f64(values))
    }
}

impl From<Vec<i64>> for Assign {
    fn from(values: Vec<i64>) -> Self {
        Assign::Column(Column::from_i64(values))
    }
}

impl From<Vec<bool>> for Assign {
    fn from(values: Vec<bool>) -> Self {
        Assign::Column(Column::from_bool(values))
    }
}

impl Table {
    /// Assigns a column.
    ///
    /// A column replaces (or appends) `name` and must match the row count. A
    /// scalar is written into every row of an existing column, widening
    /// integers into float columns, or creates a filled column.
    pub fn set(&mut self, name: &str, value: impl Into<Assign>) -> TableResult<()> {
        match value.into() {
            Assign::Column(column) => self.replace_column(name, column),
            Assign::Scalar(value) => self.broadcast(name, &value),
        }
    }

    fn replace_column(&mut self, name: &str, column: Column) -> TableResult<()> {
        let position = self.position_of(name);
        let others_exist = self.columns.len() > usize::from(position.is_some());
        if others_exist && column.len() != self.row_count() {
            return Err(TableError::construction(format!(
                "Column '{}' has {} rows, table has {}",
                name,
                column.len(),
                self.row_count()
            )));
        }

        match position {
            Some(i) => self.columns[i].1 = column,
            None => self.columns.push((name.to_string(), column)),
        }
        if self.is_identifying(name) {
            self.invalidate_names();
        }
        self.log(Event::ColumnReplaced, &[("column", name)]);
        Ok(())
    }

    fn broadcast(&mut self, name: &str, value: &Scalar) -> TableResult<()> {
        let rows = self.row_count();
        match self.position_of(name) {
            Some(i) => self.columns[i].1.fill(value)?,
            None => self.columns.push((name.to_string(), Column::full(value, rows))),
        }
        if self.is_identifying(name) {
            self.invalidate_names();
        }
        self.log(
            Event::ColumnBroadcast,
            &[("column", name), ("value", &value.to_string())],
        );
        Ok(())
    }

    /// Removes a column and returns it
    pub fn delete(&mut self, name: &str) -> TableResult<Column> {
        let position = self.position_of(name).ok_or_else(|| TableError::name(name))?;
        let (_, column) = self.columns.remove(position);
        if self.is_identifying(name) {
            self.invalidate_names();
        }
        self.log(Event::ColumnDeleted, &[("column", name)]);
        Ok(column)
    }

    /// Rearranges columns; `order` must name every column exactly once
    pub fn set_column_order<S: AsRef<str>>(&mut self, order: &[S]) -> TableResult<()> {
        let mut seen = HashSet::new();
        for name in order {
            let name = name.as_ref();
            if !self.contains(name) {
                return Err(TableError::name(name));
            }
            if !seen.insert(name) {
                return Err(TableError::construction(format!(
                    "Duplicate column name '{}' in column order",
                    name
                )));
            }
        }
        if seen.len() != self.columns.len() {
            return Err(TableError::construction(format!(
                "Column order names {} of {} columns",
                seen.len(),
                self.columns.len()
            )));
        }

        let mut columns = std::mem::take(&mut self.columns);
        for name in order {
            if let Some(i) = columns.iter().position(|(n, _)| n == name.as_ref()) {
                self.columns.push(columns.swap_remove(i));
            }
        }
        self.log(
            Event::ColumnOrderChanged,
            &[("order", &self.column_names().join(","))],
        );
        Ok(())
    }
}
