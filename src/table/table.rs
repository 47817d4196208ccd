//! Table storage, construction and name index caching

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use crate::column::Column;
use crate::config::{BoundPolicy, TableConfig};
use crate::errors::{TableError, TableResult};
use crate::expr::ColumnSource;
use crate::index::NameIndex;
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::rows::RowSource;

/// An ordered set of equal-length named columns
#[derive(Debug, Clone)]
pub struct Table {
    pub(super) columns: Vec<(String, Column)>,
    pub(super) config: TableConfig,
    /// Bumped on every change to the identifying column
    pub(super) version: u64,
    pub(super) name_index: OnceLock<Arc<NameIndex>>,
}

impl Table {
    /// Builds a table with the default configuration.
    ///
    /// Fails if two columns share a name or lengths differ.
    pub fn new<I, S>(columns: I) -> TableResult<Self>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        Self::with_config(columns, TableConfig::default())
    }

    /// Builds a table with an explicit configuration
    pub fn with_config<I, S>(columns: I, config: TableConfig) -> TableResult<Self>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let columns: Vec<(String, Column)> = columns
            .into_iter()
            .map(|(name, column)| (name.into(), column))
            .collect();

        let mut seen = HashSet::new();
        for (name, _) in &columns {
            if !seen.insert(name.as_str()) {
                return Err(TableError::construction(format!(
                    "Duplicate column name '{}'",
                    name
                )));
            }
        }

        if let Some((first, reference)) = columns.first() {
            if let Some((name, column)) = columns.iter().find(|(_, c)| c.len() != reference.len()) {
                return Err(TableError::construction(format!(
                    "Columns have different lengths: '{}' has {} rows, '{}' has {}",
                    first,
                    reference.len(),
                    name,
                    column.len()
                )));
            }
        }

        let table = Self {
            columns,
            config,
            version: 0,
            name_index: OnceLock::new(),
        };
        table.log(
            Event::TableCreated,
            &[
                ("columns", &table.columns.len().to_string()),
                ("rows", &table.row_count().to_string()),
            ],
        );
        Ok(table)
    }

    /// Builds a table over already-validated columns
    pub(super) fn derived(&self, columns: Vec<(String, Column)>) -> Self {
        Self {
            columns,
            config: self.config.clone(),
            version: 0,
            name_index: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |(_, c)| c.len())
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.row_count()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Column names in table order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position_of(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, column)| column)
    }

    /// Mutable access to a column.
    ///
    /// Borrowing the identifying column this way invalidates the name index.
    /// The column must keep its length.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        let position = self.position_of(name)?;
        if self.is_identifying(name) {
            self.invalidate_names();
        }
        Some(&mut self.columns[position].1)
    }

    /// Consumes the table, returning its columns in order
    pub fn into_columns(self) -> Vec<(String, Column)> {
        self.columns
    }

    pub(super) fn position_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|(n, _)| n == name)
    }

    pub(super) fn is_identifying(&self, name: &str) -> bool {
        name == self.config.identifying_column
    }

    /// Index over the identifying column, built on first use
    pub fn name_index(&self) -> TableResult<Arc<NameIndex>> {
        if let Some(index) = self.name_index.get() {
            return Ok(Arc::clone(index));
        }

        let name = &self.config.identifying_column;
        let column = self.column(name).ok_or_else(|| TableError::name(name.as_str()))?;
        let index = Arc::new(NameIndex::build(column, self.version));
        self.log(
            Event::NameIndexBuilt,
            &[
                ("distinct", &index.names().count().to_string()),
                ("rows", &column.len().to_string()),
                ("version", &self.version.to_string()),
            ],
        );
        let _ = self.name_index.set(Arc::clone(&index));
        Ok(index)
    }

    /// Drops the cached name index after the identifying column changed
    pub(super) fn invalidate_names(&mut self) {
        self.version += 1;
        self.name_index = OnceLock::new();
    }

    /// True if `name` labels more than one row
    pub fn is_repeated(&self, name: &str) -> TableResult<bool> {
        Ok(self.name_index()?.is_repeated(name))
    }

    /// Absolute row of the `occurrence`-th row named `name`
    pub fn get_index(&self, name: &str, occurrence: Option<i64>) -> TableResult<usize> {
        self.name_index()?.get_index(name, occurrence)
    }

    /// True if `event` would be written under the current configuration
    pub(super) fn logs(&self, event: Event) -> bool {
        self.config.log_events && Logger::enabled(event.severity())
    }

    pub(super) fn log(&self, event: Event, fields: &[(&str, &str)]) {
        if self.logs(event) {
            log_event_with_fields(event, fields);
        }
    }
}

impl ColumnSource for Table {
    fn column(&self, name: &str) -> Option<&Column> {
        Table::column(self, name)
    }
}

impl RowSource for Table {
    fn row_count(&self) -> usize {
        Table::row_count(self)
    }

    fn identifying_column(&self) -> &str {
        &self.config.identifying_column
    }

    fn name_index(&self) -> TableResult<Arc<NameIndex>> {
        Table::name_index(self)
    }

    fn range_bounds(&self) -> BoundPolicy {
        self.config.range_bounds
    }
}
