//! Read access: columns, rows and cells

use super::Table;
use crate::column::{Column, Scalar};
use crate::errors::{TableError, TableResult};
use crate::expr::{evaluate, Evaluated};
use crate::observability::Event;
use crate::rows::{RowDispatcher, RowSelector, Selection};

/// Which columns a request addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelector {
    /// A column name, or an expression over columns
    Name(String),
    /// Several columns, as a sub-table
    Names(Vec<String>),
}

impl From<&str> for ColumnSelector {
    fn from(name: &str) -> Self {
        ColumnSelector::Name(name.to_string())
    }
}

impl From<String> for ColumnSelector {
    fn from(name: String) -> Self {
        ColumnSelector::Name(name)
    }
}

impl From<Vec<&str>> for ColumnSelector {
    fn from(names: Vec<&str>) -> Self {
        ColumnSelector::Names(names.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for ColumnSelector {
    fn from(names: Vec<String>) -> Self {
        ColumnSelector::Names(names)
    }
}

impl<const N: usize> From<[&str; N]> for ColumnSelector {
    fn from(names: [&str; N]) -> Self {
        ColumnSelector::Names(names.iter().map(|n| n.to_string()).collect())
    }
}

/// Result of a table read
#[derive(Debug, Clone)]
pub enum Value {
    Scalar(Scalar),
    Column(Column),
    Table(Table),
}

impl Value {
    pub fn into_scalar(self) -> Option<Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_column(self) -> Option<Column> {
        match self {
            Value::Column(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl Table {
    /// Reads whole columns.
    ///
    /// A name that is not a column is evaluated as an expression, so
    /// `get("betx+sqrt(bety)")` yields a derived column.
    pub fn get(&self, columns: impl Into<ColumnSelector>) -> TableResult<Value> {
        match columns.into() {
            ColumnSelector::Name(name) => Ok(match self.column_or_expression(&name)? {
                Evaluated::Column(column) => Value::Column(column),
                Evaluated::Scalar(scalar) => Value::Scalar(scalar),
            }),
            ColumnSelector::Names(names) => Ok(Value::Table(self.cols(names.as_slice())?)),
        }
    }

    /// Reads columns at selected rows.
    ///
    /// One column and one row yield a scalar, one column and many rows a
    /// column, several columns a sub-table.
    pub fn get_at(
        &self,
        columns: impl Into<ColumnSelector>,
        rows: impl Into<RowSelector>,
    ) -> TableResult<Value> {
        let rows = rows.into();

        match columns.into() {
            ColumnSelector::Name(name) => {
                let evaluated = self.column_or_expression(&name)?;
                let selection = self.select(&rows)?;
                let column = match evaluated {
                    Evaluated::Column(column) => column,
                    Evaluated::Scalar(scalar) => return Ok(Value::Scalar(scalar)),
                };
                match selection {
                    Selection::Single(row) => column
                        .get(row)
                        .map(Value::Scalar)
                        .ok_or_else(|| TableError::index(row as i64, "column")),
                    other => Ok(Value::Column(column.take(&other.positions()))),
                }
            }
            ColumnSelector::Names(names) => {
                let table = self.cols(names.as_slice())?;
                let selection = self.select(&rows)?;
                Ok(Value::Table(table.take_rows(&selection.positions())))
            }
        }
    }

    /// Sub-table of the selected rows.
    ///
    /// Unmatched plain names select nothing here rather than failing.
    pub fn rows(&self, rows: impl Into<RowSelector>) -> TableResult<Table> {
        let selector = rows.into();
        if selector == RowSelector::All {
            return Ok(self.derived(self.columns.clone()));
        }
        let selection = RowDispatcher::new(self)
            .lenient()
            .select(&selector)
            .map_err(|e| self.rejected(&selector, e))?;
        Ok(self.take_rows(&selection.positions()))
    }

    /// Sub-table of the named columns, in request order.
    ///
    /// The identifying column is kept first when not requested.
    pub fn cols<S: AsRef<str>>(&self, names: &[S]) -> TableResult<Table> {
        let mut columns = Vec::with_capacity(names.len() + 1);
        let identifying = &self.config.identifying_column;
        let requested = |n: &str| names.iter().any(|s| s.as_ref() == n);

        if !requested(identifying) {
            if let Some(column) = self.column(identifying) {
                columns.push((identifying.clone(), column.clone()));
            }
        }
        for name in names {
            let name = name.as_ref();
            let column = self.column(name).ok_or_else(|| TableError::name(name))?;
            if columns.iter().any(|(n, _)| n == name) {
                return Err(TableError::construction(format!(
                    "Duplicate column name '{}'",
                    name
                )));
            }
            columns.push((name.to_string(), column.clone()));
        }
        Ok(self.derived(columns))
    }

    /// Boolean mask over every row
    pub fn mask(&self, rows: impl Into<RowSelector>) -> TableResult<Vec<bool>> {
        let selector = rows.into();
        RowDispatcher::new(self)
            .mask(&selector)
            .map_err(|e| self.rejected(&selector, e))
    }

    /// Resolves a row selector to absolute rows
    pub fn select(&self, rows: &RowSelector) -> TableResult<Selection> {
        RowDispatcher::new(self)
            .select(rows)
            .map_err(|e| self.rejected(rows, e))
    }

    /// Positions of rows whose expression value is true, e.g. `"s > 1"`
    pub fn matching(&self, expression: &str) -> TableResult<RowSelector> {
        match evaluate(expression, self)? {
            Evaluated::Column(column) => RowSelector::from_mask_column(&column),
            Evaluated::Scalar(Scalar::Bool(flag)) => Ok(RowSelector::Mask(vec![flag; self.len()])),
            Evaluated::Scalar(other) => Err(TableError::type_mismatch(format!(
                "'{}' is a {} value, not a condition",
                expression,
                other.kind_name()
            ))),
        }
    }

    fn column_or_expression(&self, name: &str) -> TableResult<Evaluated> {
        match self.column(name) {
            Some(column) => Ok(Evaluated::Column(column.clone())),
            None => evaluate(name, self),
        }
    }

    pub(super) fn take_rows(&self, positions: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|(name, column)| (name.clone(), column.take(positions)))
            .collect();
        self.derived(columns)
    }

    fn rejected(&self, selector: &RowSelector, error: TableError) -> TableError {
        if !self.logs(Event::SelectorRejected) {
            return error;
        }
        self.log(
            Event::SelectorRejected,
            &[
                ("code", error.code()),
                ("reason", &error.to_string()),
                ("selector", &format!("{:?}", selector)),
            ],
        );
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lattice() -> Table {
        Table::new([
            ("name", Column::from_text(["ip1", "ip2", "ip2", "ip3", "tab$end"])),
            ("s", Column::from_f64(vec![1.0, 2.0, 2.1, 3.0, 4.0])),
            ("betx", Column::from_f64(vec![4.0, 5.0, 5.1, 6.0, 7.0])),
            ("bety", Column::from_f64(vec![2.0, 3.0, 3.1, 4.0, 9.0])),
        ])
        .unwrap()
    }

    fn floats(v: Value) -> Vec<f64> {
        v.into_column().unwrap().as_f64_slice().unwrap().to_vec()
    }

    #[test]
    fn test_get_column_shares_storage() {
        let t = lattice();
        let s = t.get("s").unwrap().into_column().unwrap();
        assert!(s.shares_storage_with(t.column("s").unwrap()));
    }

    #[test]
    fn test_get_expression() {
        let t = lattice();
        let out = floats(t.get("betx+sqrt(bety)").unwrap());
        assert_eq!(out[3], 8.0);
    }

    #[test]
    fn test_get_unknown_name() {
        let err = lattice().get("bbb").unwrap_err();
        assert_eq!(err.to_string(), "name 'bbb' is not defined");
    }

    #[test]
    fn test_get_at_scalar_and_column() {
        let t = lattice();
        assert_eq!(t.get_at("s", "ip3").unwrap().into_scalar(), Some(Scalar::Float(3.0)));
        assert_eq!(floats(t.get_at("s", "ip[23]").unwrap()), vec![2.0, 2.1, 3.0]);
        assert_eq!(
            t.get_at("betx+sqrt(bety)", 4).unwrap().into_scalar(),
            Some(Scalar::Float(10.0))
        );
    }

    #[test]
    fn test_get_at_sub_table() {
        let t = lattice();
        let sub = t.get_at(["betx"], 1..3).unwrap().into_table().unwrap();
        assert_eq!(sub.column_names(), vec!["name", "betx"]);
        assert_eq!(sub.len(), 2);
    }

    #[test]
    fn test_get_at_resolves_columns_first() {
        let t = lattice();
        assert_eq!(t.get_at("bbb", "notthere").unwrap_err(), TableError::name("bbb"));
        assert_eq!(t.get_at(["betx", "bbb"], "notthere").unwrap_err(), TableError::name("bbb"));
        assert_eq!(t.get_at("2 * 3", "notthere").unwrap_err().code(), "TABLE_LOOKUP");
    }

    #[test]
    fn test_rows_lenient() {
        let t = lattice();
        assert!(t.rows("notthere").unwrap().is_empty());
        assert_eq!(t.get_at("s", "notthere").unwrap_err().code(), "TABLE_LOOKUP");
    }

    #[test]
    fn test_rows_all_shares_storage() {
        let t = lattice();
        let all = t.rows(..).unwrap();
        assert!(all.column("s").unwrap().shares_storage_with(t.column("s").unwrap()));
    }

    #[test]
    fn test_cols_keeps_identifying_column() {
        let t = lattice();
        let sub = t.cols(&["bety", "s"]).unwrap();
        assert_eq!(sub.column_names(), vec!["name", "bety", "s"]);
        let sub = t.cols(&["s", "name"]).unwrap();
        assert_eq!(sub.column_names(), vec!["s", "name"]);
        assert_eq!(t.cols(&["nope"]).unwrap_err(), TableError::name("nope"));
    }

    #[test]
    fn test_mask() {
        let t = lattice();
        assert_eq!(t.mask(vec![2, 1]).unwrap(), vec![false, true, true, false, false]);
    }

    #[test]
    fn test_matching_condition() {
        let t = lattice();
        let above_one = t.matching("s > 1").unwrap();
        let chain = RowSelector::chain([above_one, RowSelector::Index(1)]);
        assert_eq!(t.get_at("s", chain).unwrap().into_scalar(), Some(Scalar::Float(2.1)));
        assert_eq!(t.matching("s + 1").unwrap_err().code(), "TABLE_TYPE");
    }
}
