//! lattab - An in-memory columnar table with lattice-style row addressing
//!
//! Rows are addressed by position, by name (`ip2::1>>1`), by full-match
//! pattern (`ip[23]`), by ranges, masks and chained stages. Columns are
//! addressed by name or by arithmetic expressions over columns.

pub mod column;
pub mod config;
pub mod errors;
pub mod expr;
pub mod index;
pub mod observability;
pub mod rows;
pub mod selector;
pub mod table;

pub use column::{Column, ColumnKind, Scalar};
pub use config::{BoundPolicy, TableConfig};
pub use errors::{TableError, TableResult};
pub use expr::{evaluate, ColumnSource, Evaluated, Expression};
pub use index::NameIndex;
pub use rows::{RowDispatcher, RowSelector, RowSource, Selection};
pub use selector::{parse_selector, SelectorDescriptor};
pub use table::{Assign, ColumnSelector, Table, Value};
