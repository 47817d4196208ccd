//! Table
//!
//! An ordered mapping from column name to equal-length [`Column`]s, with one
//! identifying column (default `name`) that rows are addressed by.
//!
//! # Access
//!
//! ```ignore
//! t.get("betx")?;                       // column, shares storage
//! t.get("betx+sqrt(bety)")?;            // derived column
//! t.get_at("betx", "ip2::1")?;          // scalar
//! t.get_at("betx", "ip[23]")?;          // column of matching rows
//! t.rows(RowSelector::name_range("ip1", "ip3"))?; // sub-table
//! t.set("betx", 0.0)?;                  // broadcast in place
//! ```
//!
//! # Invariants
//!
//! - Every column has the same length
//! - Column names are unique and their order is meaningful
//! - The cached name index always reflects the current identifying column
//! - Reads never mutate; returned columns and sub-tables share buffers
//!   that later writes copy before changing
//!
//! [`Column`]: crate::column::Column

mod access;
mod mutate;
mod table;

pub use access::{ColumnSelector, Value};
pub use mutate::Assign;
pub use table::Table;
