//! Column storage for lattab
//!
//! Columns are typed, fixed-length buffers behind reference counts.
//! Handing a column out of a table is a pointer copy; writing to a shared
//! column copies it first.

mod column;
mod scalar;

pub use column::{Column, ColumnKind};
pub use scalar::Scalar;
