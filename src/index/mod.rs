//! Name index subsystem for lattab
//!
//! The index is derived, in-memory state mirroring the identifying column.
//!
//! # Design Principles
//!
//! - Derived state: the column is the source of truth, the index a cache
//! - Versioned: each index records the column version it was built from
//! - Deterministic: occurrence lists are ascending, names keep first-appearance order
//!
//! # Invariants
//!
//! - Occurrence list lengths sum to the row count
//! - An index is rebuilt, never patched, after the identifying column changes

mod name_index;

pub use name_index::{identifying_values, NameIndex};

pub(crate) use name_index::normalize;
