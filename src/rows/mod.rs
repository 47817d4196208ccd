//! Row Selector Dispatcher
//!
//! Turns a [`RowSelector`] into absolute row positions or a mask.
//!
//! # Selector shapes
//!
//! | Shape | Example | Result |
//! |---|---|---|
//! | position | `1`, `-1` | one row |
//! | name | `"ip2::1>>1"` | one row |
//! | pattern | `"ip[23]"` | every full match, ascending |
//! | slice | `1..4`, `[1:4:3]` | Python-style half-open slice |
//! | name range | `"ip1":"ip3"` | inclusive, ascending |
//! | value range | `1.5:2.5:"s"` | rows with `s` in the closed interval |
//! | lists | `[3, 1]`, `["ip1", "ip3"]` | concatenated, in list order |
//! | mask | `[true, false, ..]` | flagged rows |
//! | chain | `(mask, 1)` | each stage within the previous stage's rows |
//!
//! # Invariants
//!
//! - A string is an exact name if its parsed base is in the name index;
//!   otherwise it is a pattern if it contains regex metacharacters
//! - An unmatched pattern selects nothing; an unmatched plain name is a
//!   lookup error unless resolution is lenient or inside a name list
//! - Single-row selectors never clamp

mod dispatcher;
mod pattern;
mod selector;
mod slice;

pub use dispatcher::{RowDispatcher, RowSource, Selection};
pub use selector::RowSelector;
