//! Name selector grammar
//!
//! A row can be named by its identifying value, optionally narrowed to one
//! occurrence of a repeated name and shifted by a relative offset:
//!
//! - `ip2` first row named `ip2`
//! - `ip2::1` second row named `ip2`
//! - `ip2::-1` last row named `ip2`
//! - `ip2::1>>1` the row after the second `ip2`
//! - `ip2<<2` two rows before the first `ip2`

mod parser;

pub use parser::{parse_selector, SelectorDescriptor};
