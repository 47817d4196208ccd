//! Table configuration
//!
//! Configuration is plain data with per-field defaults, so a partial JSON
//! document (or none at all) yields a usable table setup.

use serde::{Deserialize, Serialize};

use crate::errors::{TableError, TableResult};

/// What to do when a name-range bound resolves outside the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundPolicy {
    /// Clamp the bound to the first/last row
    Clamp,
    /// Reject the selector with an index error
    Fail,
}

/// Table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Column used for symbolic row lookup (default: "name")
    #[serde(default = "default_identifying_column")]
    pub identifying_column: String,

    /// Out-of-range handling for name-range bounds (default: clamp).
    /// Single-row access always fails out of range.
    #[serde(default = "default_range_bounds")]
    pub range_bounds: BoundPolicy,

    /// Emit lifecycle events to the logger (default: true)
    #[serde(default = "default_log_events")]
    pub log_events: bool,
}

fn default_identifying_column() -> String {
    "name".to_string()
}

fn default_range_bounds() -> BoundPolicy {
    BoundPolicy::Clamp
}

fn default_log_events() -> bool {
    true
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            identifying_column: default_identifying_column(),
            range_bounds: default_range_bounds(),
            log_events: default_log_events(),
        }
    }
}

impl TableConfig {
    /// Create a config that identifies rows by `column`
    pub fn with_identifying_column(column: impl Into<String>) -> Self {
        Self {
            identifying_column: column.into(),
            ..Default::default()
        }
    }

    /// Sets the range bound policy
    pub fn range_bounds(mut self, policy: BoundPolicy) -> Self {
        self.range_bounds = policy;
        self
    }

    /// Parses a JSON configuration document
    pub fn from_json(json: &str) -> TableResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| TableError::parse(json, format!("invalid table config: {}", e)))
    }
}
