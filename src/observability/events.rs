//! Observable table events
//!
//! Events are explicit and typed.

use std::fmt;

use super::Severity;

/// Observable events in a table's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Table constructed from columns
    TableCreated,
    /// Name index (re)built from the identifying column
    NameIndexBuilt,
    /// Whole column assigned or created
    ColumnReplaced,
    /// Scalar written into every row of a column
    ColumnBroadcast,
    /// Column removed
    ColumnDeleted,
    /// Column order rearranged
    ColumnOrderChanged,
    /// Row selector failed to resolve
    SelectorRejected,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::TableCreated => "TABLE_CREATED",
            Event::NameIndexBuilt => "NAME_INDEX_BUILT",
            Event::ColumnReplaced => "COLUMN_REPLACED",
            Event::ColumnBroadcast => "COLUMN_BROADCAST",
            Event::ColumnDeleted => "COLUMN_DELETED",
            Event::ColumnOrderChanged => "COLUMN_ORDER_CHANGED",
            Event::SelectorRejected => "SELECTOR_REJECTED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::NameIndexBuilt | Event::SelectorRejected => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
