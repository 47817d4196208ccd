//! Table error types
//!
//! Error codes:
//! - TABLE_CONSTRUCTION (column set rejected at build time)
//! - TABLE_PARSE (malformed selector or expression)
//! - TABLE_NAME (identifier does not exist)
//! - TABLE_INDEX (occurrence or position out of range)
//! - TABLE_LOOKUP (plain selector matched nothing)
//! - TABLE_TYPE (value of the wrong kind for the operation)

use thiserror::Error;

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

/// Errors raised while building, querying or mutating a table.
///
/// Every error is raised at the point of resolution; an operation that fails
/// leaves the table unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Column set rejected at construction time
    #[error("{0}")]
    Construction(String),

    /// Malformed selector or expression syntax
    #[error("invalid syntax in '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// Identifier is not defined (column in an expression, name in a selector)
    #[error("name '{0}' is not defined")]
    Name(String),

    /// Occurrence index or absolute position out of range
    #[error("index {index} is out of range for {context}")]
    Index { index: i64, context: String },

    /// A plain selector string matched nothing
    #[error("Cannot find '{key}' in column '{column}'")]
    Lookup { key: String, column: String },

    /// Operand of the wrong kind for the requested operation
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
}

impl TableError {
    /// Create a construction error
    pub fn construction(reason: impl Into<String>) -> Self {
        TableError::Construction(reason.into())
    }

    /// Create a parse error carrying the offending input
    pub fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        TableError::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a name error for a missing identifier
    pub fn name(identifier: impl Into<String>) -> Self {
        TableError::Name(identifier.into())
    }

    /// Create an index error
    pub fn index(index: i64, context: impl Into<String>) -> Self {
        TableError::Index {
            index,
            context: context.into(),
        }
    }

    /// Create a lookup error for an exact-match miss
    pub fn lookup(key: impl Into<String>, column: impl Into<String>) -> Self {
        TableError::Lookup {
            key: key.into(),
            column: column.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(reason: impl Into<String>) -> Self {
        TableError::TypeMismatch(reason.into())
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            TableError::Construction(_) => "TABLE_CONSTRUCTION",
            TableError::Parse { .. } => "TABLE_PARSE",
            TableError::Name(_) => "TABLE_NAME",
            TableError::Index { .. } => "TABLE_INDEX",
            TableError::Lookup { .. } => "TABLE_LOOKUP",
            TableError::TypeMismatch(_) => "TABLE_TYPE",
        }
    }

    /// Returns true when the error reports a missing key rather than bad input
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, TableError::Name(_) | TableError::Lookup { .. })
    }
}
