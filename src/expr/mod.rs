//! Column expression evaluator
//!
//! Evaluates arithmetic over table columns, e.g. `betx + sqrt(bety)` or
//! `s > 1 & name != 'ip3'`, without an embedded interpreter: a small
//! recursive-descent parser produces a tree that is evaluated elementwise.
//!
//! # Rules
//!
//! - Every bare identifier must be a column name, else `name 'X' is not defined`
//! - Only whitelisted functions are callable (`sqrt`, `abs`, `exp`, `log`, ...)
//! - Integer columns are promoted to float; comparisons produce booleans
//! - Text columns only take part in comparisons

mod eval;
mod lexer;
mod parser;

use std::collections::HashMap;

use crate::column::Column;
use crate::errors::TableResult;

pub use eval::Evaluated;

/// Read-only access to columns by name
pub trait ColumnSource {
    /// Returns the column called `name`, if present
    fn column(&self, name: &str) -> Option<&Column>;
}

impl ColumnSource for HashMap<String, Column> {
    fn column(&self, name: &str) -> Option<&Column> {
        self.get(name)
    }
}

/// A parsed expression, reusable across evaluations
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    tree: parser::Expr,
}

impl Expression {
    /// Parses an expression string
    pub fn parse(input: &str) -> TableResult<Self> {
        Ok(Self {
            source: input.to_string(),
            tree: parser::parse_expression(input)?,
        })
    }

    /// The original expression text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Column names the expression reads, in first-use order
    pub fn columns(&self) -> Vec<&str> {
        self.tree.columns()
    }

    /// Evaluates against `source`
    pub fn evaluate<S: ColumnSource + ?Sized>(&self, source: &S) -> TableResult<Evaluated> {
        Ok(eval::eval(&self.tree, source)?.into_result())
    }
}

/// Parses and evaluates `input` against `source` in one step
pub fn evaluate<S: ColumnSource + ?Sized>(input: &str, source: &S) -> TableResult<Evaluated> {
    Expression::parse(input)?.evaluate(source)
}
