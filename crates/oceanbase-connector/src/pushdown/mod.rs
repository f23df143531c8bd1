//! Rewrite rules contributed to the engine's pushdown framework.
//!
//! The engine decides whether to push a predicate or aggregate down; these
//! rules only say how (and whether it is possible) for this backend:
//!
//! - [`predicate`]: numeric comparisons, conjunctions and disjunctions
//! - [`aggregate`]: count, min/max, sum, avg and the statistical aggregates
//!
//! A rule that does not apply returns `Ok(None)` so the engine evaluates the
//! expression itself.

pub mod aggregate;
pub mod predicate;

use serde::Serialize;

use crate::core::types::{BackendTypeDescriptor, LogicalType};
use crate::core::value::LogicalValue;

pub use aggregate::{
    implement_aggregation, supports_aggregation_pushdown, AggregateCall, AggregateFunction,
    AggregateExpression,
};
pub use predicate::{convert_predicate, ComparisonOperator, Expression};

/// Column reference as seen by the rewrite rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    /// Remote column name, unquoted.
    pub name: String,
    pub logical_type: LogicalType,
    /// Driver type of the column, reused as the result type of some aggregates.
    pub type_handle: BackendTypeDescriptor,
}

impl ColumnRef {
    pub fn new(
        name: impl Into<String>,
        logical_type: LogicalType,
        type_handle: BackendTypeDescriptor,
    ) -> Self {
        Self {
            name: name.into(),
            logical_type,
            type_handle,
        }
    }
}

/// Bound parameter of a rewritten expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryParameter {
    pub logical_type: LogicalType,
    pub value: LogicalValue,
}

/// SQL text with `?` placeholders and their parameters, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterizedExpression {
    pub sql: String,
    pub parameters: Vec<QueryParameter>,
}

impl ParameterizedExpression {
    pub fn new(sql: impl Into<String>, parameters: Vec<QueryParameter>) -> Self {
        Self {
            sql: sql.into(),
            parameters,
        }
    }
}
