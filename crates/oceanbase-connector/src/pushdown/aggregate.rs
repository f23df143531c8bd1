//! Aggregate rewrite rules.

use serde::Serialize;

use super::ColumnRef;
use crate::core::traits::Dialect;
use crate::core::types::{BackendTypeDescriptor, JdbcType, LogicalType, MAX_DECIMAL_PRECISION};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Min,
    Max,
    Sum,
    Avg,
    StddevSamp,
    StddevPop,
    VarSamp,
    VarPop,
    CovarSamp,
    CovarPop,
}

impl AggregateFunction {
    /// Engine function name, aliases included.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "count" => Some(AggregateFunction::Count),
            "min" => Some(AggregateFunction::Min),
            "max" => Some(AggregateFunction::Max),
            "sum" => Some(AggregateFunction::Sum),
            "avg" => Some(AggregateFunction::Avg),
            "stddev" | "stddev_samp" => Some(AggregateFunction::StddevSamp),
            "stddev_pop" => Some(AggregateFunction::StddevPop),
            "variance" | "var_samp" => Some(AggregateFunction::VarSamp),
            "var_pop" => Some(AggregateFunction::VarPop),
            "covar_samp" => Some(AggregateFunction::CovarSamp),
            "covar_pop" => Some(AggregateFunction::CovarPop),
            _ => None,
        }
    }

    /// Backend function name.
    pub fn sql_name(self) -> &'static str {
        match self {
            AggregateFunction::Count => "count",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Avg => "avg",
            AggregateFunction::StddevSamp => "stddev_samp",
            AggregateFunction::StddevPop => "stddev_pop",
            AggregateFunction::VarSamp => "var_samp",
            AggregateFunction::VarPop => "var_pop",
            AggregateFunction::CovarSamp => "covar_samp",
            AggregateFunction::CovarPop => "covar_pop",
        }
    }
}

/// Aggregate call offered for pushdown. `count(*)` has no arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateCall {
    pub function: AggregateFunction,
    pub arguments: Vec<ColumnRef>,
    pub distinct: bool,
}

impl AggregateCall {
    pub fn new(function: AggregateFunction, arguments: Vec<ColumnRef>) -> Self {
        Self {
            function,
            arguments,
            distinct: false,
        }
    }

    pub fn distinct(function: AggregateFunction, arguments: Vec<ColumnRef>) -> Self {
        Self {
            function,
            arguments,
            distinct: true,
        }
    }
}

/// Rewritten aggregate and the driver type its result is read with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateExpression {
    pub sql: String,
    pub result_type: BackendTypeDescriptor,
}

fn bigint_handle() -> BackendTypeDescriptor {
    BackendTypeDescriptor::new(JdbcType::BigInt, "bigint")
}

fn double_handle() -> BackendTypeDescriptor {
    BackendTypeDescriptor::new(JdbcType::Double, "double")
}

fn decimal_handle(precision: u32, scale: u32) -> BackendTypeDescriptor {
    BackendTypeDescriptor::new(JdbcType::Numeric, "decimal")
        .with_column_size(precision as i32)
        .with_decimal_digits(scale as i32)
}

/// Rewrite an aggregate call, or `Ok(None)` when no rule matches.
pub fn implement_aggregation<D: Dialect + ?Sized>(
    dialect: &D,
    call: &AggregateCall,
) -> Result<Option<AggregateExpression>> {
    use AggregateFunction::*;

    let name = call.function.sql_name();
    let rewritten = match (call.function, call.arguments.as_slice(), call.distinct) {
        (Count, [], false) => Some(AggregateExpression {
            sql: "count(*)".to_string(),
            result_type: bigint_handle(),
        }),
        (Count, [arg], distinct) => {
            let column = dialect.quote_ident(&arg.name)?;
            let sql = if distinct {
                format!("count(DISTINCT {})", column)
            } else {
                format!("count({})", column)
            };
            Some(AggregateExpression {
                sql,
                result_type: bigint_handle(),
            })
        }
        (_, _, true) => None,

        // remote collation orders text differently
        (Min | Max, [arg], _) if !arg.logical_type.is_textual() => Some(AggregateExpression {
            sql: format!("{}({})", name, dialect.quote_ident(&arg.name)?),
            result_type: arg.type_handle.clone(),
        }),

        (Sum, [arg], _) => {
            let result_type = match arg.logical_type {
                t if t.is_integer() => Some(bigint_handle()),
                LogicalType::Decimal { scale, .. } => {
                    Some(decimal_handle(MAX_DECIMAL_PRECISION, scale))
                }
                t if t.is_floating_point() => Some(double_handle()),
                _ => None,
            };
            match result_type {
                Some(result_type) => Some(AggregateExpression {
                    sql: format!("sum({})", dialect.quote_ident(&arg.name)?),
                    result_type,
                }),
                None => None,
            }
        }

        (Avg, [arg], _) => match arg.logical_type {
            t if t.is_floating_point() => Some(AggregateExpression {
                sql: format!("avg({})", dialect.quote_ident(&arg.name)?),
                result_type: arg.type_handle.clone(),
            }),
            LogicalType::Decimal { precision, scale } => Some(AggregateExpression {
                sql: format!(
                    "CAST(avg({}) AS decimal({}, {}))",
                    dialect.quote_ident(&arg.name)?,
                    precision,
                    scale
                ),
                result_type: arg.type_handle.clone(),
            }),
            _ => None,
        },

        (StddevSamp | StddevPop | VarSamp | VarPop, [arg], _)
            if arg.logical_type.is_floating_point() =>
        {
            Some(AggregateExpression {
                sql: format!("{}({})", name, dialect.quote_ident(&arg.name)?),
                result_type: arg.type_handle.clone(),
            })
        }

        (CovarSamp | CovarPop, [x, y], _)
            if x.logical_type == LogicalType::Double && y.logical_type == LogicalType::Double =>
        {
            Some(AggregateExpression {
                sql: format!(
                    "{}({}, {})",
                    name,
                    dialect.quote_ident(&x.name)?,
                    dialect.quote_ident(&y.name)?
                ),
                result_type: x.type_handle.clone(),
            })
        }

        _ => None,
    };
    Ok(rewritten)
}

/// Aggregations grouped by text columns stay in the engine.
pub fn supports_aggregation_pushdown(grouping_sets: &[Vec<ColumnRef>]) -> bool {
    grouping_sets
        .iter()
        .flatten()
        .all(|column| !column.logical_type.is_textual())
}
