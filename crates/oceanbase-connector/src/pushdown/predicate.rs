//! Predicate rewrite rules.
//!
//! Only comparisons whose operands are both numeric are pushed down. Textual
//! comparisons stay in the engine because the remote collation is
//! case-insensitive.

use super::{ColumnRef, ParameterizedExpression, QueryParameter};
use crate::core::traits::Dialect;
use crate::core::types::LogicalType;
use crate::core::value::LogicalValue;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl ComparisonOperator {
    pub fn as_sql(self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "<>",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessThanOrEqual => "<=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterThanOrEqual => ">=",
        }
    }
}

/// Engine expression offered for pushdown.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Column(ColumnRef),
    Constant {
        logical_type: LogicalType,
        value: LogicalValue,
    },
    Comparison {
        operator: ComparisonOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    And(Vec<Expression>),
    Or(Vec<Expression>),
}

impl Expression {
    pub fn column(column: ColumnRef) -> Self {
        Expression::Column(column)
    }

    pub fn constant(logical_type: LogicalType, value: LogicalValue) -> Self {
        Expression::Constant {
            logical_type,
            value,
        }
    }

    pub fn comparison(operator: ComparisonOperator, left: Expression, right: Expression) -> Self {
        Expression::Comparison {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn logical_type(&self) -> LogicalType {
        match self {
            Expression::Column(c) => c.logical_type,
            Expression::Constant { logical_type, .. } => *logical_type,
            Expression::Comparison { .. } | Expression::And(_) | Expression::Or(_) => {
                LogicalType::Boolean
            }
        }
    }
}

/// Rewrite an engine predicate into backend SQL.
///
/// Returns `Ok(None)` when any part of the expression has no rule.
pub fn convert_predicate<D: Dialect + ?Sized>(
    dialect: &D,
    expression: &Expression,
) -> Result<Option<ParameterizedExpression>> {
    let mut parameters = Vec::new();
    let sql = rewrite(dialect, expression, &mut parameters)?;
    Ok(sql.map(|sql| ParameterizedExpression::new(sql, parameters)))
}

fn rewrite<D: Dialect + ?Sized>(
    dialect: &D,
    expression: &Expression,
    parameters: &mut Vec<QueryParameter>,
) -> Result<Option<String>> {
    match expression {
        Expression::Column(column) => Ok(Some(dialect.quote_ident(&column.name)?)),

        Expression::Constant {
            logical_type,
            value,
        } => {
            let bindable = !value.is_null()
                && (logical_type.is_integer()
                    || matches!(
                        logical_type,
                        LogicalType::Decimal { .. } | LogicalType::Varchar { .. }
                    ));
            if !bindable {
                return Ok(None);
            }
            parameters.push(QueryParameter {
                logical_type: *logical_type,
                value: value.clone(),
            });
            Ok(Some("?".to_string()))
        }

        Expression::Comparison {
            operator,
            left,
            right,
        } => {
            if !left.logical_type().is_numeric() || !right.logical_type().is_numeric() {
                return Ok(None);
            }
            let Some(l) = rewrite(dialect, left, parameters)? else {
                return Ok(None);
            };
            let Some(r) = rewrite(dialect, right, parameters)? else {
                return Ok(None);
            };
            Ok(Some(format!("({}) {} ({})", l, operator.as_sql(), r)))
        }

        Expression::And(terms) => rewrite_terms(dialect, terms, "AND", parameters),
        Expression::Or(terms) => rewrite_terms(dialect, terms, "OR", parameters),
    }
}

fn rewrite_terms<D: Dialect + ?Sized>(
    dialect: &D,
    terms: &[Expression],
    keyword: &str,
    parameters: &mut Vec<QueryParameter>,
) -> Result<Option<String>> {
    if terms.len() < 2 {
        return Ok(None);
    }
    let mut rewritten = Vec::with_capacity(terms.len());
    for term in terms {
        match rewrite(dialect, term, parameters)? {
            Some(sql) => rewritten.push(sql),
            None => return Ok(None),
        }
    }
    Ok(Some(format!(
        "({})",
        rewritten.join(&format!(") {} (", keyword))
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{BackendTypeDescriptor, JdbcType};
    use crate::drivers::{MysqlModeDialect, OracleModeDialect};
    use rust_decimal::Decimal;

    fn col(name: &str, logical_type: LogicalType) -> Expression {
        Expression::column(ColumnRef::new(
            name,
            logical_type,
            BackendTypeDescriptor::new(JdbcType::Other, "any"),
        ))
    }

    fn long(v: i64) -> Expression {
        Expression::constant(LogicalType::BigInt, LogicalValue::Long(v))
    }

    #[test]
    fn test_numeric_comparison() {
        let expr = Expression::comparison(
            ComparisonOperator::GreaterThanOrEqual,
            col("qty", LogicalType::Integer),
            long(10),
        );
        let rewritten = convert_predicate(&MysqlModeDialect::new(), &expr)
            .unwrap()
            .unwrap();
        assert_eq!(rewritten.sql, "(`qty`) >= (?)");
        assert_eq!(rewritten.parameters.len(), 1);
        assert_eq!(rewritten.parameters[0].value, LogicalValue::Long(10));
    }

    #[test]
    fn test_all_operators() {
        let ops = [
            (ComparisonOperator::Equal, "="),
            (ComparisonOperator::NotEqual, "<>"),
            (ComparisonOperator::LessThan, "<"),
            (ComparisonOperator::LessThanOrEqual, "<="),
            (ComparisonOperator::GreaterThan, ">"),
            (ComparisonOperator::GreaterThanOrEqual, ">="),
        ];
        for (op, sql) in ops {
            let expr = Expression::comparison(
                op,
                col("A", LogicalType::Double),
                col("B", LogicalType::Decimal { precision: 10, scale: 2 }),
            );
            let rewritten = convert_predicate(&OracleModeDialect::new(), &expr)
                .unwrap()
                .unwrap();
            assert_eq!(rewritten.sql, format!("(\"A\") {} (\"B\")", sql));
        }
    }

    #[test]
    fn test_textual_comparison_is_not_pushed() {
        let expr = Expression::comparison(
            ComparisonOperator::Equal,
            col("name", LogicalType::varchar(10)),
            Expression::constant(LogicalType::varchar(3), LogicalValue::Text("bob".into())),
        );
        assert_eq!(convert_predicate(&MysqlModeDialect::new(), &expr).unwrap(), None);
    }

    #[test]
    fn test_conjunction_keeps_parameter_order() {
        let expr = Expression::And(vec![
            Expression::comparison(ComparisonOperator::LessThan, col("a", LogicalType::BigInt), long(1)),
            Expression::comparison(
                ComparisonOperator::Equal,
                col("b", LogicalType::Decimal { precision: 5, scale: 1 }),
                Expression::constant(
                    LogicalType::Decimal { precision: 5, scale: 1 },
                    LogicalValue::Decimal(Decimal::new(25, 1)),
                ),
            ),
        ]);
        let rewritten = convert_predicate(&MysqlModeDialect::new(), &expr)
            .unwrap()
            .unwrap();
        assert_eq!(rewritten.sql, "((`a`) < (?)) AND ((`b`) = (?))");
        assert_eq!(rewritten.parameters[0].value, LogicalValue::Long(1));
        assert_eq!(
            rewritten.parameters[1].value,
            LogicalValue::Decimal(Decimal::new(25, 1))
        );
    }

    #[test]
    fn test_disjunction_with_unsupported_term() {
        let expr = Expression::Or(vec![
            Expression::comparison(ComparisonOperator::Equal, col("a", LogicalType::BigInt), long(1)),
            Expression::comparison(
                ComparisonOperator::Equal,
                col("d", LogicalType::Date),
                Expression::constant(LogicalType::Date, LogicalValue::Date(0)),
            ),
        ]);
        assert_eq!(convert_predicate(&MysqlModeDialect::new(), &expr).unwrap(), None);
    }

    #[test]
    fn test_floating_constant_and_null_are_not_bound() {
        let expr = Expression::comparison(
            ComparisonOperator::Equal,
            col("x", LogicalType::Double),
            Expression::constant(LogicalType::Double, LogicalValue::Double(1.5)),
        );
        assert_eq!(convert_predicate(&MysqlModeDialect::new(), &expr).unwrap(), None);

        let null = Expression::comparison(
            ComparisonOperator::Equal,
            col("x", LogicalType::BigInt),
            Expression::constant(LogicalType::BigInt, LogicalValue::Null),
        );
        assert_eq!(convert_predicate(&MysqlModeDialect::new(), &null).unwrap(), None);
    }
}
