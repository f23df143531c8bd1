//! Oracle-compatible mode SQL dialect (Strategy pattern).

use crate::core::identifier::{quote_oracle, varchar_literal};
use crate::core::traits::{Dialect, SortItem};
use crate::core::types::LogicalType;
use crate::error::{ConnectorError, Result};

/// System schemas hidden from listings, uppercase.
const INTERNAL_SCHEMAS: &[&str] = &["SYS", "LBACSYS", "ORAAUDITOR"];

/// OceanBase Oracle-compatible mode dialect.
///
/// Unquoted names are stored uppercase, pagination wraps the query in a
/// `ROWNUM` filter and ordered Top-N is never pushed down.
#[derive(Debug, Clone, Default)]
pub struct OracleModeDialect;

impl OracleModeDialect {
    /// Create a new Oracle-mode dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for OracleModeDialect {
    fn name(&self) -> &str {
        "oracle"
    }

    fn quote_ident(&self, name: &str) -> Result<String> {
        quote_oracle(name)
    }

    fn to_remote_identifier(&self, name: &str) -> String {
        name.to_uppercase()
    }

    fn filter_schema(&self, schema: &str) -> bool {
        !INTERNAL_SCHEMAS.contains(&schema.to_uppercase().as_str())
    }

    fn table_schema_column(&self) -> &'static str {
        "TABLE_SCHEM"
    }

    fn limit_sql(&self, sql: &str, limit: u64) -> String {
        format!("SELECT * FROM ({}) WHERE ROWNUM <= {}", sql, limit)
    }

    fn supports_top_n(&self, _sort_items: &[SortItem]) -> bool {
        false
    }

    fn top_n_sql(&self, _sql: &str, _sort_items: &[SortItem], _limit: u64) -> Result<String> {
        Err(ConnectorError::not_supported(
            "This connector does not support Top-N pushdown on Oracle mode",
        ))
    }

    fn is_top_n_guaranteed(&self) -> Result<bool> {
        Err(ConnectorError::not_supported(
            "isTopNGuaranteed is not implemented on Oracle mode",
        ))
    }

    fn is_supported_join_condition(&self, _left: &LogicalType, _right: &LogicalType) -> bool {
        true
    }

    fn supports_schema_ddl(&self) -> bool {
        false
    }

    fn varchar_literal(&self, value: &str) -> String {
        varchar_literal(value)
    }

    fn table_comment_sql(&self, quoted_table: &str, comment: Option<&str>) -> String {
        format!(
            "COMMENT ON TABLE {} IS {}",
            quoted_table,
            self.varchar_literal(comment.unwrap_or(""))
        )
    }

    fn null_clause(&self, nullable: bool) -> &'static str {
        if nullable {
            ""
        } else {
            "NOT NULL"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::SortOrder;

    #[test]
    fn test_quote_ident() {
        let dialect = OracleModeDialect::new();
        assert_eq!(dialect.quote_ident("ORDERS").unwrap(), "\"ORDERS\"");
        assert_eq!(dialect.quote_ident("a\"b").unwrap(), "\"a\"\"b\"");
    }

    #[test]
    fn test_quoted_remote_table() {
        let dialect = OracleModeDialect::new();
        let schema = dialect.to_remote_identifier("s");
        let table = dialect.to_remote_identifier("t");
        assert_eq!(
            dialect.quoted_table(None, Some(&schema), &table).unwrap(),
            "\"S\".\"T\""
        );
    }

    #[test]
    fn test_filter_schema() {
        let dialect = OracleModeDialect::new();
        assert!(!dialect.filter_schema("SYS"));
        assert!(!dialect.filter_schema("lbacsys"));
        assert!(!dialect.filter_schema("ORAAUDITOR"));
        assert!(dialect.filter_schema("mysql"));
        assert!(dialect.filter_schema("SALES"));
    }

    #[test]
    fn test_limit_sql() {
        let dialect = OracleModeDialect::new();
        assert_eq!(
            dialect.limit_sql("SELECT * FROM t", 10),
            "SELECT * FROM (SELECT * FROM t) WHERE ROWNUM <= 10"
        );
        assert!(dialect.is_limit_guaranteed());
    }

    #[test]
    fn test_top_n_never_pushed_down() {
        let dialect = OracleModeDialect::new();
        let items = [SortItem::new("id", LogicalType::BigInt, SortOrder::AscNullsLast)];
        assert!(!dialect.supports_top_n(&items));
        assert!(matches!(
            dialect.top_n_sql("SELECT * FROM t", &items, 3),
            Err(ConnectorError::NotSupported(_))
        ));
        assert!(matches!(
            dialect.is_top_n_guaranteed(),
            Err(ConnectorError::NotSupported(_))
        ));
    }

    #[test]
    fn test_join_condition_accepts_text() {
        let dialect = OracleModeDialect::new();
        assert!(dialect.is_supported_join_condition(
            &LogicalType::varchar(10),
            &LogicalType::Char { length: 10 }
        ));
    }

    #[test]
    fn test_table_comment_sql() {
        let dialect = OracleModeDialect::new();
        assert_eq!(
            dialect.table_comment_sql("\"S\".\"T\"", Some("it's")),
            "COMMENT ON TABLE \"S\".\"T\" IS 'it''s'"
        );
        assert_eq!(
            dialect.table_comment_sql("\"T\"", None),
            "COMMENT ON TABLE \"T\" IS ''"
        );
        // backslash is not an escape character here
        assert_eq!(dialect.varchar_literal(r"a\b"), r"'a\b'");
    }

    #[test]
    fn test_null_clause() {
        let dialect = OracleModeDialect::new();
        assert_eq!(dialect.null_clause(true), "");
        assert_eq!(dialect.null_clause(false), "NOT NULL");
        assert!(!dialect.supports_schema_ddl());
    }
}
