//! MySQL-compatible mode SQL dialect (Strategy pattern).
//!
//! Backtick quoting, `LIMIT n` pagination, Top-N with NULL placement emulated
//! through `ISNULL(col)` keys, and collation-aware pushdown restrictions.

use crate::core::identifier::{mysql_varchar_literal, quote_mysql};
use crate::core::traits::{Dialect, SortItem, SortOrder};
use crate::core::types::LogicalType;
use crate::error::Result;

/// System databases hidden from listings, lowercase.
const INTERNAL_DATABASES: &[&str] = &["information_schema", "mysql", "oceanbase"];

/// OceanBase MySQL-compatible mode dialect.
#[derive(Debug, Clone, Default)]
pub struct MysqlModeDialect;

impl MysqlModeDialect {
    /// Create a new MySQL-mode dialect instance.
    pub fn new() -> Self {
        Self
    }

    /// ORDER BY keys for one sort item.
    ///
    /// The backend sorts NULLs first ascending and last descending. Other
    /// placements get an `ISNULL(col)` key in front of the value key.
    fn order_keys(&self, item: &SortItem) -> Result<Vec<String>> {
        let column = self.quote_ident(&item.column)?;
        let direction = if item.order.is_ascending() { "ASC" } else { "DESC" };
        let value_key = format!("{} {}", column, direction);
        Ok(match item.order {
            SortOrder::AscNullsFirst | SortOrder::DescNullsLast => vec![value_key],
            SortOrder::AscNullsLast => vec![format!("ISNULL({}) ASC", column), value_key],
            SortOrder::DescNullsFirst => vec![format!("ISNULL({}) DESC", column), value_key],
        })
    }
}

impl Dialect for MysqlModeDialect {
    fn name(&self) -> &str {
        "mysql"
    }

    fn quote_ident(&self, name: &str) -> Result<String> {
        quote_mysql(name)
    }

    fn to_remote_identifier(&self, name: &str) -> String {
        name.to_string()
    }

    fn filter_schema(&self, schema: &str) -> bool {
        !INTERNAL_DATABASES.contains(&schema.to_lowercase().as_str())
    }

    fn table_schema_column(&self) -> &'static str {
        // databases are reported as catalogs
        "TABLE_CAT"
    }

    fn limit_sql(&self, sql: &str, limit: u64) -> String {
        format!("{} LIMIT {}", sql, limit)
    }

    fn supports_top_n(&self, sort_items: &[SortItem]) -> bool {
        sort_items.iter().all(|item| !item.logical_type.is_textual())
    }

    fn top_n_sql(&self, sql: &str, sort_items: &[SortItem], limit: u64) -> Result<String> {
        let mut keys = Vec::with_capacity(sort_items.len() * 2);
        for item in sort_items {
            keys.extend(self.order_keys(item)?);
        }
        Ok(format!("{} ORDER BY {} LIMIT {}", sql, keys.join(", "), limit))
    }

    fn is_top_n_guaranteed(&self) -> Result<bool> {
        Ok(true)
    }

    fn is_supported_join_condition(&self, left: &LogicalType, right: &LogicalType) -> bool {
        // engine and backend collations disagree on text equality
        !left.is_textual() && !right.is_textual()
    }

    fn supports_schema_ddl(&self) -> bool {
        true
    }

    fn varchar_literal(&self, value: &str) -> String {
        mysql_varchar_literal(value)
    }

    fn table_comment_sql(&self, quoted_table: &str, comment: Option<&str>) -> String {
        format!(
            "ALTER TABLE {} COMMENT {}",
            quoted_table,
            self.varchar_literal(comment.unwrap_or(""))
        )
    }

    fn null_clause(&self, nullable: bool) -> &'static str {
        if nullable {
            "NULL"
        } else {
            "NOT NULL"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(column: &str, logical_type: LogicalType, order: SortOrder) -> SortItem {
        SortItem::new(column, logical_type, order)
    }

    #[test]
    fn test_quote_ident() {
        let dialect = MysqlModeDialect::new();
        assert_eq!(dialect.quote_ident("name").unwrap(), "`name`");
        assert_eq!(dialect.quote_ident("table`name").unwrap(), "`table``name`");
        assert_eq!(dialect.quote_ident("Users").unwrap(), "`Users`");
    }

    #[test]
    fn test_quoted_table() {
        let dialect = MysqlModeDialect::new();
        assert_eq!(dialect.quoted_table(None, Some("s"), "t").unwrap(), "`s`.`t`");
        assert_eq!(dialect.quoted_table(Some("db"), None, "t").unwrap(), "`db`.`t`");
    }

    #[test]
    fn test_filter_schema() {
        let dialect = MysqlModeDialect::new();
        assert!(!dialect.filter_schema("information_schema"));
        assert!(!dialect.filter_schema("MySQL"));
        assert!(!dialect.filter_schema("oceanbase"));
        assert!(dialect.filter_schema("sales"));
        assert!(dialect.filter_schema("SYS"));
    }

    #[test]
    fn test_limit_sql() {
        let dialect = MysqlModeDialect::new();
        assert_eq!(
            dialect.limit_sql("SELECT * FROM t", 10),
            "SELECT * FROM t LIMIT 10"
        );
    }

    #[test]
    fn test_top_n_rejects_textual_keys() {
        let dialect = MysqlModeDialect::new();
        assert!(dialect.supports_top_n(&[item("id", LogicalType::BigInt, SortOrder::AscNullsFirst)]));
        assert!(!dialect.supports_top_n(&[
            item("id", LogicalType::BigInt, SortOrder::AscNullsFirst),
            item("name", LogicalType::varchar(10), SortOrder::AscNullsFirst),
        ]));
        assert!(!dialect.supports_top_n(&[item(
            "code",
            LogicalType::Char { length: 2 },
            SortOrder::DescNullsLast
        )]));
    }

    #[test]
    fn test_top_n_null_placement() {
        let dialect = MysqlModeDialect::new();
        let sql = dialect
            .top_n_sql(
                "SELECT * FROM t",
                &[
                    item("a", LogicalType::Integer, SortOrder::AscNullsFirst),
                    item("b", LogicalType::Integer, SortOrder::AscNullsLast),
                    item("c", LogicalType::Integer, SortOrder::DescNullsFirst),
                    item("d", LogicalType::Integer, SortOrder::DescNullsLast),
                ],
                5,
            )
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM t ORDER BY `a` ASC, ISNULL(`b`) ASC, `b` ASC, \
             ISNULL(`c`) DESC, `c` DESC, `d` DESC LIMIT 5"
        );
        assert!(dialect.is_top_n_guaranteed().unwrap());
    }

    #[test]
    fn test_join_condition() {
        let dialect = MysqlModeDialect::new();
        assert!(dialect.is_supported_join_condition(&LogicalType::BigInt, &LogicalType::BigInt));
        assert!(!dialect
            .is_supported_join_condition(&LogicalType::BigInt, &LogicalType::unbounded_varchar()));
        assert!(!dialect
            .is_supported_join_condition(&LogicalType::Char { length: 3 }, &LogicalType::Integer));
    }

    #[test]
    fn test_table_comment_sql() {
        let dialect = MysqlModeDialect::new();
        assert_eq!(
            dialect.table_comment_sql("`s`.`t`", Some("it's")),
            "ALTER TABLE `s`.`t` COMMENT 'it''s'"
        );
        assert_eq!(
            dialect.table_comment_sql("`t`", None),
            "ALTER TABLE `t` COMMENT ''"
        );
    }

    #[test]
    fn test_null_clause_and_remote_names() {
        let dialect = MysqlModeDialect::new();
        assert_eq!(dialect.null_clause(true), "NULL");
        assert_eq!(dialect.null_clause(false), "NOT NULL");
        assert_eq!(dialect.to_remote_identifier("Orders"), "Orders");
        assert!(dialect.supports_schema_ddl());
    }
}
