//! Core traits of the connector.
//!
//! - [`Dialect`]: SQL syntax strategy for one compatible mode
//! - [`MetadataConnection`]: the connection collaborator that runs metadata
//!   lookups and statements against the backend
//!
//! # Design Patterns
//!
//! - **Strategy**: each compatible mode provides its own `Dialect`
//! - **Template Method**: `quoted_table` is built on `quote_ident`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::types::LogicalType;

/// Requested order of one sort key, NULL placement included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    AscNullsFirst,
    AscNullsLast,
    DescNullsFirst,
    DescNullsLast,
}

impl SortOrder {
    pub fn is_ascending(self) -> bool {
        matches!(self, SortOrder::AscNullsFirst | SortOrder::AscNullsLast)
    }

    pub fn is_nulls_first(self) -> bool {
        matches!(self, SortOrder::AscNullsFirst | SortOrder::DescNullsFirst)
    }
}

/// One key of an ORDER BY pushed to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortItem {
    /// Remote column name, unquoted.
    pub column: String,
    pub logical_type: LogicalType,
    pub order: SortOrder,
}

impl SortItem {
    pub fn new(column: impl Into<String>, logical_type: LogicalType, order: SortOrder) -> Self {
        Self {
            column: column.into(),
            logical_type,
            order,
        }
    }
}

/// SQL syntax strategy for a compatible mode.
///
/// Implementations are stateless; every method is a pure function of its
/// arguments.
pub trait Dialect: Send + Sync {
    /// Dialect identifier ("mysql", "oracle").
    fn name(&self) -> &str;

    /// Quote an identifier, doubling embedded quote characters.
    ///
    /// - MySQL mode: `` `identifier` ``
    /// - Oracle mode: `"identifier"`
    fn quote_ident(&self, name: &str) -> Result<String>;

    /// Qualified table name. The schema wins over the catalog; blank parts are skipped.
    fn quoted_table(&self, catalog: Option<&str>, schema: Option<&str>, table: &str) -> Result<String> {
        let qualifier = schema
            .filter(|s| !s.is_empty())
            .or_else(|| catalog.filter(|c| !c.is_empty()));
        match qualifier {
            Some(q) => Ok(format!("{}.{}", self.quote_ident(q)?, self.quote_ident(table)?)),
            None => self.quote_ident(table),
        }
    }

    /// Convert an engine name to the name stored by the backend.
    fn to_remote_identifier(&self, name: &str) -> String;

    /// Whether a schema shows up in listings (false for system schemas).
    fn filter_schema(&self, schema: &str) -> bool;

    /// Metadata column that holds the schema name of a table row.
    fn table_schema_column(&self) -> &'static str;

    /// Restrict `sql` to at most `limit` rows.
    fn limit_sql(&self, sql: &str, limit: u64) -> String;

    /// Whether the backend row limit is exact.
    fn is_limit_guaranteed(&self) -> bool {
        true
    }

    /// Whether ORDER BY plus LIMIT over these keys can run on the backend.
    fn supports_top_n(&self, sort_items: &[SortItem]) -> bool;

    /// ORDER BY plus LIMIT for `sql`.
    fn top_n_sql(&self, sql: &str, sort_items: &[SortItem], limit: u64) -> Result<String>;

    fn is_top_n_guaranteed(&self) -> Result<bool>;

    /// Whether a join on columns of these types can run on the backend.
    fn is_supported_join_condition(&self, left: &LogicalType, right: &LogicalType) -> bool;

    /// Whether CREATE SCHEMA and DROP SCHEMA are allowed.
    fn supports_schema_ddl(&self) -> bool;

    /// Quoted string literal.
    fn varchar_literal(&self, value: &str) -> String;

    /// Statement that sets (or with `None`, clears) a table comment.
    fn table_comment_sql(&self, quoted_table: &str, comment: Option<&str>) -> String;

    /// Trailing clause of a column definition.
    fn null_clause(&self, nullable: bool) -> &'static str;
}

/// Filter passed to [`MetadataConnection::get_tables`].
///
/// Patterns use LIKE syntax; literal `_` and `%` must already be escaped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableFilter {
    pub catalog: Option<String>,
    pub schema_pattern: Option<String>,
    pub table_pattern: Option<String>,
}

/// One table row of a metadata listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// `TABLE_CAT`
    pub catalog: Option<String>,
    /// `TABLE_SCHEM`
    pub schema: Option<String>,
    pub name: String,
    /// `REMARKS`
    pub remarks: Option<String>,
}

impl TableRow {
    /// Value of the named metadata column.
    pub fn column(&self, name: &str) -> Option<&str> {
        match name {
            "TABLE_CAT" => self.catalog.as_deref(),
            "TABLE_SCHEM" => self.schema.as_deref(),
            "TABLE_NAME" => Some(&self.name),
            "REMARKS" => self.remarks.as_deref(),
            _ => None,
        }
    }
}

/// Connection to the backend, provided by the caller.
///
/// Each call is one round trip. Implementations report driver failures as
/// [`crate::ConnectorError::Backend`]; the connector never retries.
#[async_trait]
pub trait MetadataConnection: Send + Sync {
    /// Catalog names (databases in MySQL mode).
    async fn list_catalogs(&self) -> Result<Vec<String>>;

    /// Schema names (users in Oracle mode).
    async fn list_schemas(&self) -> Result<Vec<String>>;

    async fn get_tables(&self, filter: &TableFilter) -> Result<Vec<TableRow>>;

    /// Escape string for LIKE patterns in metadata calls.
    fn search_string_escape(&self) -> &str;

    /// Execute a statement and return the affected row count.
    async fn execute(&self, sql: &str) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bracketed;

    impl Dialect for Bracketed {
        fn name(&self) -> &str {
            "bracketed"
        }
        fn quote_ident(&self, name: &str) -> Result<String> {
            Ok(format!("[{}]", name))
        }
        fn to_remote_identifier(&self, name: &str) -> String {
            name.to_string()
        }
        fn filter_schema(&self, _schema: &str) -> bool {
            true
        }
        fn table_schema_column(&self) -> &'static str {
            "TABLE_SCHEM"
        }
        fn limit_sql(&self, sql: &str, limit: u64) -> String {
            format!("{} LIMIT {}", sql, limit)
        }
        fn supports_top_n(&self, _sort_items: &[SortItem]) -> bool {
            false
        }
        fn top_n_sql(&self, sql: &str, _sort_items: &[SortItem], _limit: u64) -> Result<String> {
            Ok(sql.to_string())
        }
        fn is_top_n_guaranteed(&self) -> Result<bool> {
            Ok(false)
        }
        fn is_supported_join_condition(&self, _l: &LogicalType, _r: &LogicalType) -> bool {
            true
        }
        fn supports_schema_ddl(&self) -> bool {
            false
        }
        fn varchar_literal(&self, value: &str) -> String {
            format!("'{}'", value)
        }
        fn table_comment_sql(&self, quoted_table: &str, _comment: Option<&str>) -> String {
            quoted_table.to_string()
        }
        fn null_clause(&self, _nullable: bool) -> &'static str {
            ""
        }
    }

    #[test]
    fn test_quoted_table_prefers_schema() {
        let d = Bracketed;
        assert_eq!(d.quoted_table(Some("c"), Some("s"), "t").unwrap(), "[s].[t]");
        assert_eq!(d.quoted_table(Some("c"), None, "t").unwrap(), "[c].[t]");
        assert_eq!(d.quoted_table(Some("c"), Some(""), "t").unwrap(), "[c].[t]");
        assert_eq!(d.quoted_table(None, None, "t").unwrap(), "[t]");
        assert!(d.is_limit_guaranteed());
    }

    #[test]
    fn test_sort_order_flags() {
        assert!(SortOrder::AscNullsLast.is_ascending());
        assert!(!SortOrder::AscNullsLast.is_nulls_first());
        assert!(SortOrder::DescNullsFirst.is_nulls_first());
        assert!(!SortOrder::DescNullsFirst.is_ascending());
    }

    #[test]
    fn test_table_row_columns() {
        let row = TableRow {
            catalog: Some("shop".into()),
            schema: None,
            name: "orders".into(),
            remarks: Some("all orders".into()),
        };
        assert_eq!(row.column("TABLE_CAT"), Some("shop"));
        assert_eq!(row.column("TABLE_SCHEM"), None);
        assert_eq!(row.column("TABLE_NAME"), Some("orders"));
        assert_eq!(row.column("REMARKS"), Some("all orders"));
        assert_eq!(row.column("OTHER"), None);
    }
}
