//! Compatible-mode dialect implementations.
//!
//! - [`mysql`]: MySQL-compatible mode
//! - [`oracle`]: Oracle-compatible mode
//!
//! # Static dispatch
//!
//! [`DialectImpl`] wraps both dialects in an enum that implements
//! [`Dialect`] by matching on the variant, so the facade holds one concrete
//! type instead of a `Box<dyn Dialect>`.

pub mod mysql;
pub mod oracle;

pub use mysql::MysqlModeDialect;
pub use oracle::OracleModeDialect;

use crate::core::traits::{Dialect, SortItem};
use crate::core::types::LogicalType;
use crate::core::CompatibleMode;
use crate::error::Result;

/// Enum-based static dispatch for dialects.
#[derive(Debug, Clone)]
pub enum DialectImpl {
    MySql(MysqlModeDialect),
    Oracle(OracleModeDialect),
}

impl DialectImpl {
    /// Dialect for a compatible mode.
    pub fn from_mode(mode: CompatibleMode) -> Self {
        match mode {
            CompatibleMode::MySql => DialectImpl::MySql(MysqlModeDialect::new()),
            CompatibleMode::Oracle => DialectImpl::Oracle(OracleModeDialect::new()),
        }
    }

    /// Dialect from configuration text (`mysql`, `oracle`, blank for mysql).
    ///
    /// # Errors
    ///
    /// Returns an InvalidConfiguration error for any other mode name.
    pub fn from_mode_name(name: &str) -> Result<Self> {
        Ok(Self::from_mode(CompatibleMode::parse(name)?))
    }

    pub fn mode(&self) -> CompatibleMode {
        match self {
            DialectImpl::MySql(_) => CompatibleMode::MySql,
            DialectImpl::Oracle(_) => CompatibleMode::Oracle,
        }
    }
}

impl Dialect for DialectImpl {
    fn name(&self) -> &str {
        match self {
            DialectImpl::MySql(d) => d.name(),
            DialectImpl::Oracle(d) => d.name(),
        }
    }

    fn quote_ident(&self, name: &str) -> Result<String> {
        match self {
            DialectImpl::MySql(d) => d.quote_ident(name),
            DialectImpl::Oracle(d) => d.quote_ident(name),
        }
    }

    fn to_remote_identifier(&self, name: &str) -> String {
        match self {
            DialectImpl::MySql(d) => d.to_remote_identifier(name),
            DialectImpl::Oracle(d) => d.to_remote_identifier(name),
        }
    }

    fn filter_schema(&self, schema: &str) -> bool {
        match self {
            DialectImpl::MySql(d) => d.filter_schema(schema),
            DialectImpl::Oracle(d) => d.filter_schema(schema),
        }
    }

    fn table_schema_column(&self) -> &'static str {
        match self {
            DialectImpl::MySql(d) => d.table_schema_column(),
            DialectImpl::Oracle(d) => d.table_schema_column(),
        }
    }

    fn limit_sql(&self, sql: &str, limit: u64) -> String {
        match self {
            DialectImpl::MySql(d) => d.limit_sql(sql, limit),
            DialectImpl::Oracle(d) => d.limit_sql(sql, limit),
        }
    }

    fn supports_top_n(&self, sort_items: &[SortItem]) -> bool {
        match self {
            DialectImpl::MySql(d) => d.supports_top_n(sort_items),
            DialectImpl::Oracle(d) => d.supports_top_n(sort_items),
        }
    }

    fn top_n_sql(&self, sql: &str, sort_items: &[SortItem], limit: u64) -> Result<String> {
        match self {
            DialectImpl::MySql(d) => d.top_n_sql(sql, sort_items, limit),
            DialectImpl::Oracle(d) => d.top_n_sql(sql, sort_items, limit),
        }
    }

    fn is_top_n_guaranteed(&self) -> Result<bool> {
        match self {
            DialectImpl::MySql(d) => d.is_top_n_guaranteed(),
            DialectImpl::Oracle(d) => d.is_top_n_guaranteed(),
        }
    }

    fn is_supported_join_condition(&self, left: &LogicalType, right: &LogicalType) -> bool {
        match self {
            DialectImpl::MySql(d) => d.is_supported_join_condition(left, right),
            DialectImpl::Oracle(d) => d.is_supported_join_condition(left, right),
        }
    }

    fn supports_schema_ddl(&self) -> bool {
        match self {
            DialectImpl::MySql(d) => d.supports_schema_ddl(),
            DialectImpl::Oracle(d) => d.supports_schema_ddl(),
        }
    }

    fn varchar_literal(&self, value: &str) -> String {
        match self {
            DialectImpl::MySql(d) => d.varchar_literal(value),
            DialectImpl::Oracle(d) => d.varchar_literal(value),
        }
    }

    fn table_comment_sql(&self, quoted_table: &str, comment: Option<&str>) -> String {
        match self {
            DialectImpl::MySql(d) => d.table_comment_sql(quoted_table, comment),
            DialectImpl::Oracle(d) => d.table_comment_sql(quoted_table, comment),
        }
    }

    fn null_clause(&self, nullable: bool) -> &'static str {
        match self {
            DialectImpl::MySql(d) => d.null_clause(nullable),
            DialectImpl::Oracle(d) => d.null_clause(nullable),
        }
    }
}
