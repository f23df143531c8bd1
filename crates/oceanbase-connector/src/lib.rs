//! # oceanbase-connector
//!
//! Type mapping and SQL dialect core for OceanBase in its MySQL-compatible and
//! Oracle-compatible modes.
//!
//! This library provides:
//!
//! - **Read mappings** from driver column metadata to engine logical types
//! - **Write mappings** from logical types to backend DDL and bind strategies
//! - **Temporal codecs** for dates, times and timestamps at any precision
//! - **Dialect SQL** for quoting, pagination, Top-N and DDL statements
//! - **Pushdown rules** for predicates and aggregates
//!
//! ## Example
//!
//! ```rust
//! use oceanbase_connector::{BackendTypeDescriptor, CompatibleMode, JdbcType, OceanBaseClient};
//!
//! # fn main() -> oceanbase_connector::Result<()> {
//! let client = OceanBaseClient::for_mode(CompatibleMode::Oracle);
//! let descriptor = BackendTypeDescriptor::new(JdbcType::Numeric, "NUMBER")
//!     .with_column_size(12)
//!     .with_decimal_digits(2);
//! let mapping = client.to_column_mapping(&descriptor)?.expect("decimal is supported");
//! assert_eq!(mapping.logical_type.to_string(), "decimal(12,2)");
//! assert_eq!(client.limit("SELECT * FROM t", 10), "SELECT * FROM (SELECT * FROM t) WHERE ROWNUM <= 10");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod pushdown;
pub mod temporal;
pub mod typemap;

// Re-exports for convenient access
pub use client::{ColumnDefinition, OceanBaseClient, RemoteTableName, TableDefinition};
pub use config::{ConnectorConfig, DecimalMapping, DecimalRoundingMode, SessionSettings};
pub use crate::core::{
    BackendTypeDescriptor, BackendValue, CompatibleMode, Dialect, JdbcType, LogicalType,
    LogicalValue, MetadataConnection, SortItem, SortOrder, SqlNullType, TableFilter, TableRow,
};
pub use drivers::DialectImpl;
pub use error::{ConnectorError, Result};
pub use typemap::{ColumnMapping, PushdownPolicy, ReadFunction, WriteFunction, WriteMapping};
