//! OceanBase MySQL-compatible mode.
//!
//! This module provides the MySQL-mode implementation of:
//! - [`MysqlModeDialect`]: SQL syntax strategy
//!
//! Databases are reported through driver metadata as catalogs, so schema
//! listings and table lookups go through the catalog columns.

mod dialect;

pub use dialect::MysqlModeDialect;
