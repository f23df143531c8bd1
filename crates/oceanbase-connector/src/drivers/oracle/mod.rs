//! OceanBase Oracle-compatible mode.
//!
//! - [`OracleModeDialect`]: SQL syntax strategy
//!
//! Schemas are managed outside the connector in this mode; listings come from
//! the schema columns of driver metadata.

mod dialect;

pub use dialect::OracleModeDialect;
