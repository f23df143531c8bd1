//! Core abstractions of the connector.
//!
//! - [`mode`]: the compatible mode selected at configuration time
//! - [`types`]: backend type descriptors and engine logical types
//! - [`value`]: backend and engine value representations
//! - [`identifier`]: identifier validation, quoting and literals
//! - [`traits`]: the `Dialect` strategy and the `MetadataConnection` collaborator
//!
//! Everything here is mode-parameterized and free of shared mutable state.

pub mod identifier;
pub mod mode;
pub mod traits;
pub mod types;
pub mod value;

pub use mode::CompatibleMode;
pub use traits::{Dialect, MetadataConnection, SortItem, SortOrder, TableFilter, TableRow};
pub use types::{BackendTypeDescriptor, JdbcType, LogicalType};
pub use value::{BackendValue, LogicalValue, SqlNullType};
