//! Type mapping between backend columns and engine logical types.
//!
//! - [`read`]: backend type descriptor to [`ColumnMapping`]
//! - [`write`]: logical type to [`WriteMapping`] (DDL type plus bind strategy)
//! - [`functions`]: the read and write strategies both directions share

pub mod functions;
pub mod read;
pub mod write;

use serde::Serialize;

use crate::core::types::LogicalType;

pub use functions::{ReadFunction, WriteFunction};
pub use read::to_column_mapping;
pub use write::to_write_mapping;

/// Whether predicates on a column may be evaluated by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PushdownPolicy {
    Full,
    Disabled,
    /// Equality is unsafe because the remote compares case-insensitively;
    /// range and membership checks are left to the engine too.
    CaseInsensitive,
}

impl PushdownPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            PushdownPolicy::Full => "full",
            PushdownPolicy::Disabled => "disabled",
            PushdownPolicy::CaseInsensitive => "case-insensitive",
        }
    }
}

/// Result of resolving one backend column on the read path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMapping {
    pub logical_type: LogicalType,
    pub read: ReadFunction,
    /// Used when a value of this column is bound back as a parameter.
    pub write: WriteFunction,
    pub pushdown: PushdownPolicy,
}

impl ColumnMapping {
    /// Mapping with full predicate pushdown.
    pub fn full(logical_type: LogicalType, read: ReadFunction, write: WriteFunction) -> Self {
        Self {
            logical_type,
            read,
            write,
            pushdown: PushdownPolicy::Full,
        }
    }

    /// Mapping whose predicates always stay in the engine.
    pub fn disabled(logical_type: LogicalType, read: ReadFunction, write: WriteFunction) -> Self {
        Self {
            logical_type,
            read,
            write,
            pushdown: PushdownPolicy::Disabled,
        }
    }

    pub fn case_insensitive(
        logical_type: LogicalType,
        read: ReadFunction,
        write: WriteFunction,
    ) -> Self {
        Self {
            logical_type,
            read,
            write,
            pushdown: PushdownPolicy::CaseInsensitive,
        }
    }
}

/// Result of mapping a logical type on the write path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteMapping {
    /// Backend DDL type (`datetime(3)`, `number(10)`, ...).
    pub data_type: String,
    pub write: WriteFunction,
}

impl WriteMapping {
    pub fn new(data_type: impl Into<String>, write: WriteFunction) -> Self {
        Self {
            data_type: data_type.into(),
            write,
        }
    }
}
