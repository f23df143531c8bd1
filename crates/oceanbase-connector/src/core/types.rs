//! Backend type descriptors and the portable logical type system.
//!
//! The read path turns a [`BackendTypeDescriptor`] (driver metadata for one
//! column) into a [`LogicalType`]; the write path turns a [`LogicalType`] back
//! into backend DDL.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConnectorError, Result};

/// Largest decimal precision the engine represents.
pub const MAX_DECIMAL_PRECISION: u32 = 38;

/// Largest CHAR length the engine represents.
pub const MAX_CHAR_LENGTH: u32 = 65_536;

/// Largest bounded VARCHAR length the engine represents.
pub const MAX_VARCHAR_LENGTH: u32 = i32::MAX as u32 - 1;

/// Largest fractional-second precision of engine TIME/TIMESTAMP types.
pub const MAX_TEMPORAL_PRECISION: u32 = 12;

// =============================================================================
// JDBC type codes
// =============================================================================

/// Generic driver type code (the `java.sql.Types` numbering) plus the two
/// vendor codes the backend reports for Oracle-mode binary floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JdbcType {
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    Varchar,
    LongVarchar,
    NChar,
    NVarchar,
    LongNVarchar,
    Date,
    Time,
    Timestamp,
    Binary,
    VarBinary,
    LongVarBinary,
    Null,
    Other,
    JavaObject,
    Distinct,
    Struct,
    Array,
    Blob,
    Clob,
    NClob,
    Ref,
    Boolean,
    RowId,
    SqlXml,
    TimeWithTimezone,
    TimestampWithTimezone,
    /// OceanBase Oracle mode `BINARY_FLOAT`.
    BinaryFloat,
    /// OceanBase Oracle mode `BINARY_DOUBLE`.
    BinaryDouble,
    /// Any code without a name here.
    Unknown(i32),
}

/// Name and code of every named type, used for both lookups.
const JDBC_TYPES: &[(JdbcType, &str, i32)] = &[
    (JdbcType::Bit, "BIT", -7),
    (JdbcType::TinyInt, "TINYINT", -6),
    (JdbcType::SmallInt, "SMALLINT", 5),
    (JdbcType::Integer, "INTEGER", 4),
    (JdbcType::BigInt, "BIGINT", -5),
    (JdbcType::Float, "FLOAT", 6),
    (JdbcType::Real, "REAL", 7),
    (JdbcType::Double, "DOUBLE", 8),
    (JdbcType::Numeric, "NUMERIC", 2),
    (JdbcType::Decimal, "DECIMAL", 3),
    (JdbcType::Char, "CHAR", 1),
    (JdbcType::Varchar, "VARCHAR", 12),
    (JdbcType::LongVarchar, "LONGVARCHAR", -1),
    (JdbcType::NChar, "NCHAR", -15),
    (JdbcType::NVarchar, "NVARCHAR", -9),
    (JdbcType::LongNVarchar, "LONGNVARCHAR", -16),
    (JdbcType::Date, "DATE", 91),
    (JdbcType::Time, "TIME", 92),
    (JdbcType::Timestamp, "TIMESTAMP", 93),
    (JdbcType::Binary, "BINARY", -2),
    (JdbcType::VarBinary, "VARBINARY", -3),
    (JdbcType::LongVarBinary, "LONGVARBINARY", -4),
    (JdbcType::Null, "NULL", 0),
    (JdbcType::Other, "OTHER", 1111),
    (JdbcType::JavaObject, "JAVA_OBJECT", 2000),
    (JdbcType::Distinct, "DISTINCT", 2001),
    (JdbcType::Struct, "STRUCT", 2002),
    (JdbcType::Array, "ARRAY", 2003),
    (JdbcType::Blob, "BLOB", 2004),
    (JdbcType::Clob, "CLOB", 2005),
    (JdbcType::Ref, "REF", 2006),
    (JdbcType::Boolean, "BOOLEAN", 16),
    (JdbcType::RowId, "ROWID", -8),
    (JdbcType::NClob, "NCLOB", 2011),
    (JdbcType::SqlXml, "SQLXML", 2009),
    (JdbcType::TimeWithTimezone, "TIME_WITH_TIMEZONE", 2013),
    (JdbcType::TimestampWithTimezone, "TIMESTAMP_WITH_TIMEZONE", 2014),
    (JdbcType::BinaryFloat, "BINARY_FLOAT", 100),
    (JdbcType::BinaryDouble, "BINARY_DOUBLE", 101),
];

impl JdbcType {
    pub fn from_code(code: i32) -> Self {
        JDBC_TYPES
            .iter()
            .find(|(_, _, c)| *c == code)
            .map(|(t, _, _)| *t)
            .unwrap_or(JdbcType::Unknown(code))
    }

    /// Look up a type by its upper-case name (`VARCHAR`, `OTHER`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_uppercase();
        JDBC_TYPES
            .iter()
            .find(|(_, n, _)| *n == upper)
            .map(|(t, _, _)| *t)
    }

    pub fn code(self) -> i32 {
        match self {
            JdbcType::Unknown(code) => code,
            named => JDBC_TYPES
                .iter()
                .find(|(t, _, _)| *t == named)
                .map(|(_, _, c)| *c)
                .unwrap_or_default(),
        }
    }

    pub fn name(self) -> Option<&'static str> {
        JDBC_TYPES
            .iter()
            .find(|(t, _, _)| *t == self)
            .map(|(_, n, _)| *n)
    }
}

impl fmt::Display for JdbcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.code()),
        }
    }
}

// =============================================================================
// Backend type descriptor
// =============================================================================

/// Driver metadata describing one backend column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendTypeDescriptor {
    /// Generic type code reported by the driver.
    pub jdbc_type: i32,
    /// Backend type name (`int unsigned`, `datetime`, ...). Matched case-insensitively.
    pub type_name: Option<String>,
    /// Declared size: precision for numerics, length for text, display size for temporals.
    pub column_size: Option<i32>,
    /// Declared scale.
    pub decimal_digits: Option<i32>,
}

impl BackendTypeDescriptor {
    pub fn new(jdbc_type: JdbcType, type_name: impl Into<String>) -> Self {
        Self {
            jdbc_type: jdbc_type.code(),
            type_name: Some(type_name.into()),
            column_size: None,
            decimal_digits: None,
        }
    }

    #[must_use]
    pub fn with_column_size(mut self, size: i32) -> Self {
        self.column_size = Some(size);
        self
    }

    #[must_use]
    pub fn with_decimal_digits(mut self, digits: i32) -> Self {
        self.decimal_digits = Some(digits);
        self
    }

    pub fn jdbc_type(&self) -> JdbcType {
        JdbcType::from_code(self.jdbc_type)
    }

    pub fn required_type_name(&self) -> Result<&str> {
        self.type_name
            .as_deref()
            .ok_or_else(|| ConnectorError::metadata(format!("Type name is missing: {}", self)))
    }

    pub fn required_column_size(&self) -> Result<i32> {
        self.column_size
            .ok_or_else(|| ConnectorError::metadata(format!("Column size not present: {}", self)))
    }

    pub fn required_decimal_digits(&self) -> Result<i32> {
        self.decimal_digits.ok_or_else(|| {
            ConnectorError::metadata(format!("Decimal digits not present: {}", self))
        })
    }
}

impl fmt::Display for BackendTypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{jdbc_type={}, type_name={}, column_size={}, decimal_digits={}}}",
            JdbcType::from_code(self.jdbc_type),
            self.type_name.as_deref().unwrap_or("<none>"),
            self.column_size.map_or("<none>".to_string(), |v| v.to_string()),
            self.decimal_digits.map_or("<none>".to_string(), |v| v.to_string()),
        )
    }
}

// =============================================================================
// Logical types
// =============================================================================

/// Engine-portable column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogicalType {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Decimal { precision: u32, scale: u32 },
    Char { length: u32 },
    /// `None` is unbounded.
    Varchar { length: Option<u32> },
    Varbinary,
    Json,
    Date,
    Time { precision: u32 },
    Timestamp { precision: u32 },
    TimestampWithTimeZone { precision: u32 },
    TimeWithTimeZone { precision: u32 },
    Uuid,
}

impl LogicalType {
    pub fn decimal(precision: u32, scale: u32) -> Result<Self> {
        if precision == 0 || precision > MAX_DECIMAL_PRECISION {
            return Err(ConnectorError::invalid_value(format!(
                "DECIMAL precision must be in range [1, {}]: {}",
                MAX_DECIMAL_PRECISION, precision
            )));
        }
        if scale > precision {
            return Err(ConnectorError::invalid_value(format!(
                "DECIMAL scale must be in range [0, precision ({})]: {}",
                precision, scale
            )));
        }
        Ok(LogicalType::Decimal { precision, scale })
    }

    pub fn char(length: u32) -> Result<Self> {
        if length > MAX_CHAR_LENGTH {
            return Err(ConnectorError::invalid_value(format!(
                "CHAR length must be in range [0, {}]: {}",
                MAX_CHAR_LENGTH, length
            )));
        }
        Ok(LogicalType::Char { length })
    }

    pub fn varchar(length: u32) -> Self {
        LogicalType::Varchar {
            length: Some(length),
        }
    }

    pub fn unbounded_varchar() -> Self {
        LogicalType::Varchar { length: None }
    }

    pub fn time(precision: u32) -> Result<Self> {
        check_temporal_precision("TIME", precision)?;
        Ok(LogicalType::Time { precision })
    }

    pub fn timestamp(precision: u32) -> Result<Self> {
        check_temporal_precision("TIMESTAMP", precision)?;
        Ok(LogicalType::Timestamp { precision })
    }

    pub fn timestamp_with_time_zone(precision: u32) -> Result<Self> {
        check_temporal_precision("TIMESTAMP WITH TIME ZONE", precision)?;
        Ok(LogicalType::TimestampWithTimeZone { precision })
    }

    /// Char and Varchar, whose comparison semantics depend on remote collation.
    pub fn is_textual(&self) -> bool {
        matches!(self, LogicalType::Char { .. } | LogicalType::Varchar { .. })
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            LogicalType::TinyInt
                | LogicalType::SmallInt
                | LogicalType::Integer
                | LogicalType::BigInt
                | LogicalType::Decimal { .. }
                | LogicalType::Real
                | LogicalType::Double
        )
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            LogicalType::TinyInt | LogicalType::SmallInt | LogicalType::Integer | LogicalType::BigInt
        )
    }

    pub fn is_floating_point(&self) -> bool {
        matches!(self, LogicalType::Real | LogicalType::Double)
    }
}

fn check_temporal_precision(kind: &str, precision: u32) -> Result<()> {
    if precision > MAX_TEMPORAL_PRECISION {
        return Err(ConnectorError::invalid_value(format!(
            "{} precision must be in range [0, {}]: {}",
            kind, MAX_TEMPORAL_PRECISION, precision
        )));
    }
    Ok(())
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalType::Boolean => write!(f, "boolean"),
            LogicalType::TinyInt => write!(f, "tinyint"),
            LogicalType::SmallInt => write!(f, "smallint"),
            LogicalType::Integer => write!(f, "integer"),
            LogicalType::BigInt => write!(f, "bigint"),
            LogicalType::Real => write!(f, "real"),
            LogicalType::Double => write!(f, "double"),
            LogicalType::Decimal { precision, scale } => {
                write!(f, "decimal({},{})", precision, scale)
            }
            LogicalType::Char { length } => write!(f, "char({})", length),
            LogicalType::Varchar { length: Some(n) } => write!(f, "varchar({})", n),
            LogicalType::Varchar { length: None } => write!(f, "varchar"),
            LogicalType::Varbinary => write!(f, "varbinary"),
            LogicalType::Json => write!(f, "json"),
            LogicalType::Date => write!(f, "date"),
            LogicalType::Time { precision } => write!(f, "time({})", precision),
            LogicalType::Timestamp { precision } => write!(f, "timestamp({})", precision),
            LogicalType::TimestampWithTimeZone { precision } => {
                write!(f, "timestamp({}) with time zone", precision)
            }
            LogicalType::TimeWithTimeZone { precision } => {
                write!(f, "time({}) with time zone", precision)
            }
            LogicalType::Uuid => write!(f, "uuid"),
        }
    }
}

impl FromStr for LogicalType {
    type Err = ConnectorError;

    /// Parse the display form (`varchar(10)`, `decimal(12,2)`, `timestamp(3) with time zone`).
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        let (head, with_time_zone) = match normalized.strip_suffix("with time zone") {
            Some(rest) => (rest.trim_end(), true),
            None => (normalized.as_str(), false),
        };

        let (base, args) = match head.find('(') {
            Some(open) => {
                let close = head.rfind(')').filter(|&c| c > open && c == head.len() - 1);
                let close = close.ok_or_else(|| unknown_type(s))?;
                let args = head[open + 1..close]
                    .split(',')
                    .map(|a| a.trim().parse::<u32>().map_err(|_| unknown_type(s)))
                    .collect::<Result<Vec<u32>>>()?;
                (head[..open].trim(), args)
            }
            None => (head, Vec::new()),
        };

        let parsed = match (base, args.as_slice(), with_time_zone) {
            ("boolean", [], false) => LogicalType::Boolean,
            ("tinyint", [], false) => LogicalType::TinyInt,
            ("smallint", [], false) => LogicalType::SmallInt,
            ("integer" | "int", [], false) => LogicalType::Integer,
            ("bigint", [], false) => LogicalType::BigInt,
            ("real", [], false) => LogicalType::Real,
            ("double", [], false) => LogicalType::Double,
            ("decimal", [], false) => LogicalType::decimal(MAX_DECIMAL_PRECISION, 0)?,
            ("decimal", [p], false) => LogicalType::decimal(*p, 0)?,
            ("decimal", [p, sc], false) => LogicalType::decimal(*p, *sc)?,
            ("char", [], false) => LogicalType::char(1)?,
            ("char", [n], false) => LogicalType::char(*n)?,
            ("varchar", [], false) => LogicalType::unbounded_varchar(),
            ("varchar", [n], false) => LogicalType::varchar(*n),
            ("varbinary", [], false) => LogicalType::Varbinary,
            ("json", [], false) => LogicalType::Json,
            ("date", [], false) => LogicalType::Date,
            ("time", [], false) => LogicalType::time(3)?,
            ("time", [p], false) => LogicalType::time(*p)?,
            ("time", [], true) => LogicalType::TimeWithTimeZone { precision: 3 },
            ("time", [p], true) => {
                check_temporal_precision("TIME WITH TIME ZONE", *p)?;
                LogicalType::TimeWithTimeZone { precision: *p }
            }
            ("timestamp", [], false) => LogicalType::timestamp(3)?,
            ("timestamp", [p], false) => LogicalType::timestamp(*p)?,
            ("timestamp", [], true) => LogicalType::timestamp_with_time_zone(3)?,
            ("timestamp", [p], true) => LogicalType::timestamp_with_time_zone(*p)?,
            ("uuid", [], false) => LogicalType::Uuid,
            _ => return Err(unknown_type(s)),
        };
        Ok(parsed)
    }
}

fn unknown_type(text: &str) -> ConnectorError {
    ConnectorError::invalid_value(format!("Unknown type: {}", text))
}
