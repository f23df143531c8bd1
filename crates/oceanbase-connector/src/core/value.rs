//! Row and parameter values on both sides of the mapping.
//!
//! [`BackendValue`] is what the driver yields for a column or accepts as a bind
//! parameter. [`LogicalValue`] is the engine representation of the same value.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Parameter type used when binding NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlNullType {
    /// Untyped NULL (`setObject(i, null)`).
    Untyped,
    Bool,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Decimal,
    Char,
    Varchar,
    Varbinary,
    Date,
    Time,
    DateTime,
    DateTimeOffset,
}

/// Value as produced or consumed by the backend driver.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendValue<'a> {
    /// NULL with the parameter type used to bind it.
    Null(SqlNullType),
    Bool(bool),
    /// Any integer column (tinyint through bigint).
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    Text(Cow<'a, str>),
    Bytes(Cow<'a, [u8]>),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
}

impl<'a> BackendValue<'a> {
    /// Convert to a fully owned value with `'static` lifetime.
    #[must_use]
    pub fn into_owned(self) -> BackendValue<'static> {
        match self {
            BackendValue::Null(t) => BackendValue::Null(t),
            BackendValue::Bool(v) => BackendValue::Bool(v),
            BackendValue::Long(v) => BackendValue::Long(v),
            BackendValue::Float(v) => BackendValue::Float(v),
            BackendValue::Double(v) => BackendValue::Double(v),
            BackendValue::Decimal(v) => BackendValue::Decimal(v),
            BackendValue::Text(v) => BackendValue::Text(Cow::Owned(v.into_owned())),
            BackendValue::Bytes(v) => BackendValue::Bytes(Cow::Owned(v.into_owned())),
            BackendValue::Date(v) => BackendValue::Date(v),
            BackendValue::Time(v) => BackendValue::Time(v),
            BackendValue::DateTime(v) => BackendValue::DateTime(v),
            BackendValue::DateTimeOffset(v) => BackendValue::DateTimeOffset(v),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, BackendValue::Null(_))
    }

    /// Short name of the value shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendValue::Null(_) => "null",
            BackendValue::Bool(_) => "bool",
            BackendValue::Long(_) => "long",
            BackendValue::Float(_) => "float",
            BackendValue::Double(_) => "double",
            BackendValue::Decimal(_) => "decimal",
            BackendValue::Text(_) => "text",
            BackendValue::Bytes(_) => "bytes",
            BackendValue::Date(_) => "date",
            BackendValue::Time(_) => "time",
            BackendValue::DateTime(_) => "datetime",
            BackendValue::DateTimeOffset(_) => "datetime with offset",
        }
    }
}

impl From<&'static str> for BackendValue<'static> {
    fn from(s: &'static str) -> Self {
        BackendValue::Text(Cow::Borrowed(s))
    }
}

impl From<String> for BackendValue<'static> {
    fn from(s: String) -> Self {
        BackendValue::Text(Cow::Owned(s))
    }
}

/// Timestamp with precision above 6: epoch microseconds plus picoseconds of the micro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LongTimestamp {
    pub epoch_micros: i64,
    pub picos_of_micro: u32,
}

/// Timestamp with time zone and precision above 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LongTimestampWithTimeZone {
    pub epoch_millis: i64,
    pub picos_of_milli: u32,
    pub time_zone_key: i16,
}

/// Engine representation of a column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LogicalValue {
    Null,
    Boolean(bool),
    /// tinyint, smallint, integer and bigint.
    Long(i64),
    Real(f32),
    Double(f64),
    Decimal(Decimal),
    /// char, varchar and json text.
    Text(String),
    Bytes(Vec<u8>),
    /// Days since 1970-01-01.
    Date(i64),
    /// Picoseconds since midnight.
    Time(i64),
    /// Microseconds since the epoch, precision 0 through 6.
    ShortTimestamp(i64),
    LongTimestamp(LongTimestamp),
    /// UTC millis shifted left 12 bits, OR-ed with the zone key.
    ShortTimestampWithTimeZone(i64),
    LongTimestampWithTimeZone(LongTimestampWithTimeZone),
}

impl LogicalValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, LogicalValue::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LogicalValue::Null => "null",
            LogicalValue::Boolean(_) => "boolean",
            LogicalValue::Long(_) => "long",
            LogicalValue::Real(_) => "real",
            LogicalValue::Double(_) => "double",
            LogicalValue::Decimal(_) => "decimal",
            LogicalValue::Text(_) => "text",
            LogicalValue::Bytes(_) => "bytes",
            LogicalValue::Date(_) => "date",
            LogicalValue::Time(_) => "time",
            LogicalValue::ShortTimestamp(_) => "short timestamp",
            LogicalValue::LongTimestamp(_) => "long timestamp",
            LogicalValue::ShortTimestampWithTimeZone(_) => "short timestamp with time zone",
            LogicalValue::LongTimestampWithTimeZone(_) => "long timestamp with time zone",
        }
    }
}

impl fmt::Display for LogicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalValue::Null => write!(f, "NULL"),
            LogicalValue::Boolean(v) => write!(f, "{}", v),
            LogicalValue::Long(v) => write!(f, "{}", v),
            LogicalValue::Real(v) => write!(f, "{}", v),
            LogicalValue::Double(v) => write!(f, "{}", v),
            LogicalValue::Decimal(v) => write!(f, "{}", v),
            LogicalValue::Text(v) => write!(f, "{}", v),
            LogicalValue::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            LogicalValue::Date(v) => write!(f, "date:{}", v),
            LogicalValue::Time(v) => write!(f, "time:{}", v),
            LogicalValue::ShortTimestamp(v) => write!(f, "timestamp:{}", v),
            LogicalValue::LongTimestamp(v) => {
                write!(f, "timestamp:{}+{}ps", v.epoch_micros, v.picos_of_micro)
            }
            LogicalValue::ShortTimestampWithTimeZone(v) => write!(f, "timestamptz:{}", v),
            LogicalValue::LongTimestampWithTimeZone(v) => write!(
                f,
                "timestamptz:{}+{}ps@{}",
                v.epoch_millis, v.picos_of_milli, v.time_zone_key
            ),
        }
    }
}
