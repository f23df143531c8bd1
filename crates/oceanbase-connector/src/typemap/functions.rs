//! Read and write strategies attached to column and write mappings.
//!
//! The set of strategies is closed, so both directions are plain enums
//! dispatched by `match`. A [`ReadFunction`] decodes a driver value into the
//! engine representation; a [`WriteFunction`] produces the bind expression,
//! the encoded parameter and the typed NULL for the backend.

use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::DecimalRoundingMode;
use crate::core::value::{BackendValue, LogicalValue, SqlNullType};
use crate::core::CompatibleMode;
use crate::error::{ConnectorError, Result};
use crate::temporal::{self, codec};

/// Largest scale `rust_decimal` can carry.
const MAX_DECIMAL_SCALE: u32 = 28;

/// Decodes one driver value into the engine representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ReadFunction {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    /// Rescales to `scale`. Without a rounding mode any rounding is an error.
    Decimal {
        precision: u32,
        scale: u32,
        rounding: Option<DecimalRoundingMode>,
    },
    /// Trailing pad spaces are dropped.
    Char,
    Varchar,
    /// Parsed and re-serialized in canonical form.
    Json,
    Varbinary,
    Date,
    /// Oracle-mode DATE read as a whole-second timestamp with the BC year fixed up.
    DateAsTimestamp,
    Time { precision: u32 },
    Timestamp { precision: u32 },
    LongTimestamp { precision: u32 },
    ShortTimestampWithTimeZone,
    LongTimestampWithTimeZone,
}

impl ReadFunction {
    pub fn name(&self) -> &'static str {
        match self {
            ReadFunction::Boolean => "boolean",
            ReadFunction::TinyInt => "tinyint",
            ReadFunction::SmallInt => "smallint",
            ReadFunction::Integer => "integer",
            ReadFunction::BigInt => "bigint",
            ReadFunction::Real => "real",
            ReadFunction::Double => "double",
            ReadFunction::Decimal { rounding: None, .. } => "decimal",
            ReadFunction::Decimal { .. } => "rounded decimal",
            ReadFunction::Char => "char",
            ReadFunction::Varchar => "varchar",
            ReadFunction::Json => "json",
            ReadFunction::Varbinary => "varbinary",
            ReadFunction::Date => "date",
            ReadFunction::DateAsTimestamp => "date as timestamp",
            ReadFunction::Time { .. } => "time",
            ReadFunction::Timestamp { .. } => "timestamp",
            ReadFunction::LongTimestamp { .. } => "long timestamp",
            ReadFunction::ShortTimestampWithTimeZone => "short timestamp with time zone",
            ReadFunction::LongTimestampWithTimeZone => "long timestamp with time zone",
        }
    }

    /// Decode a driver value. NULL decodes to NULL for every strategy.
    pub fn decode(&self, value: &BackendValue<'_>) -> Result<LogicalValue> {
        if value.is_null() {
            return Ok(LogicalValue::Null);
        }

        let decoded = match (self, value) {
            (ReadFunction::Boolean, BackendValue::Bool(v)) => LogicalValue::Boolean(*v),
            (ReadFunction::Boolean, BackendValue::Long(v)) => LogicalValue::Boolean(*v != 0),

            (ReadFunction::TinyInt, BackendValue::Long(v)) => {
                LogicalValue::Long(check_range(*v, i8::MIN.into(), i8::MAX.into(), "tinyint")?)
            }
            (ReadFunction::SmallInt, BackendValue::Long(v)) => LogicalValue::Long(check_range(
                *v,
                i16::MIN.into(),
                i16::MAX.into(),
                "smallint",
            )?),
            (ReadFunction::Integer, BackendValue::Long(v)) => LogicalValue::Long(check_range(
                *v,
                i32::MIN.into(),
                i32::MAX.into(),
                "integer",
            )?),
            (ReadFunction::BigInt, BackendValue::Long(v)) => LogicalValue::Long(*v),

            (ReadFunction::Real, BackendValue::Float(v)) => LogicalValue::Real(*v),
            (ReadFunction::Real, BackendValue::Double(v)) => LogicalValue::Real(*v as f32),
            (ReadFunction::Double, BackendValue::Double(v)) => LogicalValue::Double(*v),
            (ReadFunction::Double, BackendValue::Float(v)) => LogicalValue::Double(f64::from(*v)),

            (
                ReadFunction::Decimal {
                    precision,
                    scale,
                    rounding,
                },
                raw,
            ) => {
                let parsed = match raw {
                    BackendValue::Decimal(d) => *d,
                    BackendValue::Long(v) => Decimal::from(*v),
                    BackendValue::Text(text) => text.trim().parse::<Decimal>().map_err(|e| {
                        ConnectorError::invalid_value(format!(
                            "Cannot read '{}' as decimal: {}",
                            text, e
                        ))
                    })?,
                    other => return Err(mismatch(self.name(), other)),
                };
                LogicalValue::Decimal(rescale(parsed, *precision, *scale, *rounding)?)
            }

            (ReadFunction::Char, BackendValue::Text(v)) => {
                LogicalValue::Text(v.trim_end_matches(' ').to_string())
            }
            (ReadFunction::Varchar, BackendValue::Text(v)) => LogicalValue::Text(v.to_string()),
            (ReadFunction::Json, BackendValue::Text(v)) => {
                let parsed: serde_json::Value = serde_json::from_str(v).map_err(|e| {
                    ConnectorError::invalid_value(format!("Invalid JSON value: {}", e))
                })?;
                LogicalValue::Text(parsed.to_string())
            }
            (ReadFunction::Varbinary, BackendValue::Bytes(v)) => LogicalValue::Bytes(v.to_vec()),

            (ReadFunction::Date, BackendValue::Date(d)) => LogicalValue::Date(codec::epoch_day(*d)),
            (ReadFunction::DateAsTimestamp, BackendValue::DateTime(v)) => {
                let adjusted = codec::adjust_bc_year(*v)?;
                LogicalValue::ShortTimestamp(codec::epoch_micros(adjusted, 0)?)
            }
            (ReadFunction::DateAsTimestamp, BackendValue::Date(d)) => {
                let adjusted = codec::adjust_bc_year(d.and_time(chrono::NaiveTime::MIN))?;
                LogicalValue::ShortTimestamp(codec::epoch_micros(adjusted, 0)?)
            }
            (ReadFunction::Time { precision }, BackendValue::Time(t)) => {
                LogicalValue::Time(codec::picos_of_day(*t, *precision))
            }
            (ReadFunction::Timestamp { precision }, BackendValue::DateTime(v)) => {
                LogicalValue::ShortTimestamp(codec::epoch_micros(*v, *precision)?)
            }
            (ReadFunction::LongTimestamp { precision }, BackendValue::DateTime(v)) => {
                LogicalValue::LongTimestamp(codec::long_timestamp(*v, *precision)?)
            }
            (ReadFunction::ShortTimestampWithTimeZone, BackendValue::DateTimeOffset(v)) => {
                LogicalValue::ShortTimestampWithTimeZone(codec::short_timestamp_with_time_zone(v)?)
            }
            (ReadFunction::ShortTimestampWithTimeZone, BackendValue::DateTime(v)) => {
                let instant = v.and_utc().fixed_offset();
                LogicalValue::ShortTimestampWithTimeZone(codec::short_timestamp_with_time_zone(
                    &instant,
                )?)
            }
            (ReadFunction::LongTimestampWithTimeZone, BackendValue::DateTimeOffset(v)) => {
                LogicalValue::LongTimestampWithTimeZone(codec::long_timestamp_with_time_zone(v))
            }
            (ReadFunction::LongTimestampWithTimeZone, BackendValue::DateTime(v)) => {
                let instant = v.and_utc().fixed_offset();
                LogicalValue::LongTimestampWithTimeZone(codec::long_timestamp_with_time_zone(
                    &instant,
                ))
            }

            (_, other) => return Err(mismatch(self.name(), other)),
        };
        Ok(decoded)
    }
}

/// Encodes an engine value as a bind parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum WriteFunction {
    /// Bound as tinyint 1/0.
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Decimal { precision: u32, scale: u32 },
    Char,
    /// Also used for JSON text.
    Varchar,
    Varbinary,
    /// ISO date string through `CAST(? AS DATE)`.
    DateIso,
    /// `uuuu-MM-dd` string through `TO_DATE`.
    DateFormatted,
    /// Whole-second timestamp string through `TO_DATE`.
    TimestampToDate,
    Time { precision: u32 },
    /// Local date-time parameter.
    Timestamp { precision: u32 },
    /// Local date-time parameter rounded to `precision`.
    LongTimestamp { precision: u32 },
    /// Formatted string through `TO_TIMESTAMP`.
    FormattedTimestamp { precision: u32 },
    FormattedLongTimestamp { precision: u32 },
    ShortTimestampWithTimeZone,
    LongTimestampWithTimeZone,
}

impl WriteFunction {
    pub fn name(&self) -> &'static str {
        match self {
            WriteFunction::Boolean => "boolean",
            WriteFunction::TinyInt => "tinyint",
            WriteFunction::SmallInt => "smallint",
            WriteFunction::Integer => "integer",
            WriteFunction::BigInt => "bigint",
            WriteFunction::Real => "real",
            WriteFunction::Double => "double",
            WriteFunction::Decimal { .. } => "decimal",
            WriteFunction::Char => "char",
            WriteFunction::Varchar => "varchar",
            WriteFunction::Varbinary => "varbinary",
            WriteFunction::DateIso => "iso date",
            WriteFunction::DateFormatted => "formatted date",
            WriteFunction::TimestampToDate => "timestamp to date",
            WriteFunction::Time { .. } => "time",
            WriteFunction::Timestamp { .. } => "timestamp",
            WriteFunction::LongTimestamp { .. } => "long timestamp",
            WriteFunction::FormattedTimestamp { .. } => "formatted timestamp",
            WriteFunction::FormattedLongTimestamp { .. } => "formatted long timestamp",
            WriteFunction::ShortTimestampWithTimeZone => "short timestamp with time zone",
            WriteFunction::LongTimestampWithTimeZone => "long timestamp with time zone",
        }
    }

    /// SQL fragment that replaces the `?` placeholder for this parameter.
    pub fn bind_expression(&self) -> Cow<'static, str> {
        match self {
            WriteFunction::DateIso => Cow::Borrowed(temporal::to_date_expression(CompatibleMode::MySql)),
            WriteFunction::DateFormatted | WriteFunction::TimestampToDate => {
                Cow::Borrowed(temporal::to_date_expression(CompatibleMode::Oracle))
            }
            WriteFunction::FormattedTimestamp { precision }
            | WriteFunction::FormattedLongTimestamp { precision } => {
                Cow::Owned(temporal::to_timestamp_expression(*precision))
            }
            _ => Cow::Borrowed("?"),
        }
    }

    /// Parameter type used when the value is NULL.
    pub fn null_type(&self) -> SqlNullType {
        match self {
            WriteFunction::Boolean | WriteFunction::TinyInt => SqlNullType::TinyInt,
            WriteFunction::SmallInt => SqlNullType::SmallInt,
            WriteFunction::Integer => SqlNullType::Integer,
            WriteFunction::BigInt => SqlNullType::BigInt,
            WriteFunction::Real => SqlNullType::Real,
            WriteFunction::Double => SqlNullType::Double,
            WriteFunction::Decimal { .. } => SqlNullType::Decimal,
            WriteFunction::Char => SqlNullType::Char,
            WriteFunction::Varchar => SqlNullType::Varchar,
            WriteFunction::Varbinary => SqlNullType::Varbinary,
            WriteFunction::DateIso => SqlNullType::Untyped,
            WriteFunction::DateFormatted
            | WriteFunction::TimestampToDate
            | WriteFunction::FormattedTimestamp { .. }
            | WriteFunction::FormattedLongTimestamp { .. } => SqlNullType::Varchar,
            WriteFunction::Time { .. } => SqlNullType::Time,
            WriteFunction::Timestamp { .. } | WriteFunction::LongTimestamp { .. } => {
                SqlNullType::DateTime
            }
            WriteFunction::ShortTimestampWithTimeZone
            | WriteFunction::LongTimestampWithTimeZone => SqlNullType::DateTimeOffset,
        }
    }

    pub fn null_value(&self) -> BackendValue<'static> {
        BackendValue::Null(self.null_type())
    }

    /// Encode an engine value as the parameter bound to [`Self::bind_expression`].
    pub fn encode(&self, value: &LogicalValue) -> Result<BackendValue<'static>> {
        if value.is_null() {
            return Ok(self.null_value());
        }

        let encoded = match (self, value) {
            (WriteFunction::Boolean, LogicalValue::Boolean(v)) => {
                BackendValue::Long(if *v { 1 } else { 0 })
            }
            (WriteFunction::TinyInt, LogicalValue::Long(v)) => {
                BackendValue::Long(check_range(*v, i8::MIN.into(), i8::MAX.into(), "tinyint")?)
            }
            (WriteFunction::SmallInt, LogicalValue::Long(v)) => BackendValue::Long(check_range(
                *v,
                i16::MIN.into(),
                i16::MAX.into(),
                "smallint",
            )?),
            (WriteFunction::Integer, LogicalValue::Long(v)) => BackendValue::Long(check_range(
                *v,
                i32::MIN.into(),
                i32::MAX.into(),
                "integer",
            )?),
            (WriteFunction::BigInt, LogicalValue::Long(v)) => BackendValue::Long(*v),
            (WriteFunction::Real, LogicalValue::Real(v)) => BackendValue::Float(*v),
            (WriteFunction::Double, LogicalValue::Double(v)) => BackendValue::Double(*v),
            (WriteFunction::Decimal { precision, scale }, LogicalValue::Decimal(v)) => {
                BackendValue::Decimal(rescale(*v, *precision, *scale, None)?)
            }
            (WriteFunction::Char | WriteFunction::Varchar, LogicalValue::Text(v)) => {
                BackendValue::Text(Cow::Owned(v.clone()))
            }
            (WriteFunction::Varbinary, LogicalValue::Bytes(v)) => {
                BackendValue::Bytes(Cow::Owned(v.clone()))
            }
            (WriteFunction::DateIso | WriteFunction::DateFormatted, LogicalValue::Date(days)) => {
                let date = codec::date_from_epoch_day(*days)?;
                BackendValue::Text(Cow::Owned(codec::format_date(date)))
            }
            (WriteFunction::TimestampToDate, LogicalValue::ShortTimestamp(micros)) => {
                let value = codec::whole_second_datetime(*micros)?;
                BackendValue::Text(Cow::Owned(codec::format_timestamp_seconds(value)))
            }
            (WriteFunction::Time { precision }, LogicalValue::Time(picos)) => {
                BackendValue::Time(codec::time_from_picos(*picos, *precision)?)
            }
            (WriteFunction::Timestamp { .. }, LogicalValue::ShortTimestamp(micros)) => {
                BackendValue::DateTime(codec::datetime_from_epoch_micros(*micros)?)
            }
            (WriteFunction::LongTimestamp { precision }, LogicalValue::LongTimestamp(v)) => {
                BackendValue::DateTime(codec::datetime_from_long_timestamp(v, *precision)?)
            }
            (WriteFunction::FormattedTimestamp { .. }, LogicalValue::ShortTimestamp(micros)) => {
                let value = codec::datetime_from_epoch_micros(*micros)?;
                BackendValue::Text(Cow::Owned(codec::format_timestamp_nano_optional(value)))
            }
            (WriteFunction::FormattedLongTimestamp { precision }, LogicalValue::LongTimestamp(v)) => {
                let value = codec::datetime_from_long_timestamp(v, *precision)?;
                BackendValue::Text(Cow::Owned(codec::format_timestamp_nano_optional(value)))
            }
            (WriteFunction::ShortTimestampWithTimeZone, LogicalValue::ShortTimestampWithTimeZone(packed)) => {
                BackendValue::DateTimeOffset(codec::instant_from_millis(codec::unpack_millis_utc(
                    *packed,
                ))?)
            }
            (WriteFunction::LongTimestampWithTimeZone, LogicalValue::LongTimestampWithTimeZone(v)) => {
                BackendValue::DateTimeOffset(codec::instant_from_long(v)?)
            }
            (_, other) => {
                return Err(ConnectorError::invalid_value(format!(
                    "{} write cannot encode a {} value",
                    self.name(),
                    other.kind()
                )))
            }
        };
        Ok(encoded)
    }
}

fn mismatch(strategy: &str, value: &BackendValue<'_>) -> ConnectorError {
    ConnectorError::invalid_value(format!(
        "{} read cannot decode a {} value",
        strategy,
        value.kind()
    ))
}

fn check_range(value: i64, min: i64, max: i64, type_name: &str) -> Result<i64> {
    if value < min || value > max {
        return Err(ConnectorError::invalid_value(format!(
            "Value out of range for {}: {}",
            type_name, value
        )));
    }
    Ok(value)
}

/// Bring `value` to exactly `scale` fractional digits and check it fits `precision`.
pub(crate) fn rescale(
    value: Decimal,
    precision: u32,
    scale: u32,
    rounding: Option<DecimalRoundingMode>,
) -> Result<Decimal> {
    let mut result = value;
    if result.scale() > scale {
        let strategy = rounding.and_then(DecimalRoundingMode::strategy).ok_or_else(|| {
            ConnectorError::invalid_value(format!(
                "Rounding necessary to store {} at scale {}",
                value, scale
            ))
        })?;
        result = result.round_dp_with_strategy(scale, strategy);
    } else {
        result.rescale(scale);
    }
    // rescale stops short when the 96-bit mantissa cannot hold the digits
    if result.scale() != scale {
        return Err(ConnectorError::invalid_value(format!(
            "{} cannot be represented at scale {} (at most {} significant digits)",
            value, scale, MAX_DECIMAL_SCALE
        )));
    }

    let integer_digits = precision.saturating_sub(scale);
    if integer_digits < MAX_DECIMAL_SCALE {
        let limit = Decimal::from_i128_with_scale(10i128.pow(integer_digits), 0);
        if result.trunc().abs() >= limit {
            return Err(ConnectorError::invalid_value(format!(
                "Decimal overflow: {} does not fit decimal({},{})",
                value, precision, scale
            )));
        }
    }
    Ok(result)
}
