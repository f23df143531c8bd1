//! Read path: backend column metadata to engine logical type.
//!
//! Resolution order, first match wins:
//!
//! 1. forced-varchar override by driver type code
//! 2. backend type name aliases (`int unsigned`, `datetime`, `json`, ...)
//! 3. generic driver type code
//!
//! Anything left over is unsupported and resolves to `None`; the caller decides
//! whether to hide the column or fail the query.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::{ColumnMapping, ReadFunction, WriteFunction};
use crate::config::SessionSettings;
use crate::core::types::{
    BackendTypeDescriptor, JdbcType, LogicalType, MAX_CHAR_LENGTH, MAX_DECIMAL_PRECISION,
    MAX_VARCHAR_LENGTH,
};
use crate::core::CompatibleMode;
use crate::error::{ConnectorError, Result};
use crate::temporal::{self, MAX_SHORT_TIMESTAMP_PRECISION, MAX_SHORT_TIMESTAMP_TZ_PRECISION};

/// Bound for `enum`/`set` columns whose size the driver does not report.
const DEFAULT_ENUM_LENGTH: i32 = 256;

/// Precision of `bigint unsigned`: 18446744073709551615 has 20 digits.
const UNSIGNED_BIGINT_PRECISION: u32 = 20;

/// Resolve the column mapping for one backend column.
///
/// Fails with [`crate::ConnectorError::MetadataContract`] when the descriptor
/// lacks a field the matched rule needs or carries a temporal precision the
/// mode cannot produce.
pub fn to_column_mapping(
    mode: CompatibleMode,
    session: &SessionSettings,
    forced_varchar: &HashSet<i32>,
    descriptor: &BackendTypeDescriptor,
) -> Result<Option<ColumnMapping>> {
    let type_name = descriptor.required_type_name()?;

    let mapping = if forced_varchar.contains(&descriptor.jdbc_type) {
        Some(forced_varchar_mapping())
    } else {
        match type_name.to_lowercase().as_str() {
            "tinyint unsigned" => Some(integer_mapping(LogicalType::SmallInt)),
            "smallint unsigned" | "year" => Some(integer_mapping(LogicalType::Integer)),
            "int unsigned" => Some(integer_mapping(LogicalType::BigInt)),
            "bigint unsigned" => Some(decimal_mapping(UNSIGNED_BIGINT_PRECISION, 0, None)),
            "date" => Some(date_mapping(mode)),
            "json" => Some(ColumnMapping::disabled(
                LogicalType::Json,
                ReadFunction::Json,
                WriteFunction::Varchar,
            )),
            "enum" | "set" => Some(varchar_mapping(
                descriptor.column_size.unwrap_or(DEFAULT_ENUM_LENGTH),
            )),
            "datetime" => Some(timestamp_mapping(
                mode,
                descriptor.required_column_size()?,
                descriptor.decimal_digits.unwrap_or(0),
            )?),
            _ => map_by_type_code(mode, session, descriptor)?,
        }
    };

    match &mapping {
        Some(m) => debug!(
            "Mapped {} to {} (read: {}, write: {}, pushdown: {})",
            descriptor,
            m.logical_type,
            m.read.name(),
            m.write.name(),
            m.pushdown.as_str()
        ),
        None => warn!("Unsupported column type: {}", descriptor),
    }
    Ok(mapping)
}

fn map_by_type_code(
    mode: CompatibleMode,
    session: &SessionSettings,
    descriptor: &BackendTypeDescriptor,
) -> Result<Option<ColumnMapping>> {
    let mapping = match descriptor.jdbc_type() {
        JdbcType::Bit => ColumnMapping::full(
            LogicalType::Boolean,
            ReadFunction::Boolean,
            WriteFunction::Boolean,
        ),
        JdbcType::TinyInt => integer_mapping(LogicalType::TinyInt),
        JdbcType::SmallInt => integer_mapping(LogicalType::SmallInt),
        JdbcType::Integer => integer_mapping(LogicalType::Integer),
        JdbcType::BigInt => integer_mapping(LogicalType::BigInt),
        JdbcType::Real | JdbcType::BinaryFloat => {
            ColumnMapping::disabled(LogicalType::Real, ReadFunction::Real, WriteFunction::Real)
        }
        JdbcType::Double | JdbcType::BinaryDouble => {
            ColumnMapping::full(LogicalType::Double, ReadFunction::Double, WriteFunction::Double)
        }
        JdbcType::Numeric | JdbcType::Decimal => return numeric_mapping(session, descriptor),
        JdbcType::Char | JdbcType::NChar => char_mapping(descriptor.required_column_size()?),
        JdbcType::Varchar | JdbcType::NVarchar | JdbcType::LongVarchar => {
            varchar_mapping(descriptor.required_column_size()?)
        }
        JdbcType::Clob => ColumnMapping::disabled(
            LogicalType::unbounded_varchar(),
            ReadFunction::Varchar,
            WriteFunction::Varchar,
        ),
        JdbcType::Binary | JdbcType::VarBinary | JdbcType::LongVarBinary | JdbcType::Blob => {
            ColumnMapping::disabled(
                LogicalType::Varbinary,
                ReadFunction::Varbinary,
                WriteFunction::Varbinary,
            )
        }
        JdbcType::Time => time_mapping(mode, descriptor.required_column_size()?)?,
        JdbcType::Timestamp => {
            let size = descriptor.required_column_size()?;
            let scale = descriptor.decimal_digits.unwrap_or(0);
            if mode.is_mysql_compatible() {
                timestamp_with_time_zone_mapping(mode, size, scale)?
            } else {
                timestamp_mapping(mode, size, scale)?
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(mapping))
}

fn forced_varchar_mapping() -> ColumnMapping {
    ColumnMapping::disabled(
        LogicalType::unbounded_varchar(),
        ReadFunction::Varchar,
        WriteFunction::Varchar,
    )
}

fn integer_mapping(logical_type: LogicalType) -> ColumnMapping {
    let (read, write) = match logical_type {
        LogicalType::TinyInt => (ReadFunction::TinyInt, WriteFunction::TinyInt),
        LogicalType::SmallInt => (ReadFunction::SmallInt, WriteFunction::SmallInt),
        LogicalType::Integer => (ReadFunction::Integer, WriteFunction::Integer),
        _ => (ReadFunction::BigInt, WriteFunction::BigInt),
    };
    ColumnMapping::full(logical_type, read, write)
}

fn decimal_mapping(
    precision: u32,
    scale: u32,
    rounding: Option<crate::config::DecimalRoundingMode>,
) -> ColumnMapping {
    ColumnMapping::full(
        LogicalType::Decimal { precision, scale },
        ReadFunction::Decimal {
            precision,
            scale,
            rounding,
        },
        WriteFunction::Decimal { precision, scale },
    )
}

/// NUMERIC/DECIMAL resolution.
///
/// Precision 0 is an unconstrained number: mapped at maximum precision with the
/// session default scale when overflow is allowed, unsupported otherwise. A
/// negative scale widens the integer part. A scale the resolved width cannot
/// hold is a metadata contract violation.
fn numeric_mapping(
    session: &SessionSettings,
    descriptor: &BackendTypeDescriptor,
) -> Result<Option<ColumnMapping>> {
    let precision = descriptor.required_column_size()?;
    if precision == 0 {
        if session.allow_overflow() {
            return Ok(Some(decimal_mapping(
                MAX_DECIMAL_PRECISION,
                session.decimal_default_scale,
                Some(session.decimal_rounding_mode),
            )));
        }
        return Ok(None);
    }

    let digits = descriptor.required_decimal_digits()?;
    let width = i64::from(precision) + i64::from((-digits).max(0));
    let scale = digits.max(0) as u32;

    if width <= i64::from(MAX_DECIMAL_PRECISION) {
        if width <= 0 || i64::from(scale) > width {
            return Err(invalid_decimal(descriptor, width, scale));
        }
        return Ok(Some(decimal_mapping(width as u32, scale, None)));
    }
    if session.allow_overflow() {
        if scale > MAX_DECIMAL_PRECISION {
            return Err(invalid_decimal(descriptor, i64::from(MAX_DECIMAL_PRECISION), scale));
        }
        warn!(
            "Decimal {} exceeds precision {}, mapping as decimal({},{}) with rounding",
            descriptor, MAX_DECIMAL_PRECISION, MAX_DECIMAL_PRECISION, scale
        );
        return Ok(Some(decimal_mapping(
            MAX_DECIMAL_PRECISION,
            scale,
            Some(session.decimal_rounding_mode),
        )));
    }
    Ok(None)
}

fn invalid_decimal(descriptor: &BackendTypeDescriptor, width: i64, scale: u32) -> ConnectorError {
    ConnectorError::metadata(format!(
        "Invalid decimal({},{}) for column type {}",
        width, scale, descriptor
    ))
}

fn char_mapping(column_size: i32) -> ColumnMapping {
    match u32::try_from(column_size) {
        Ok(length) if length <= MAX_CHAR_LENGTH => ColumnMapping::case_insensitive(
            LogicalType::Char { length },
            ReadFunction::Char,
            WriteFunction::Char,
        ),
        _ => varchar_mapping(column_size),
    }
}

fn varchar_mapping(column_size: i32) -> ColumnMapping {
    let logical_type = match u32::try_from(column_size) {
        Ok(length) if length <= MAX_VARCHAR_LENGTH => LogicalType::varchar(length),
        _ => LogicalType::unbounded_varchar(),
    };
    ColumnMapping::case_insensitive(logical_type, ReadFunction::Varchar, WriteFunction::Varchar)
}

fn date_mapping(mode: CompatibleMode) -> ColumnMapping {
    match mode {
        CompatibleMode::MySql => {
            ColumnMapping::full(LogicalType::Date, ReadFunction::Date, WriteFunction::DateIso)
        }
        // Oracle DATE carries a time of day, so it surfaces as a whole-second timestamp.
        CompatibleMode::Oracle => ColumnMapping::full(
            LogicalType::Timestamp { precision: 0 },
            ReadFunction::DateAsTimestamp,
            WriteFunction::TimestampToDate,
        ),
    }
}

fn time_mapping(mode: CompatibleMode, column_size: i32) -> Result<ColumnMapping> {
    let precision = temporal::time_precision(mode, column_size)?;
    Ok(ColumnMapping::full(
        LogicalType::time(precision)?,
        ReadFunction::Time { precision },
        WriteFunction::Time { precision },
    ))
}

fn timestamp_mapping(mode: CompatibleMode, column_size: i32, scale: i32) -> Result<ColumnMapping> {
    let precision = temporal::timestamp_precision(mode, column_size, scale)?;
    let logical_type = LogicalType::timestamp(precision)?;

    let mapping = if precision <= MAX_SHORT_TIMESTAMP_PRECISION {
        let write = match mode {
            CompatibleMode::MySql => WriteFunction::Timestamp { precision },
            CompatibleMode::Oracle => WriteFunction::FormattedTimestamp { precision },
        };
        ColumnMapping::full(logical_type, ReadFunction::Timestamp { precision }, write)
    } else {
        let write = match mode {
            CompatibleMode::MySql => WriteFunction::LongTimestamp {
                precision: CompatibleMode::MySql.max_timestamp_precision(),
            },
            CompatibleMode::Oracle => WriteFunction::FormattedLongTimestamp { precision },
        };
        ColumnMapping::full(logical_type, ReadFunction::LongTimestamp { precision }, write)
    };
    Ok(mapping)
}

fn timestamp_with_time_zone_mapping(
    mode: CompatibleMode,
    column_size: i32,
    scale: i32,
) -> Result<ColumnMapping> {
    let precision = temporal::timestamp_precision(mode, column_size, scale)?;
    let logical_type = LogicalType::timestamp_with_time_zone(precision)?;

    if precision <= MAX_SHORT_TIMESTAMP_TZ_PRECISION {
        Ok(ColumnMapping::full(
            logical_type,
            ReadFunction::ShortTimestampWithTimeZone,
            WriteFunction::ShortTimestampWithTimeZone,
        ))
    } else {
        Ok(ColumnMapping::full(
            logical_type,
            ReadFunction::LongTimestampWithTimeZone,
            WriteFunction::LongTimestampWithTimeZone,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DecimalMapping, DecimalRoundingMode};
    use crate::error::ConnectorError;
    use crate::typemap::PushdownPolicy;

    const MYSQL: CompatibleMode = CompatibleMode::MySql;
    const ORACLE: CompatibleMode = CompatibleMode::Oracle;

    fn resolve(mode: CompatibleMode, descriptor: BackendTypeDescriptor) -> Option<ColumnMapping> {
        to_column_mapping(mode, &SessionSettings::default(), &HashSet::new(), &descriptor).unwrap()
    }

    fn logical(mode: CompatibleMode, descriptor: BackendTypeDescriptor) -> Option<LogicalType> {
        resolve(mode, descriptor).map(|m| m.logical_type)
    }

    fn overflow_session() -> SessionSettings {
        SessionSettings {
            decimal_mapping: DecimalMapping::AllowOverflow,
            decimal_default_scale: 4,
            decimal_rounding_mode: DecimalRoundingMode::HalfEven,
        }
    }

    // =========================================================================
    // Type name aliases
    // =========================================================================

    #[test]
    fn test_unsigned_integers_widen() {
        let cases = [
            ("tinyint unsigned", LogicalType::SmallInt),
            ("SMALLINT UNSIGNED", LogicalType::Integer),
            ("year", LogicalType::Integer),
            ("int unsigned", LogicalType::BigInt),
            (
                "bigint unsigned",
                LogicalType::Decimal {
                    precision: 20,
                    scale: 0,
                },
            ),
        ];
        for (name, expected) in cases {
            let d = BackendTypeDescriptor::new(JdbcType::Integer, name);
            assert_eq!(logical(MYSQL, d), Some(expected), "{}", name);
        }
    }

    #[test]
    fn test_missing_type_name_is_contract_violation() {
        let mut d = BackendTypeDescriptor::new(JdbcType::Integer, "int");
        d.type_name = None;
        let err =
            to_column_mapping(MYSQL, &SessionSettings::default(), &HashSet::new(), &d).unwrap_err();
        assert!(matches!(err, ConnectorError::MetadataContract(_)));
        assert!(err.to_string().contains("Type name is missing"));
    }

    #[test]
    fn test_date_per_mode() {
        let d = BackendTypeDescriptor::new(JdbcType::Date, "DATE");
        let mysql = resolve(MYSQL, d.clone()).unwrap();
        assert_eq!(mysql.logical_type, LogicalType::Date);
        assert_eq!(mysql.write, WriteFunction::DateIso);

        let oracle = resolve(ORACLE, d).unwrap();
        assert_eq!(oracle.logical_type, LogicalType::Timestamp { precision: 0 });
        assert_eq!(oracle.read, ReadFunction::DateAsTimestamp);
        assert_eq!(oracle.write, WriteFunction::TimestampToDate);
    }

    #[test]
    fn test_json_and_enum() {
        let json = resolve(MYSQL, BackendTypeDescriptor::new(JdbcType::LongVarchar, "json")).unwrap();
        assert_eq!(json.logical_type, LogicalType::Json);
        assert_eq!(json.pushdown, PushdownPolicy::Disabled);

        let sized = BackendTypeDescriptor::new(JdbcType::Char, "enum").with_column_size(7);
        assert_eq!(logical(MYSQL, sized), Some(LogicalType::varchar(7)));
        let unsized_enum = BackendTypeDescriptor::new(JdbcType::Char, "set");
        assert_eq!(logical(MYSQL, unsized_enum), Some(LogicalType::varchar(256)));
    }

    #[test]
    fn test_datetime_uses_declared_size() {
        let d = BackendTypeDescriptor::new(JdbcType::Timestamp, "DATETIME").with_column_size(23);
        let mapping = resolve(MYSQL, d).unwrap();
        assert_eq!(mapping.logical_type, LogicalType::Timestamp { precision: 3 });
        assert_eq!(mapping.write, WriteFunction::Timestamp { precision: 3 });

        let missing = BackendTypeDescriptor::new(JdbcType::Timestamp, "datetime");
        assert!(to_column_mapping(MYSQL, &SessionSettings::default(), &HashSet::new(), &missing)
            .is_err());
    }

    // =========================================================================
    // Type codes
    // =========================================================================

    #[test]
    fn test_fixed_width_codes() {
        let cases = [
            (JdbcType::Bit, "bit", LogicalType::Boolean),
            (JdbcType::TinyInt, "tinyint", LogicalType::TinyInt),
            (JdbcType::SmallInt, "smallint", LogicalType::SmallInt),
            (JdbcType::Integer, "int", LogicalType::Integer),
            (JdbcType::BigInt, "bigint", LogicalType::BigInt),
            (JdbcType::Double, "double", LogicalType::Double),
            (JdbcType::BinaryDouble, "BINARY_DOUBLE", LogicalType::Double),
            (JdbcType::Blob, "blob", LogicalType::Varbinary),
        ];
        for (code, name, expected) in cases {
            assert_eq!(
                logical(ORACLE, BackendTypeDescriptor::new(code, name)),
                Some(expected),
                "{}",
                name
            );
        }
    }

    #[test]
    fn test_real_disables_pushdown() {
        for code in [JdbcType::Real, JdbcType::BinaryFloat] {
            let m = resolve(ORACLE, BackendTypeDescriptor::new(code, "float")).unwrap();
            assert_eq!(m.logical_type, LogicalType::Real);
            assert_eq!(m.pushdown, PushdownPolicy::Disabled);
        }
    }

    #[test]
    fn test_char_and_varchar() {
        let c = resolve(MYSQL, BackendTypeDescriptor::new(JdbcType::Char, "char").with_column_size(10))
            .unwrap();
        assert_eq!(c.logical_type, LogicalType::Char { length: 10 });
        assert_eq!(c.pushdown, PushdownPolicy::CaseInsensitive);

        let wide = BackendTypeDescriptor::new(JdbcType::NChar, "nchar").with_column_size(70_000);
        assert_eq!(logical(MYSQL, wide), Some(LogicalType::varchar(70_000)));

        let v = BackendTypeDescriptor::new(JdbcType::Varchar, "varchar2").with_column_size(100);
        assert_eq!(logical(ORACLE, v), Some(LogicalType::varchar(100)));

        let huge = BackendTypeDescriptor::new(JdbcType::LongVarchar, "longtext")
            .with_column_size(i32::MAX);
        assert_eq!(logical(MYSQL, huge), Some(LogicalType::unbounded_varchar()));

        let clob = resolve(ORACLE, BackendTypeDescriptor::new(JdbcType::Clob, "CLOB")).unwrap();
        assert_eq!(clob.logical_type, LogicalType::unbounded_varchar());
        assert_eq!(clob.pushdown, PushdownPolicy::Disabled);
    }

    #[test]
    fn test_timestamp_code_per_mode() {
        let d = BackendTypeDescriptor::new(JdbcType::Timestamp, "timestamp").with_column_size(26);
        let mysql = resolve(MYSQL, d.clone()).unwrap();
        assert_eq!(
            mysql.logical_type,
            LogicalType::TimestampWithTimeZone { precision: 6 }
        );
        assert_eq!(mysql.read, ReadFunction::LongTimestampWithTimeZone);

        let oracle = resolve(ORACLE, d).unwrap();
        assert_eq!(oracle.logical_type, LogicalType::Timestamp { precision: 6 });
        assert_eq!(oracle.write, WriteFunction::FormattedTimestamp { precision: 6 });

        let nanos = BackendTypeDescriptor::new(JdbcType::Timestamp, "TIMESTAMP").with_column_size(29);
        let oracle_long = resolve(ORACLE, nanos).unwrap();
        assert_eq!(oracle_long.read, ReadFunction::LongTimestamp { precision: 9 });
        assert_eq!(
            oracle_long.write,
            WriteFunction::FormattedLongTimestamp { precision: 9 }
        );

        let short_tz = BackendTypeDescriptor::new(JdbcType::Timestamp, "timestamp").with_column_size(19);
        assert_eq!(
            resolve(MYSQL, short_tz).unwrap().read,
            ReadFunction::ShortTimestampWithTimeZone
        );
    }

    #[test]
    fn test_timestamp_precision_out_of_bounds_fails() {
        let d = BackendTypeDescriptor::new(JdbcType::Timestamp, "timestamp").with_column_size(29);
        let err =
            to_column_mapping(MYSQL, &SessionSettings::default(), &HashSet::new(), &d).unwrap_err();
        assert!(matches!(err, ConnectorError::MetadataContract(_)));
    }

    #[test]
    fn test_time_code() {
        let d = BackendTypeDescriptor::new(JdbcType::Time, "time").with_column_size(10);
        assert_eq!(logical(MYSQL, d), Some(LogicalType::Time { precision: 0 }));
        let d = BackendTypeDescriptor::new(JdbcType::Time, "time").with_column_size(14);
        assert_eq!(logical(MYSQL, d), Some(LogicalType::Time { precision: 3 }));
    }

    #[test]
    fn test_unknown_code_is_unsupported() {
        let d = BackendTypeDescriptor::new(JdbcType::Other, "geometry");
        assert_eq!(resolve(MYSQL, d), None);
        let d = BackendTypeDescriptor::new(JdbcType::Unknown(-101), "TIMESTAMP WITH TIME ZONE");
        assert_eq!(resolve(ORACLE, d), None);
    }

    #[test]
    fn test_forced_varchar_wins() {
        let forced: HashSet<i32> = [JdbcType::Other.code(), JdbcType::Integer.code()].into();
        let d = BackendTypeDescriptor::new(JdbcType::Integer, "int unsigned");
        let m = to_column_mapping(MYSQL, &SessionSettings::default(), &forced, &d)
            .unwrap()
            .unwrap();
        assert_eq!(m.logical_type, LogicalType::unbounded_varchar());
        assert_eq!(m.pushdown, PushdownPolicy::Disabled);
    }

    // =========================================================================
    // Decimal resolution
    // =========================================================================

    fn numeric(size: i32, digits: i32) -> BackendTypeDescriptor {
        BackendTypeDescriptor::new(JdbcType::Decimal, "decimal")
            .with_column_size(size)
            .with_decimal_digits(digits)
    }

    #[test]
    fn test_decimal_direct() {
        assert_eq!(
            logical(MYSQL, numeric(12, 2)),
            Some(LogicalType::Decimal {
                precision: 12,
                scale: 2
            })
        );
    }

    #[test]
    fn test_decimal_negative_scale_widens() {
        assert_eq!(
            logical(ORACLE, numeric(10, -3)),
            Some(LogicalType::Decimal {
                precision: 13,
                scale: 0
            })
        );
    }

    #[test]
    fn test_decimal_zero_precision() {
        assert_eq!(resolve(ORACLE, numeric(0, -127)), None);

        let m = to_column_mapping(ORACLE, &overflow_session(), &HashSet::new(), &numeric(0, -127))
            .unwrap()
            .unwrap();
        assert_eq!(
            m.logical_type,
            LogicalType::Decimal {
                precision: 38,
                scale: 4
            }
        );
        assert_eq!(
            m.read,
            ReadFunction::Decimal {
                precision: 38,
                scale: 4,
                rounding: Some(DecimalRoundingMode::HalfEven)
            }
        );
    }

    #[test]
    fn test_decimal_overflow_policy() {
        assert_eq!(resolve(MYSQL, numeric(40, 5)), None);

        let m = to_column_mapping(MYSQL, &overflow_session(), &HashSet::new(), &numeric(40, 5))
            .unwrap()
            .unwrap();
        assert_eq!(
            m.logical_type,
            LogicalType::Decimal {
                precision: 38,
                scale: 5
            }
        );
    }

    #[test]
    fn test_decimal_scale_beyond_width_fails() {
        for session in [SessionSettings::default(), overflow_session()] {
            let err = to_column_mapping(ORACLE, &session, &HashSet::new(), &numeric(5, 10))
                .unwrap_err();
            assert!(matches!(err, ConnectorError::MetadataContract(_)));
            assert!(err.to_string().contains("decimal(5,10)"));
        }

        // Past the maximum width the scale only matters once overflow is allowed
        assert_eq!(resolve(MYSQL, numeric(40, 45)), None);
        let err = to_column_mapping(MYSQL, &overflow_session(), &HashSet::new(), &numeric(40, 45))
            .unwrap_err();
        assert!(matches!(err, ConnectorError::MetadataContract(_)));
    }

    #[test]
    fn test_decimal_requires_digits() {
        let d = BackendTypeDescriptor::new(JdbcType::Numeric, "number").with_column_size(10);
        let err =
            to_column_mapping(ORACLE, &SessionSettings::default(), &HashSet::new(), &d).unwrap_err();
        assert!(err.to_string().contains("Decimal digits not present"));
    }
}
