//! Write path: engine logical type to backend DDL type and bind strategy.

use tracing::debug;

use super::{WriteFunction, WriteMapping};
use crate::core::types::LogicalType;
use crate::core::CompatibleMode;
use crate::error::{ConnectorError, Result};
use crate::temporal::{MAX_SHORT_TIMESTAMP_PRECISION, MAX_SHORT_TIMESTAMP_TZ_PRECISION};

/// Worst-case character set expansion.
const BYTES_PER_CHAR: u32 = 4;

const MYSQL_CHAR_MAX_LENGTH: u32 = 256;
const ORACLE_CHAR_MAX_BYTES: u32 = 2_000;
const ORACLE_CHAR_MAX_LENGTH: u32 = ORACLE_CHAR_MAX_BYTES / BYTES_PER_CHAR;
const VARCHAR2_MAX_BYTES: u32 = 32_767;
const VARCHAR2_MAX_LENGTH: u32 = VARCHAR2_MAX_BYTES / BYTES_PER_CHAR;
const TINYTEXT_MAX_BYTES: u32 = 255;
const TEXT_MAX_BYTES: u32 = 65_535;
const MEDIUMTEXT_MAX_BYTES: u32 = 16_777_215;

/// Map a logical type to the DDL type and write strategy used for new columns.
///
/// `TimeWithTimeZone` and `Uuid` have no backend rule and fail with
/// [`ConnectorError::NotSupported`].
pub fn to_write_mapping(mode: CompatibleMode, logical_type: &LogicalType) -> Result<WriteMapping> {
    let mysql = mode.is_mysql_compatible();
    let max_precision = CompatibleMode::MySql.max_timestamp_precision();

    let mapping = match *logical_type {
        LogicalType::Boolean => {
            WriteMapping::new(if mysql { "boolean" } else { "number(1)" }, WriteFunction::Boolean)
        }
        LogicalType::TinyInt => {
            WriteMapping::new(if mysql { "tinyint" } else { "number(3)" }, WriteFunction::TinyInt)
        }
        LogicalType::SmallInt => WriteMapping::new(
            if mysql { "smallint" } else { "number(5)" },
            WriteFunction::SmallInt,
        ),
        LogicalType::Integer => WriteMapping::new(
            if mysql { "integer" } else { "number(10)" },
            WriteFunction::Integer,
        ),
        LogicalType::BigInt => {
            WriteMapping::new(if mysql { "bigint" } else { "number(19)" }, WriteFunction::BigInt)
        }
        LogicalType::Real => {
            WriteMapping::new(if mysql { "float" } else { "binary_float" }, WriteFunction::Real)
        }
        LogicalType::Double => WriteMapping::new(
            if mysql { "double precision" } else { "binary_double" },
            WriteFunction::Double,
        ),
        LogicalType::Decimal { precision, scale } => {
            let keyword = if mysql { "decimal" } else { "number" };
            WriteMapping::new(
                format!("{}({}, {})", keyword, precision, scale),
                WriteFunction::Decimal { precision, scale },
            )
        }
        LogicalType::Char { length } => {
            let data_type = match mode {
                CompatibleMode::MySql if length < MYSQL_CHAR_MAX_LENGTH => {
                    format!("char({})", length)
                }
                CompatibleMode::Oracle if length < ORACLE_CHAR_MAX_LENGTH => {
                    format!("char({} CHAR)", length)
                }
                _ => "clob".to_string(),
            };
            WriteMapping::new(data_type, WriteFunction::Char)
        }
        LogicalType::Varchar { length } => {
            WriteMapping::new(varchar_data_type(mode, length), WriteFunction::Varchar)
        }
        LogicalType::Json => WriteMapping::new("json", WriteFunction::Varchar),
        LogicalType::Varbinary => WriteMapping::new("blob", WriteFunction::Varbinary),
        LogicalType::Date => WriteMapping::new(
            "date",
            if mysql {
                WriteFunction::DateIso
            } else {
                WriteFunction::DateFormatted
            },
        ),
        LogicalType::Time { precision } => {
            let precision = precision.min(max_precision);
            WriteMapping::new(
                format!("time({})", precision),
                WriteFunction::Time { precision },
            )
        }
        LogicalType::Timestamp { precision } => timestamp_write_mapping(mode, precision),
        LogicalType::TimestampWithTimeZone { precision } => {
            if precision <= max_precision {
                let write = if precision <= MAX_SHORT_TIMESTAMP_TZ_PRECISION {
                    WriteFunction::ShortTimestampWithTimeZone
                } else {
                    WriteFunction::LongTimestampWithTimeZone
                };
                WriteMapping::new(format!("timestamp({})", precision), write)
            } else {
                WriteMapping::new(
                    format!("timestamp({})", max_precision),
                    WriteFunction::LongTimestampWithTimeZone,
                )
            }
        }
        LogicalType::TimeWithTimeZone { .. } | LogicalType::Uuid => {
            return Err(ConnectorError::not_supported(format!(
                "Unsupported column type: {}",
                logical_type
            )))
        }
    };

    debug!(
        "Write mapping for {} in {} mode: {} ({})",
        logical_type,
        mode,
        mapping.data_type,
        mapping.write.name()
    );
    Ok(mapping)
}

fn timestamp_write_mapping(mode: CompatibleMode, precision: u32) -> WriteMapping {
    match mode {
        CompatibleMode::MySql => {
            let max = mode.max_timestamp_precision();
            if precision <= max {
                WriteMapping::new(
                    format!("datetime({})", precision),
                    WriteFunction::Timestamp { precision },
                )
            } else {
                WriteMapping::new(
                    format!("datetime({})", max),
                    WriteFunction::LongTimestamp { precision: max },
                )
            }
        }
        CompatibleMode::Oracle => {
            if precision == 0 {
                return WriteMapping::new("date", WriteFunction::TimestampToDate);
            }
            let clamped = precision.min(mode.max_timestamp_precision());
            let write = if precision <= MAX_SHORT_TIMESTAMP_PRECISION {
                WriteFunction::FormattedTimestamp { precision }
            } else {
                WriteFunction::FormattedLongTimestamp { precision: clamped }
            };
            WriteMapping::new(format!("timestamp({})", clamped), write)
        }
    }
}

fn varchar_data_type(mode: CompatibleMode, length: Option<u32>) -> String {
    match mode {
        CompatibleMode::MySql => match length {
            None => "longtext".to_string(),
            Some(n) if n > MEDIUMTEXT_MAX_BYTES => "longtext".to_string(),
            Some(n) if n <= TINYTEXT_MAX_BYTES => "tinytext".to_string(),
            Some(n) if n <= TEXT_MAX_BYTES => "text".to_string(),
            Some(_) => "mediumtext".to_string(),
        },
        CompatibleMode::Oracle => match length {
            Some(n) if n <= VARCHAR2_MAX_LENGTH => format!("varchar2({} CHAR)", n),
            _ => "clob".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MYSQL: CompatibleMode = CompatibleMode::MySql;
    const ORACLE: CompatibleMode = CompatibleMode::Oracle;

    fn ddl(mode: CompatibleMode, t: LogicalType) -> String {
        to_write_mapping(mode, &t).unwrap().data_type
    }

    #[test]
    fn test_numeric_ddl_per_mode() {
        let cases = [
            (LogicalType::Boolean, "boolean", "number(1)"),
            (LogicalType::TinyInt, "tinyint", "number(3)"),
            (LogicalType::SmallInt, "smallint", "number(5)"),
            (LogicalType::Integer, "integer", "number(10)"),
            (LogicalType::BigInt, "bigint", "number(19)"),
            (LogicalType::Real, "float", "binary_float"),
            (LogicalType::Double, "double precision", "binary_double"),
            (
                LogicalType::Decimal {
                    precision: 12,
                    scale: 2,
                },
                "decimal(12, 2)",
                "number(12, 2)",
            ),
        ];
        for (t, mysql, oracle) in cases {
            assert_eq!(ddl(MYSQL, t), mysql);
            assert_eq!(ddl(ORACLE, t), oracle);
        }
    }

    #[test]
    fn test_char_thresholds() {
        assert_eq!(ddl(MYSQL, LogicalType::Char { length: 255 }), "char(255)");
        assert_eq!(ddl(MYSQL, LogicalType::Char { length: 256 }), "clob");
        assert_eq!(ddl(ORACLE, LogicalType::Char { length: 499 }), "char(499 CHAR)");
        assert_eq!(ddl(ORACLE, LogicalType::Char { length: 500 }), "clob");
    }

    #[test]
    fn test_mysql_varchar_bands() {
        assert_eq!(ddl(MYSQL, LogicalType::varchar(255)), "tinytext");
        assert_eq!(ddl(MYSQL, LogicalType::varchar(256)), "text");
        assert_eq!(ddl(MYSQL, LogicalType::varchar(65_535)), "text");
        assert_eq!(ddl(MYSQL, LogicalType::varchar(65_536)), "mediumtext");
        assert_eq!(ddl(MYSQL, LogicalType::varchar(16_777_215)), "mediumtext");
        assert_eq!(ddl(MYSQL, LogicalType::varchar(16_777_216)), "longtext");
        assert_eq!(ddl(MYSQL, LogicalType::unbounded_varchar()), "longtext");
    }

    #[test]
    fn test_oracle_varchar_bands() {
        assert_eq!(ddl(ORACLE, LogicalType::varchar(8_191)), "varchar2(8191 CHAR)");
        assert_eq!(ddl(ORACLE, LogicalType::varchar(8_192)), "clob");
        assert_eq!(ddl(ORACLE, LogicalType::unbounded_varchar()), "clob");
    }

    #[test]
    fn test_json_and_varbinary() {
        let json = to_write_mapping(ORACLE, &LogicalType::Json).unwrap();
        assert_eq!(json.data_type, "json");
        assert_eq!(json.write, WriteFunction::Varchar);
        assert_eq!(ddl(MYSQL, LogicalType::Varbinary), "blob");
    }

    #[test]
    fn test_date_write_per_mode() {
        let mysql = to_write_mapping(MYSQL, &LogicalType::Date).unwrap();
        assert_eq!(mysql.data_type, "date");
        assert_eq!(mysql.write, WriteFunction::DateIso);
        let oracle = to_write_mapping(ORACLE, &LogicalType::Date).unwrap();
        assert_eq!(oracle.write, WriteFunction::DateFormatted);
    }

    #[test]
    fn test_time_clamps_to_six() {
        let m = to_write_mapping(ORACLE, &LogicalType::Time { precision: 9 }).unwrap();
        assert_eq!(m.data_type, "time(6)");
        assert_eq!(m.write, WriteFunction::Time { precision: 6 });
        assert_eq!(ddl(MYSQL, LogicalType::Time { precision: 3 }), "time(3)");
    }

    #[test]
    fn test_mysql_timestamp() {
        let short = to_write_mapping(MYSQL, &LogicalType::Timestamp { precision: 3 }).unwrap();
        assert_eq!(short.data_type, "datetime(3)");
        assert_eq!(short.write, WriteFunction::Timestamp { precision: 3 });

        let long = to_write_mapping(MYSQL, &LogicalType::Timestamp { precision: 9 }).unwrap();
        assert_eq!(long.data_type, "datetime(6)");
        assert_eq!(long.write, WriteFunction::LongTimestamp { precision: 6 });
    }

    #[test]
    fn test_oracle_timestamp() {
        let date = to_write_mapping(ORACLE, &LogicalType::Timestamp { precision: 0 }).unwrap();
        assert_eq!(date.data_type, "date");
        assert_eq!(date.write, WriteFunction::TimestampToDate);

        let short = to_write_mapping(ORACLE, &LogicalType::Timestamp { precision: 6 }).unwrap();
        assert_eq!(short.data_type, "timestamp(6)");
        assert_eq!(short.write, WriteFunction::FormattedTimestamp { precision: 6 });

        let long = to_write_mapping(ORACLE, &LogicalType::Timestamp { precision: 12 }).unwrap();
        assert_eq!(long.data_type, "timestamp(9)");
        assert_eq!(long.write, WriteFunction::FormattedLongTimestamp { precision: 9 });
    }

    #[test]
    fn test_timestamp_with_time_zone() {
        let short = to_write_mapping(MYSQL, &LogicalType::TimestampWithTimeZone { precision: 3 })
            .unwrap();
        assert_eq!(short.data_type, "timestamp(3)");
        assert_eq!(short.write, WriteFunction::ShortTimestampWithTimeZone);

        let long = to_write_mapping(ORACLE, &LogicalType::TimestampWithTimeZone { precision: 6 })
            .unwrap();
        assert_eq!(long.write, WriteFunction::LongTimestampWithTimeZone);

        let clamped = to_write_mapping(MYSQL, &LogicalType::TimestampWithTimeZone { precision: 9 })
            .unwrap();
        assert_eq!(clamped.data_type, "timestamp(6)");
        assert_eq!(clamped.write, WriteFunction::LongTimestampWithTimeZone);
    }

    #[test]
    fn test_types_without_rule_are_not_supported() {
        for t in [LogicalType::Uuid, LogicalType::TimeWithTimeZone { precision: 3 }] {
            let err = to_write_mapping(MYSQL, &t).unwrap_err();
            assert!(matches!(err, ConnectorError::NotSupported(_)));
            assert!(err.to_string().starts_with("Unsupported column type: "));
        }
    }
}
