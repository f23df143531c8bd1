//! Date and time handling.
//!
//! The driver signals "no fractional seconds" with a sentinel column size
//! (10 for TIME, 19 for TIMESTAMP); any larger size carries the precision as
//! `size - sentinel - 1`. A derived precision outside `[1, mode maximum]`
//! means the driver metadata is self-contradictory and is reported as a
//! [`ConnectorError::MetadataContract`] instead of being guessed around.
//!
//! [`codec`] holds the value conversions and string formats used by the read
//! and write strategies.

pub mod codec;

use crate::core::CompatibleMode;
use crate::error::{ConnectorError, Result};

/// Column size the driver reports for TIME without fractional seconds.
pub const ZERO_PRECISION_TIME_COLUMN_SIZE: i32 = 10;

/// Column size the driver reports for TIMESTAMP/DATETIME without fractional seconds.
pub const ZERO_PRECISION_TIMESTAMP_COLUMN_SIZE: i32 = 19;

/// Largest timestamp precision stored as epoch microseconds.
pub const MAX_SHORT_TIMESTAMP_PRECISION: u32 = 6;

/// Largest timestamp-with-time-zone precision stored as a packed millis/zone word.
pub const MAX_SHORT_TIMESTAMP_TZ_PRECISION: u32 = 3;

/// Zone key of UTC. Every zoned value on this connector carries it.
pub const UTC_KEY: i16 = 0;

fn verify_precision(mode: CompatibleMode, precision: i32) -> Result<u32> {
    let max = mode.max_timestamp_precision();
    if precision < 1 || precision as u32 > max {
        return Err(ConnectorError::metadata(format!(
            "Unexpected timestamp precision {} (allowed 1..={} in {} mode)",
            precision, max, mode
        )));
    }
    Ok(precision as u32)
}

/// Fractional-second precision of a TIME column from its declared size.
pub fn time_precision(mode: CompatibleMode, column_size: i32) -> Result<u32> {
    if column_size == ZERO_PRECISION_TIME_COLUMN_SIZE {
        return Ok(0);
    }
    verify_precision(mode, column_size - ZERO_PRECISION_TIME_COLUMN_SIZE - 1)
}

/// Fractional-second precision of a TIMESTAMP/DATETIME column.
///
/// Sizes below the sentinel carry the precision in the declared scale instead.
pub fn timestamp_precision(mode: CompatibleMode, column_size: i32, scale: i32) -> Result<u32> {
    use std::cmp::Ordering;

    match column_size.cmp(&ZERO_PRECISION_TIMESTAMP_COLUMN_SIZE) {
        Ordering::Less => verify_precision(mode, scale),
        Ordering::Equal => Ok(0),
        Ordering::Greater => verify_precision(
            mode,
            column_size - ZERO_PRECISION_TIMESTAMP_COLUMN_SIZE - 1,
        ),
    }
}

/// Bind expression for date values.
pub fn to_date_expression(mode: CompatibleMode) -> &'static str {
    match mode {
        CompatibleMode::MySql => "CAST(? AS DATE)",
        CompatibleMode::Oracle => "TO_DATE(?, 'SYYYY-MM-DD HH24:MI:SS')",
    }
}

/// Oracle-mode bind expression for a timestamp formatted with `precision` digits.
pub fn to_timestamp_expression(precision: u32) -> String {
    match precision {
        0 => "TO_TIMESTAMP(?, 'SYYYY-MM-DD HH24:MI:SS')".to_string(),
        1 | 2 => "TO_TIMESTAMP(?, 'SYYYY-MM-DD HH24:MI:SS.FF')".to_string(),
        p => format!("TO_TIMESTAMP(?, 'SYYYY-MM-DD HH24:MI:SS.FF{}')", p),
    }
}
