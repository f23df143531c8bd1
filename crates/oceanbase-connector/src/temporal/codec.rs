//! Conversions between driver temporal values and engine encodings.

use chrono::{
    Datelike, DateTime, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc,
};

use super::UTC_KEY;
use crate::core::value::{LongTimestamp, LongTimestampWithTimeZone};
use crate::error::{ConnectorError, Result};

pub const MICROS_PER_SECOND: i64 = 1_000_000;
pub const MILLIS_PER_SECOND: i64 = 1_000;
pub const NANOS_PER_MICRO: i64 = 1_000;
pub const NANOS_PER_MILLI: i64 = 1_000_000;
pub const PICOS_PER_NANO: i64 = 1_000;
pub const PICOS_PER_MICRO: i64 = 1_000_000;
pub const PICOS_PER_MILLI: i64 = 1_000_000_000;
pub const PICOS_PER_SECOND: i64 = 1_000_000_000_000;
pub const PICOS_PER_DAY: i64 = 86_400 * PICOS_PER_SECOND;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAY_FROM_CE: i64 = 719_163;

const ZONE_KEY_BITS: u32 = 12;
const ZONE_KEY_MASK: i64 = (1 << ZONE_KEY_BITS) - 1;

/// Integer division rounding halves up (toward positive infinity).
pub fn round_div(value: i64, factor: i64) -> i64 {
    round_div_i128(i128::from(value), i128::from(factor)) as i64
}

fn round_div_i128(value: i128, factor: i128) -> i128 {
    if factor == 1 {
        return value;
    }
    if value >= 0 {
        (value + factor / 2) / factor
    } else {
        (value + 1 - factor / 2) / factor
    }
}

/// Round `value` (expressed in units of 10^-`digits`) to `precision` digits.
fn round_to_precision(value: i128, digits: u32, precision: u32) -> i128 {
    if precision >= digits {
        return value;
    }
    let factor = 10i128.pow(digits - precision);
    round_div_i128(value, factor) * factor
}

fn out_of_range(what: &str, value: impl std::fmt::Display) -> ConnectorError {
    ConnectorError::invalid_value(format!("{} out of range: {}", what, value))
}

// ===== Dates =====

pub fn epoch_day(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAY_FROM_CE
}

pub fn date_from_epoch_day(days: i64) -> Result<NaiveDate> {
    days.checked_add(UNIX_EPOCH_DAY_FROM_CE)
        .and_then(|ce_day| i32::try_from(ce_day).ok())
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| out_of_range("Epoch day", days))
}

/// Correct the backend's off-by-one year for dates before year 1.
///
/// Oracle mode hands back BC dates one year late unless the server formats
/// them itself, so a calendar year at or below zero is moved back one year.
pub fn adjust_bc_year(value: NaiveDateTime) -> Result<NaiveDateTime> {
    if value.year() > 0 {
        return Ok(value);
    }
    value
        .checked_sub_months(Months::new(12))
        .ok_or_else(|| out_of_range("Timestamp", value))
}

// ===== Times =====

/// Picoseconds since midnight, rounded to `precision` fractional digits.
///
/// Rounding up to the next day wraps to midnight.
pub fn picos_of_day(time: NaiveTime, precision: u32) -> i64 {
    let nanos = i128::from(time.num_seconds_from_midnight()) * 1_000_000_000
        + i128::from(time.nanosecond());
    let picos = round_to_precision(nanos * i128::from(PICOS_PER_NANO), 12, precision) as i64;
    if picos == PICOS_PER_DAY {
        0
    } else {
        picos
    }
}

pub fn time_from_picos(picos: i64, precision: u32) -> Result<NaiveTime> {
    if !(0..PICOS_PER_DAY).contains(&picos) {
        return Err(out_of_range("Time of day (picoseconds)", picos));
    }
    let mut rounded = round_to_precision(i128::from(picos), 12, precision) as i64;
    if rounded == PICOS_PER_DAY {
        rounded = 0;
    }
    let nanos = round_div(rounded, PICOS_PER_NANO);
    let secs = nanos / 1_000_000_000;
    let sub = nanos % 1_000_000_000;
    NaiveTime::from_num_seconds_from_midnight_opt(secs as u32, sub as u32)
        .ok_or_else(|| out_of_range("Time of day (picoseconds)", picos))
}

// ===== Timestamps =====

fn epoch_nanos(value: NaiveDateTime) -> i128 {
    i128::from(value.and_utc().timestamp()) * 1_000_000_000 + i128::from(value.nanosecond())
}

fn datetime_from_epoch_nanos(nanos: i128) -> Result<NaiveDateTime> {
    let secs = nanos.div_euclid(1_000_000_000);
    let sub = nanos.rem_euclid(1_000_000_000) as u32;
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::<Utc>::from_timestamp(s, sub))
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| out_of_range("Timestamp (nanoseconds)", nanos))
}

/// Epoch microseconds of a local date-time read as UTC, rounded to `precision`.
pub fn epoch_micros(value: NaiveDateTime, precision: u32) -> Result<i64> {
    let rounded = round_to_precision(epoch_nanos(value), 9, precision);
    i64::try_from(rounded / i128::from(NANOS_PER_MICRO))
        .map_err(|_| out_of_range("Timestamp", value))
}

pub fn datetime_from_epoch_micros(micros: i64) -> Result<NaiveDateTime> {
    datetime_from_epoch_nanos(i128::from(micros) * i128::from(NANOS_PER_MICRO))
}

/// Long timestamp of a local date-time, rounded to `precision` (at most 9 carry data).
pub fn long_timestamp(value: NaiveDateTime, precision: u32) -> Result<LongTimestamp> {
    let picos = round_to_precision(epoch_nanos(value) * i128::from(PICOS_PER_NANO), 12, precision);
    let micros = picos.div_euclid(i128::from(PICOS_PER_MICRO));
    let picos_of_micro = picos.rem_euclid(i128::from(PICOS_PER_MICRO)) as u32;
    Ok(LongTimestamp {
        epoch_micros: i64::try_from(micros).map_err(|_| out_of_range("Timestamp", value))?,
        picos_of_micro,
    })
}

/// Local date-time of a long timestamp, rounded to `precision`.
pub fn datetime_from_long_timestamp(
    value: &LongTimestamp,
    precision: u32,
) -> Result<NaiveDateTime> {
    let picos = i128::from(value.epoch_micros) * i128::from(PICOS_PER_MICRO)
        + i128::from(value.picos_of_micro);
    let rounded = round_to_precision(picos, 12, precision.min(9));
    datetime_from_epoch_nanos(rounded.div_euclid(i128::from(PICOS_PER_NANO)))
}

// ===== Timestamps with time zone =====

/// Millis in the high bits, zone key in the low 12. Millis that do not fit the
/// remaining 52 bits are rejected.
pub fn pack_date_time_with_zone(millis_utc: i64, zone_key: i16) -> Result<i64> {
    millis_utc
        .checked_mul(1 << ZONE_KEY_BITS)
        .map(|shifted| shifted | (i64::from(zone_key) & ZONE_KEY_MASK))
        .ok_or_else(|| out_of_range("Instant (milliseconds)", millis_utc))
}

pub fn unpack_millis_utc(packed: i64) -> i64 {
    packed >> ZONE_KEY_BITS
}

pub fn unpack_zone_key(packed: i64) -> i16 {
    (packed & ZONE_KEY_MASK) as i16
}

/// Packed short value of an instant. Sub-millisecond digits are dropped.
pub fn short_timestamp_with_time_zone(value: &DateTime<FixedOffset>) -> Result<i64> {
    pack_date_time_with_zone(value.timestamp_millis(), UTC_KEY)
}

pub fn long_timestamp_with_time_zone(value: &DateTime<FixedOffset>) -> LongTimestampWithTimeZone {
    let nanos = i64::from(value.timestamp_subsec_nanos());
    LongTimestampWithTimeZone {
        epoch_millis: value.timestamp() * MILLIS_PER_SECOND + nanos / NANOS_PER_MILLI,
        picos_of_milli: ((nanos % NANOS_PER_MILLI) * PICOS_PER_NANO) as u32,
        time_zone_key: UTC_KEY,
    }
}

pub fn instant_from_millis(millis_utc: i64) -> Result<DateTime<FixedOffset>> {
    DateTime::<Utc>::from_timestamp_millis(millis_utc)
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| out_of_range("Instant (milliseconds)", millis_utc))
}

pub fn instant_from_long(value: &LongTimestampWithTimeZone) -> Result<DateTime<FixedOffset>> {
    let secs = value.epoch_millis.div_euclid(MILLIS_PER_SECOND);
    let nanos = value.epoch_millis.rem_euclid(MILLIS_PER_SECOND) * NANOS_PER_MILLI
        + i64::from(value.picos_of_milli) / PICOS_PER_NANO;
    DateTime::<Utc>::from_timestamp(secs, nanos as u32)
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| out_of_range("Instant (milliseconds)", value.epoch_millis))
}

// ===== Text formats =====

/// `uuuu-MM-dd`: at least four year digits, sign for negative years.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `uuuu-MM-dd HH:mm:ss`.
pub fn format_timestamp_seconds(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// `uuuu-MM-dd HH:mm:ss` plus `.fraction` when the nanoseconds are not zero,
/// trailing zeros trimmed.
pub fn format_timestamp_nano_optional(value: NaiveDateTime) -> String {
    let mut out = format_timestamp_seconds(value);
    let nanos = value.nanosecond() % 1_000_000_000;
    if nanos != 0 {
        let fraction = format!("{:09}", nanos);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out
}

/// Whole-second date-time of a precision-0 timestamp.
///
/// The write protocol for Oracle-mode DATE columns has no room for fractions,
/// so a residue is a contract violation.
pub fn whole_second_datetime(epoch_micros: i64) -> Result<NaiveDateTime> {
    let micros_of_second = epoch_micros.rem_euclid(MICROS_PER_SECOND);
    if micros_of_second != 0 {
        return Err(ConnectorError::metadata(format!(
            "Micros of second must be zero: '{}'",
            epoch_micros
        )));
    }
    datetime_from_epoch_micros(epoch_micros)
}
