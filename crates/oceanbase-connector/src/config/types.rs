//! Configuration type definitions.

use std::time::Duration;

use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

use crate::core::CompatibleMode;

/// Root connector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConnectorConfig {
    /// JDBC-style URL handed to the connection factory.
    pub connection_url: String,

    /// SQL dialect of the tenant (default: mysql).
    #[serde(default)]
    pub compatible_mode: CompatibleMode,

    /// Let the driver reconnect after a dropped connection (default: true).
    #[serde(default = "default_true")]
    pub auto_reconnect: bool,

    /// Reconnect attempts when auto-reconnect is on (default: 3).
    #[serde(default = "default_max_reconnects")]
    pub max_reconnects: u32,

    /// Connect timeout (default: 10s).
    #[serde(default = "default_connection_timeout", with = "duration_text")]
    pub connection_timeout: Duration,

    /// Have the driver read metadata from information_schema (default: true).
    #[serde(default = "default_true")]
    pub use_information_schema: bool,

    /// Table and column remarks in metadata results.
    #[serde(default)]
    pub remarks_reporting: RemarksReporting,

    /// Driver types (names or numeric codes) always read as unbounded varchar.
    #[serde(default)]
    pub jdbc_types_mapped_to_varchar: Vec<String>,

    /// Session defaults for decimal handling.
    #[serde(default)]
    pub session: SessionSettings,
}

/// `remarks-reporting.enabled`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RemarksReporting {
    #[serde(default)]
    pub enabled: bool,
}

/// What happens when a backend decimal does not fit the engine precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecimalMapping {
    /// Columns that do not fit are not mapped.
    #[default]
    Strict,
    /// Columns that do not fit are mapped at maximum precision and rounded.
    AllowOverflow,
}

/// Rounding applied when a decimal is rescaled on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecimalRoundingMode {
    Up,
    Down,
    Ceiling,
    Floor,
    #[default]
    HalfUp,
    HalfDown,
    HalfEven,
    /// Any value that needs rounding is an error.
    Unnecessary,
}

impl DecimalRoundingMode {
    /// `None` for [`DecimalRoundingMode::Unnecessary`].
    pub fn strategy(self) -> Option<RoundingStrategy> {
        match self {
            DecimalRoundingMode::Up => Some(RoundingStrategy::AwayFromZero),
            DecimalRoundingMode::Down => Some(RoundingStrategy::ToZero),
            DecimalRoundingMode::Ceiling => Some(RoundingStrategy::ToPositiveInfinity),
            DecimalRoundingMode::Floor => Some(RoundingStrategy::ToNegativeInfinity),
            DecimalRoundingMode::HalfUp => Some(RoundingStrategy::MidpointAwayFromZero),
            DecimalRoundingMode::HalfDown => Some(RoundingStrategy::MidpointTowardZero),
            DecimalRoundingMode::HalfEven => Some(RoundingStrategy::MidpointNearestEven),
            DecimalRoundingMode::Unnecessary => None,
        }
    }
}

/// Per-session values the read path consults for decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SessionSettings {
    #[serde(default)]
    pub decimal_mapping: DecimalMapping,

    /// Scale used for decimals declared without precision (default: 0).
    #[serde(default)]
    pub decimal_default_scale: u32,

    #[serde(default)]
    pub decimal_rounding_mode: DecimalRoundingMode,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            decimal_mapping: DecimalMapping::Strict,
            decimal_default_scale: 0,
            decimal_rounding_mode: DecimalRoundingMode::HalfUp,
        }
    }
}

impl SessionSettings {
    pub fn allow_overflow(&self) -> bool {
        self.decimal_mapping == DecimalMapping::AllowOverflow
    }
}

fn default_true() -> bool {
    true
}

fn default_max_reconnects() -> u32 {
    3
}

fn default_connection_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Duration text such as `10s`, `1.5m`, `500ms` or `2h`.
pub mod duration_text {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    /// Unit suffix and its length in nanoseconds.
    const UNITS: &[(&str, u64)] = &[
        ("ns", 1),
        ("us", 1_000),
        ("ms", 1_000_000),
        ("s", 1_000_000_000),
        ("m", 60_000_000_000),
        ("h", 3_600_000_000_000),
        ("d", 86_400_000_000_000),
    ];

    pub fn parse(text: &str) -> Result<Duration, String> {
        let trimmed = text.trim();
        let split = trimmed
            .find(|c: char| c.is_ascii_alphabetic())
            .ok_or_else(|| format!("duration '{}' has no unit", text))?;
        let (number, unit) = trimmed.split_at(split);
        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| format!("duration '{}' has an invalid number", text))?;
        let factor = UNITS
            .iter()
            .find(|(u, _)| *u == unit.trim())
            .map(|(_, f)| *f)
            .ok_or_else(|| format!("duration '{}' has an unknown unit", text))?;
        if !value.is_finite() || value < 0.0 {
            return Err(format!("duration '{}' must be non-negative", text));
        }
        let nanos = (value * factor as f64).round();
        if nanos > u64::MAX as f64 {
            return Err(format!("duration '{}' is out of range", text));
        }
        Ok(Duration::from_nanos(nanos as u64))
    }

    pub fn format(duration: &Duration) -> String {
        let millis = duration.as_millis();
        if millis % 1_000 == 0 {
            format!("{}s", millis / 1_000)
        } else {
            format!("{}ms", millis)
        }
    }

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(serde::de::Error::custom)
    }
}
