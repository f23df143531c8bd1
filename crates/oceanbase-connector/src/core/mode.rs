//! Compatible mode of the backend tenant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ConnectorError, Result};

/// SQL dialect the backend tenant speaks. Fixed for the lifetime of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompatibleMode {
    #[default]
    MySql,
    Oracle,
}

impl CompatibleMode {
    /// Parse a mode from configuration text.
    ///
    /// Blank input selects MySQL mode; `mysql` and `oracle` match case-insensitively.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(CompatibleMode::MySql);
        }
        match trimmed.to_lowercase().as_str() {
            "mysql" => Ok(CompatibleMode::MySql),
            "oracle" => Ok(CompatibleMode::Oracle),
            _ => Err(ConnectorError::InvalidConfiguration(format!(
                "Unsupported compatible mode: {}",
                text
            ))),
        }
    }

    pub fn is_mysql_compatible(self) -> bool {
        self == CompatibleMode::MySql
    }

    /// Largest fractional-second precision the mode stores for TIME and TIMESTAMP.
    pub fn max_timestamp_precision(self) -> u32 {
        match self {
            CompatibleMode::MySql => 6,
            CompatibleMode::Oracle => 9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CompatibleMode::MySql => "mysql",
            CompatibleMode::Oracle => "oracle",
        }
    }
}

impl fmt::Display for CompatibleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompatibleMode {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self> {
        CompatibleMode::parse(s)
    }
}

impl Serialize for CompatibleMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CompatibleMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        CompatibleMode::parse(raw.as_deref().unwrap_or("")).map_err(serde::de::Error::custom)
    }
}
