//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use std::collections::HashSet;
use std::path::Path;

use crate::core::types::JdbcType;
use crate::error::{ConnectorError, Result};

impl ConnectorConfig {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ConnectorConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Type codes from `jdbc-types-mapped-to-varchar`.
    ///
    /// Entries are type names (`OTHER`, `ARRAY`) or numeric codes.
    pub fn forced_varchar_types(&self) -> Result<HashSet<i32>> {
        self.jdbc_types_mapped_to_varchar
            .iter()
            .map(|entry| {
                let trimmed = entry.trim();
                if let Ok(code) = trimmed.parse::<i32>() {
                    return Ok(code);
                }
                JdbcType::from_name(trimmed)
                    .map(JdbcType::code)
                    .ok_or_else(|| {
                        ConnectorError::InvalidConfiguration(format!(
                            "jdbc-types-mapped-to-varchar: unknown type '{}'",
                            entry
                        ))
                    })
            })
            .collect()
    }

    /// Driver properties for the connection factory, in the order they are set.
    pub fn connection_properties(&self) -> Vec<(String, String)> {
        let mut props = vec![
            (
                "useInformationSchema".to_string(),
                self.use_information_schema.to_string(),
            ),
            ("useUnicode".to_string(), "true".to_string()),
            ("characterEncoding".to_string(), "utf8".to_string()),
            ("tinyInt1isBit".to_string(), "false".to_string()),
            ("rewriteBatchedStatements".to_string(), "true".to_string()),
            ("connectionTimeZone".to_string(), "LOCAL".to_string()),
            (
                "forceConnectionTimeZoneToSession".to_string(),
                "true".to_string(),
            ),
        ];

        if self.auto_reconnect {
            props.push(("autoReconnect".to_string(), "true".to_string()));
            props.push(("maxReconnects".to_string(), self.max_reconnects.to_string()));
        }

        props.push((
            "connectTimeout".to_string(),
            self.connection_timeout.as_millis().to_string(),
        ));

        if self.remarks_reporting.enabled {
            props.push(("remarksReporting".to_string(), "true".to_string()));
        }

        props
    }
}
