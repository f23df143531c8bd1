//! Configuration validation.

use super::ConnectorConfig;
use crate::core::types::MAX_DECIMAL_PRECISION;
use crate::error::{ConnectorError, Result};

/// Validate the configuration.
pub fn validate(config: &ConnectorConfig) -> Result<()> {
    if config.connection_url.trim().is_empty() {
        return Err(ConnectorError::InvalidConfiguration(
            "connection-url is required".into(),
        ));
    }

    if config.max_reconnects < 1 {
        return Err(ConnectorError::InvalidConfiguration(
            "max-reconnects must be at least 1".into(),
        ));
    }

    if config.session.decimal_default_scale > MAX_DECIMAL_PRECISION {
        return Err(ConnectorError::InvalidConfiguration(format!(
            "session.decimal-default-scale must be in range [0, {}], got {}",
            MAX_DECIMAL_PRECISION, config.session.decimal_default_scale
        )));
    }

    // Resolves every entry or reports the first unknown one
    config.forced_varchar_types()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ConnectorConfig {
        ConnectorConfig::from_yaml("connection-url: jdbc:oceanbase://localhost:2881/test\n").unwrap()
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_blank_connection_url_fails() {
        let mut config = valid_config();
        config.connection_url = "  ".into();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("connection-url is required"));
    }

    #[test]
    fn test_zero_max_reconnects_fails() {
        let mut config = valid_config();
        config.max_reconnects = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_default_scale_above_max_fails() {
        let mut config = valid_config();
        config.session.decimal_default_scale = 39;
        assert!(validate(&config).is_err());
        config.session.decimal_default_scale = 38;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_unknown_forced_varchar_type_fails() {
        let mut config = valid_config();
        config.jdbc_types_mapped_to_varchar = vec!["OTHER".into(), "GEOMETRY".into()];
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("GEOMETRY"));
    }
}
