//! Error types for the connector core.

use thiserror::Error;

/// Main error type for type mapping, SQL generation and metadata operations.
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// Configuration error (unknown compatible mode, bad option values, etc.)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The requested operation or type has no rule in the active mode.
    #[error("{0}")]
    NotSupported(String),

    /// Drop without cascade on a schema that still holds tables.
    #[error("Cannot drop non-empty schema '{0}'")]
    SchemaNotEmpty(String),

    /// Driver metadata contradicts itself (missing size, precision out of range).
    #[error("Metadata contract violation: {0}")]
    MetadataContract(String),

    /// A row or bind value cannot be represented in the mapped type.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Failure reported by the connection collaborator, with the operation that ran.
    #[error("Backend error: {message}\n  Context: {context}")]
    Backend { message: String, context: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConnectorError {
    /// Create a Backend error with context about where it occurred
    pub fn backend(message: impl Into<String>, context: impl Into<String>) -> Self {
        ConnectorError::Backend {
            message: message.into(),
            context: context.into(),
        }
    }

    /// Create a NotSupported error
    pub fn not_supported(message: impl Into<String>) -> Self {
        ConnectorError::NotSupported(message.into())
    }

    /// Create a MetadataContract error
    pub fn metadata(message: impl Into<String>) -> Self {
        ConnectorError::MetadataContract(message.into())
    }

    /// Create an InvalidValue error
    pub fn invalid_value(message: impl Into<String>) -> Self {
        ConnectorError::InvalidValue(message.into())
    }

    /// Re-signal a collaborator failure as a Backend error for `context`.
    pub fn in_context(self, context: impl Into<String>) -> Self {
        match self {
            ConnectorError::Backend { message, .. } => ConnectorError::Backend {
                message,
                context: context.into(),
            },
            other => ConnectorError::Backend {
                message: other.to_string(),
                context: context.into(),
            },
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            ConnectorError::InvalidConfiguration(_) | ConnectorError::Yaml(_) => 1,
            ConnectorError::NotSupported(_) => 2,
            ConnectorError::SchemaNotEmpty(_) => 3,
            ConnectorError::MetadataContract(_) => 4,
            ConnectorError::InvalidValue(_) => 5,
            ConnectorError::Backend { .. } => 6,
            ConnectorError::Io(_) => 7,
            ConnectorError::Json(_) => 8,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for connector operations.
pub type Result<T> = std::result::Result<T, ConnectorError>;
