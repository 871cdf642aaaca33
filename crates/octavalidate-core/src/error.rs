//! Error types for the validation engine
//!
//! Only configuration mistakes surface as errors. A payload that fails its
//! rules is not an error: failures are recorded in the [`Report`] and
//! `validate` returns `Ok(false)`.
//!
//! [`Report`]: crate::report::Report

use thiserror::Error;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Missing or blank session identifier
    #[error("Invalid session: {0}")]
    InvalidSession(String),

    /// Schema rejected by the compiler
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Payload with the wrong shape
    #[error("Invalid input: {0}")]
    InputError(String),

    /// Malformed size string
    #[error("Format error: {0}")]
    FormatError(String),

    /// Invalid validator options
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// File access or I/O error
    #[error("File error: {0}")]
    FileError(String),

    /// Document parsing error
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl EngineError {
    /// Create an invalid session error
    pub fn invalid_session(msg: impl Into<String>) -> Self {
        EngineError::InvalidSession(msg.into())
    }

    /// Create a schema error
    pub fn schema_error(msg: impl Into<String>) -> Self {
        EngineError::SchemaError(msg.into())
    }

    /// Create an input error
    pub fn input_error(msg: impl Into<String>) -> Self {
        EngineError::InputError(msg.into())
    }

    /// Create a format error
    pub fn format_error(msg: impl Into<String>) -> Self {
        EngineError::FormatError(msg.into())
    }

    /// Create a configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        EngineError::ConfigError(msg.into())
    }

    /// Check if this error was caused by the caller's schema, payload or options
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidSession(_)
                | EngineError::SchemaError(_)
                | EngineError::InputError(_)
                | EngineError::FormatError(_)
                | EngineError::ConfigError(_)
                | EngineError::ParseError(_)
        )
    }

    /// Check if this error comes from schema compilation (including size strings)
    pub fn is_schema_error(&self) -> bool {
        matches!(self, EngineError::SchemaError(_) | EngineError::FormatError(_))
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::FileError(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::ParseError(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for EngineError {
    fn from(err: serde_yaml::Error) -> Self {
        EngineError::ParseError(format!("YAML error: {}", err))
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::ParseError(format!("TOML error: {}", err))
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
