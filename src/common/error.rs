//! Error types for the SUT harness
//!
//! Configuration errors are fatal and meant to stop a test run before the
//! first test executes. Capture errors are reported through the same type but
//! never escape the outcome observer.

use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the SUT harness
#[derive(Error, Debug)]
pub enum Error {
    // === SUT Configuration Errors ===
    #[error("Failed to read SUT properties from '{}': {source}", .path.display())]
    PropertiesRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Missing required SUT property '{0}'")]
    MissingProperty(String),

    #[error("SUT property '{key}' must be a whole number, got '{value}'")]
    InvalidNumber {
        key: String,
        value: String,
        #[source]
        source: ParseIntError,
    },

    // === Harness Settings Errors ===
    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Evidence Capture Errors ===
    #[error("No automation session available for screenshot capture")]
    NoSession,

    #[error("Automation driver error: {0}")]
    Driver(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a properties read error for the given source path
    pub fn properties_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::PropertiesRead {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid number error
    pub fn invalid_number(key: &str, value: &str, source: ParseIntError) -> Self {
        Self::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
            source,
        }
    }

    /// Whether this error comes from loading the SUT configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::PropertiesRead { .. } | Error::MissingProperty(_) | Error::InvalidNumber { .. }
        )
    }
}
