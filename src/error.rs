use std::path::PathBuf;
use thiserror::Error;

/// Main error type for importpick
#[derive(Error, Debug)]
pub enum ImportPickError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// A subprocess could not be started
    #[error("Failed to launch {program}: {source}")]
    SubprocessLaunch {
        program: String,
        source: std::io::Error,
    },

    /// A subprocess exited with a code that is not one of its expected codes
    #[error("{program} exited abnormally ({})", describe_code(.code))]
    SubprocessExit { program: String, code: Option<i32> },

    /// A required executable is not on PATH
    #[error("Required program not found on PATH: {program}")]
    MissingDependency { program: String },

    /// Malformed `path[:row:col]` target
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for importpick operations
pub type Result<T> = std::result::Result<T, ImportPickError>;
