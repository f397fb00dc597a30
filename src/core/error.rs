//! Error types for Vitals.

use thiserror::Error;

/// All errors that can occur within Vitals.
#[derive(Error, Debug)]
pub enum VitalsError {
    /// Invalid or unloadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A metric event failed validation
    #[error("Invalid metric event: {0}")]
    InvalidEvent(String),

    /// Sampling rate outside [0.0, 1.0]
    #[error("Sampling rate must be between 0.0 and 1.0, got {0}")]
    InvalidSamplingRate(f64),

    /// I/O failure (config file, network bind)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP server failure
    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for Vitals operations
pub type Result<T> = std::result::Result<T, VitalsError>;

impl VitalsError {
    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new invalid-event error
    pub fn invalid_event<S: Into<String>>(msg: S) -> Self {
        Self::InvalidEvent(msg.into())
    }

    /// Creates a new server error
    pub fn server<S: Into<String>>(msg: S) -> Self {
        Self::Server(msg.into())
    }

    /// Returns the error category for metrics/logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::InvalidEvent(_) | Self::InvalidSamplingRate(_) => "validation",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Server(_) => "server",
        }
    }
}
