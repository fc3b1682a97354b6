//! Error types for the dynamic string engine.

use thiserror::Error;

/// Result type for string engine operations.
pub type Result<T> = std::result::Result<T, StringError>;

/// Errors that can occur while configuring or running the synthesizer.
#[derive(Error, Debug)]
pub enum StringError {
    /// Invalid construction parameter.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The requested grid does not fit the pre-allocated capacity.
    #[error("Grid capacity exceeded: {0}")]
    CapacityError(String),

    /// The construction parameters violate the stability condition.
    #[error("Unstable scheme: {0}")]
    InstabilityError(String),

    /// Audio device error.
    #[error("Audio device error: {0}")]
    DeviceError(String),

    /// State diagnostics error.
    #[error("Diagnostics error: {0}")]
    DiagnosticsError(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StringError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a capacity error.
    pub fn capacity(msg: impl Into<String>) -> Self {
        Self::CapacityError(msg.into())
    }

    /// Create an instability error.
    pub fn instability(msg: impl Into<String>) -> Self {
        Self::InstabilityError(msg.into())
    }

    /// Create a device error.
    pub fn device(msg: impl Into<String>) -> Self {
        Self::DeviceError(msg.into())
    }

    /// Create a diagnostics error.
    pub fn diagnostics(msg: impl Into<String>) -> Self {
        Self::DiagnosticsError(msg.into())
    }
}
