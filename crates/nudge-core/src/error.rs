//! Core error types for nudge-core.
//!
//! Nothing in the engine is fatal. Every rejected operation comes back to the
//! caller as one of these variants and leaves the economy untouched.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for nudge-core.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Unlock attempted without enough snowflakes
    #[error("Insufficient currency: accessory costs {cost}, balance is {balance}")]
    InsufficientCurrency { cost: u64, balance: u64 },

    /// Equip attempted on an accessory that was never unlocked
    #[error("Accessory '{0}' is not unlocked")]
    AccessoryNotUnlocked(String),

    /// Accessory id missing from the catalog
    #[error("Unknown accessory: {0}")]
    UnknownAccessory(String),

    /// Accessory already owned; unlocking again would charge twice
    #[error("Accessory '{0}' is already unlocked")]
    AlreadyUnlocked(String),

    /// Challenge id not present in today's generated set
    #[error("Challenge '{0}' is not part of today's set")]
    InvalidChallengeState(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read configuration
    #[error("Failed to load configuration from {path}: {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for EngineError
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
