use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchflowError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid accept pattern '{pattern}' on slot '{slot}': {reason}")]
    InvalidSlotPattern {
        slot: String,
        pattern: String,
        reason: String,
    },

    #[error("Duplicate slot id: {0}")]
    DuplicateSlot(String),
}

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to read directory '{path}': {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Synchronous rejection raised by an execution engine before any work starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("{0}")]
    Rejected(String),

    #[error("Execution engine unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("Batch driver has shut down")]
    Closed,
}
