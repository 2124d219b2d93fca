//! Error types for QPlan

use thiserror::Error;

/// Core error type for QPlan operations
///
/// Plan normalization itself never fails; these errors cover the few
/// operations that cannot degrade gracefully (unknown engine identifiers,
/// unreadable configuration).
#[derive(Error, Debug)]
pub enum QplanError {
    #[error("Unsupported engine: {0}. Supported engines: duckdb, mysql, postgres")]
    UnsupportedEngine(String),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for QPlan core operations
pub type Result<T> = std::result::Result<T, QplanError>;
