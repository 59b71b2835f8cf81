//! Common error types for edutrack

use thiserror::Error;

/// Common result type for edutrack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across edutrack crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Event could not be serialized into its wire shape
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Client-side pixel rejected or failed a call
    #[error("Pixel delivery error: {0}")]
    Pixel(String),

    /// Data layer append failed
    #[error("Data layer error: {0}")]
    DataLayer(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
