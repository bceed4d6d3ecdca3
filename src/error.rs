//! Fragments error types

use thiserror::Error;

/// Fragments error type
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed caller input
    #[error("Validation error: {0}")]
    Validation(String),

    /// No fragment metadata or data for the owner and id
    #[error("Not found: {0}")]
    NotFound(String),

    /// The fragment exists but cannot be represented as the requested extension
    #[error("Unsupported conversion: {0}")]
    UnsupportedConversion(String),

    /// A legal conversion failed because the stored bytes are malformed
    #[error("Conversion failed: {0}")]
    Conversion(String),

    /// Storage backend failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Stable machine-readable code for this error kind
    pub fn kind_code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
            Error::UnsupportedConversion(_) => "UNSUPPORTED_CONVERSION",
            Error::Conversion(_) => "CONVERSION_FAILED",
            Error::Storage(_) => "STORAGE_ERROR",
            Error::Config(_) | Error::Io(_) | Error::Serialization(_) => "INTERNAL_ERROR",
        }
    }
}

/// Result type alias for Fragments operations
pub type Result<T> = std::result::Result<T, Error>;
