//! Cache error types

use thiserror::Error;

/// Errors that can occur while building or using a cache connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Endpoints or settings could not be turned into a working backend
    #[error("Cache configuration error: {0}")]
    Configuration(String),

    /// The backend rejected or failed an operation
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// A value could not be encoded for storage
    #[error("Cache serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        CacheError::Serialization(error.to_string())
    }
}

impl From<config::ConfigError> for CacheError {
    fn from(error: config::ConfigError) -> Self {
        CacheError::Configuration(error.to_string())
    }
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
