//! Error types for the expiring cache
//!
//! Cache operations never fail; only construction can.

use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised while building a cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Configuration values rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No Tokio runtime available to host the sweep task
    #[error("No Tokio runtime available to run the background sweep")]
    RuntimeUnavailable,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
