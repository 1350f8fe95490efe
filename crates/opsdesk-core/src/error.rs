//! Error types for `opsdesk` core library.
//!
//! Decisions never fail; these cover construction and parsing only.

use thiserror::Error;

/// Result type alias using `opsdesk` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `opsdesk` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Role registry failed validation
    #[error("Role registry error: {0}")]
    Registry(String),

    /// Route table failed validation
    #[error("Route table error: {0}")]
    Routes(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown module: {0}")]
    UnknownModule(String),

    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    #[error("Unknown account mode: {0}")]
    UnknownMode(String),
}
