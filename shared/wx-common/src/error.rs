//! Common Error Types

use thiserror::Error;

/// Errors raised while building shared types from configuration values.
#[derive(Debug, Error)]
pub enum Error {
    /// Trust mode string is not one of the known modes.
    #[error("Unknown trust mode: {0}")]
    UnknownTrustMode(String),

    /// Account requires an AES key for its trust mode but none was given.
    #[error("Account {0} requires an AES key for its trust mode")]
    MissingAesKey(String),

    /// A required account field was empty.
    #[error("Account {account}: {field} must not be empty")]
    EmptyField {
        account: String,
        field: &'static str,
    },
}

/// Result alias for common operations.
pub type Result<T> = std::result::Result<T, Error>;
