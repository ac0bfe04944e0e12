//! Error types for the terminal client.

use thiserror::Error;

use crate::domain::ValueObjectError;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration value failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ValueObjectError),

    /// Line editor could not be started
    #[error("Readline error: {0}")]
    Readline(String),
}
