//! Error types for SynM.

use thiserror::Error;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when input was rejected before anything was sent
pub const EXIT_INVALID_INPUT: i32 = 64;

/// Exit code when the store returns something we cannot decode
pub const EXIT_INVALID_RESPONSE: i32 = 65;

/// Exit code when the credential was rejected and not recovered
pub const EXIT_UNAUTHORIZED: i32 = 67;

/// Exit code when the store is unreachable
pub const EXIT_STORE_UNAVAILABLE: i32 = 70;

#[derive(Error, Debug)]
pub enum SynmError {
    #[error("Store unreachable: {0}")]
    Transport(String),

    #[error("Store answered with HTTP {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Unauthorized. Check the key in synm_api_key.txt")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SynmError {
    /// Map an HTTP status into the error taxonomy
    pub fn from_status(status: u16, what: &str) -> Self {
        match status {
            401 => SynmError::Unauthorized,
            404 => SynmError::NotFound(what.to_string()),
            other => SynmError::Status(other),
        }
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            SynmError::Transport(_) | SynmError::Status(_) => EXIT_STORE_UNAVAILABLE,
            SynmError::Decode(_) | SynmError::Json(_) | SynmError::NotFound(_) => {
                EXIT_INVALID_RESPONSE
            }
            SynmError::Unauthorized => EXIT_UNAUTHORIZED,
            SynmError::InvalidInput(_) => EXIT_INVALID_INPUT,
            SynmError::Config(_) | SynmError::Io(_) => EXIT_GENERAL_ERROR,
        }
    }
}
