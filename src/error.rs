//! Custom error types for pinseeker
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for pinseeker operations
#[derive(Error, Debug)]
pub enum PinseekerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Property-list parse errors
    #[error("Property list error: {0}")]
    Plist(String),

    /// Backup discovery errors (fatal to the whole scan)
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// Encrypted-backup unlock errors
    #[error("Unlock error: {0}")]
    Unlock(String),
}

// Implement From traits for common error types

impl From<std::io::Error> for PinseekerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<plist::Error> for PinseekerError {
    fn from(err: plist::Error) -> Self {
        Self::Plist(err.to_string())
    }
}

/// Result type alias for pinseeker operations
pub type PinseekerResult<T> = Result<T, PinseekerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PinseekerError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_discovery_error_display() {
        let err = PinseekerError::Discovery("missing root".into());
        assert_eq!(err.to_string(), "Discovery error: missing root");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PinseekerError = io_err.into();
        assert!(matches!(err, PinseekerError::Io(_)));
    }
}
