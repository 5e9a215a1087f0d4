//! Error types for meshply

use thiserror::Error;

/// Main error type for meshply operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file content does not follow the expected format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// An operation was requested that the current object cannot perform,
    /// e.g. reading faces from a file that has none
    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Shorthand for building an [`Error::InvalidFormat`]
    pub fn format<S: Into<String>>(message: S) -> Self {
        Error::InvalidFormat(message.into())
    }

    /// Returns `true` if the error describes malformed input data
    pub fn is_format_error(&self) -> bool {
        matches!(self, Error::InvalidFormat(_))
    }
}

/// Result type alias for meshply operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_message() {
        let err = Error::format("Unrecognized keyword in header: foo");
        assert!(err.is_format_error());
        assert_eq!(err.to_string(), "Invalid format: Unrecognized keyword in header: foo");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_format_error());
    }
}
