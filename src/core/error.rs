//! Error types and handling for the todo service
//!
//! One top-level [`Error`] for the service plus focused error enums for the
//! identifier codec, the identifier bridge and the storage layer.

use thiserror::Error;

/// Main result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the todo service
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage layer errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Wire identifier errors
    #[error("Identifier format error: {0}")]
    Codec(#[from] CodecError),

    /// Application id does not map onto a storage id
    #[error("Identifier range error: {0}")]
    Bridge(#[from] BridgeError),

    /// Rejected input, one message per offending field
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Identifier assignment kept colliding with concurrent writers
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A stored entity came back without an identifier
    #[error("Stored document is missing its identifier: {0}")]
    MissingIdentifier(String),

    /// I/O errors from std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Operation issued before the store became ready, or after it closed
    #[error("Store is not open")]
    NotOpen,

    /// An insert hit an id that is already taken
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Connecting to the backend failed
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The backend rejected or failed an operation
    #[error("Backend error: {0}")]
    Backend(String),

    /// A stored document does not have the expected shape
    #[error("Data corruption detected: {0}")]
    Corruption(String),
}

/// Wire identifier errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The text is not `<decimal digits>n`
    #[error("'{0}' is not a wire identifier (expected <digits>n)")]
    Malformed(String),
}

/// Identifier bridge errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The id needs more than 24 hex digits
    #[error("id {id} needs {hex_digits} hex digits, storage ids hold at most {max}")]
    OutOfRange {
        /// Decimal rendering of the offending id
        id: String,
        /// Hex digits the id needs
        hex_digits: usize,
        /// Hex digits a storage id holds
        max: usize,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a single-field validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(vec![msg.into()])
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_every_field() {
        let err = Error::Validation(vec!["title is required".into(), "isDone must be a boolean".into()]);
        assert_eq!(
            err.to_string(),
            "Validation failed: title is required; isDone must be a boolean"
        );
    }

    #[test]
    fn test_component_errors_convert() {
        assert!(matches!(
            Error::from(StorageError::NotOpen),
            Error::Storage(StorageError::NotOpen)
        ));
        assert!(matches!(
            Error::from(CodecError::Malformed("12".into())),
            Error::Codec(_)
        ));
        assert_eq!(
            Error::from(CodecError::Malformed("12".into())).to_string(),
            "Identifier format error: '12' is not a wire identifier (expected <digits>n)"
        );
    }
}
