//! Error types for sites, points and the registry

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Error types for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// IO error during a file operation
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be encoded for the medium
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A stored value could not be decoded into a document
    #[error("Deserialization error in {location}: {message}")]
    Deserialization {
        /// File or identifier that failed to decode
        location: String,
        /// Decoder message
        message: String,
    },

    /// Identifier cannot be mapped onto the medium
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Connection error (remote sites)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The site has not been initialized, or was terminated
    #[error("Site '{0}' is not initialized")]
    NotInitialized(String),

    /// A site or point with this name is already registered
    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    /// Generic backend error
    #[error("Backend error: {0}")]
    Backend(String),

    /// A detached task failed to complete
    #[error("Task error: {0}")]
    Task(String),
}

impl StorageError {
    /// Create a decode error for the given file or identifier
    pub fn decode<L: Into<String>, M: ToString>(location: L, message: M) -> Self {
        Self::Deserialization {
            location: location.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if this error is recoverable by fixing input or configuration
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::InvalidIdentifier(_)
                | StorageError::Configuration(_)
                | StorageError::NotInitialized(_)
                | StorageError::DuplicateName(_)
        )
    }
}
