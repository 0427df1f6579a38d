//! Error types for content stores

/// Content store error
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Not a valid content id
    #[error("Invalid content id: {0}")]
    InvalidContentId(String),
    /// Refused to store an empty file
    #[error("Refusing to store empty file {0}")]
    EmptyFile(String),
    /// File exceeds the store's size limit
    #[error("File size {size} exceeds store limit {max_size}")]
    FileTooLarge {
        /// The actual file size
        size: usize,
        /// The store's limit
        max_size: usize,
    },
    /// Store endpoint is not a usable URL
    #[error("Invalid store endpoint: {0}")]
    InvalidEndpoint(String),
    /// Request could not be completed
    #[error("Transport error: {0}")]
    Transport(String),
    /// Store answered with an error status
    #[error("Store rejected request with status {status}: {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },
    /// Store response could not be understood
    #[error("Invalid store response: {0}")]
    InvalidResponse(String),
    /// Store reported a different hash than the uploaded bytes have
    #[error("Content id mismatch: expected {expected}, store returned {actual}")]
    IntegrityMismatch {
        /// Hash of the bytes we sent
        expected: String,
        /// Hash the store reported
        actual: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        assert_eq!(
            StorageError::EmptyFile("badge.jpg".to_string()).to_string(),
            "Refusing to store empty file badge.jpg"
        );
        assert_eq!(
            StorageError::Rejected {
                status: 401,
                message: "missing token".to_string()
            }
            .to_string(),
            "Store rejected request with status 401: missing token"
        );
        assert_eq!(
            StorageError::FileTooLarge {
                size: 10,
                max_size: 5
            }
            .to_string(),
            "File size 10 exceeds store limit 5"
        );
    }
}
