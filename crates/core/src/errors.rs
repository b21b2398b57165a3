use std::path::PathBuf;

/// Result type alias for kvcache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for kvcache operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A box or index was used with a different dimensionality than it was built for
    #[error("dimension mismatch during {operation}: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        operation: &'static str,
    },

    /// `create` was called on an index that already holds an engine
    #[error("spatial index is already initialized; tear it down before creating it again")]
    IndexAlreadyInitialized,

    /// The index was used before `create`
    #[error("spatial index is not initialized (during {operation})")]
    IndexNotInitialized { operation: &'static str },

    /// Malformed box description
    #[error("invalid box: {message}")]
    InvalidBox { message: String },

    /// A cache key that does not encode a box
    #[error("invalid box key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// File system operations
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json {
            message: error.to_string(),
            source: error,
        }
    }
}

impl Error {
    /// Create a dimension mismatch error
    #[must_use]
    pub fn dimension_mismatch(expected: usize, actual: usize, operation: &'static str) -> Self {
        Error::DimensionMismatch {
            expected,
            actual,
            operation,
        }
    }

    /// Create an invalid box error
    #[must_use]
    pub fn invalid_box(message: impl Into<String>) -> Self {
        Error::InvalidBox {
            message: message.into(),
        }
    }

    /// Create an invalid key error
    #[must_use]
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
