//! Common error types used throughout cnvrt.

/// Common error type for cnvrt.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entry was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
