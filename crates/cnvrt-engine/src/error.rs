//! Error types for cnvrt-engine.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting a file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// An external tool failed to execute.
    #[error("tool execution failed: {tool}: {message}")]
    ToolFailed { tool: String, message: String },

    /// The specified file was not found.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Decoding or encoding an image failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Invalid input provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unsupported source or target format.
    #[error("unsupported format: {0}")]
    Unsupported(String),

    /// The blocking worker running a conversion died.
    #[error("conversion worker failed: {0}")]
    Worker(String),
}

impl Error {
    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a tool execution failed error.
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create an unsupported format error.
    pub fn unsupported(format: impl Into<String>) -> Self {
        Self::Unsupported(format.into())
    }
}
