//! Request and response shapes exchanged with a conversion engine.

use bytes::Bytes;
use cnvrt_common::ConversionId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Convert a payload the caller already holds in memory.
#[derive(Debug, Clone)]
pub struct ByteRequest {
    /// Raw bytes of the source file.
    pub data: Bytes,
    /// Where the converted file should be written.
    pub output_path: PathBuf,
    /// Source format tag, e.g. `"png"`.
    pub from_format: String,
    /// Destination format tag, e.g. `"jpg"`.
    pub to_format: String,
    /// Keep the alpha channel when the target can store it.
    pub keep_transparency: bool,
}

/// Convert a file that already lives on disk.
#[derive(Debug, Clone)]
pub struct PathRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub from_format: String,
    pub to_format: String,
}

/// What the engine reports back for one request.
///
/// A conversion that ran but failed is `success == false` with a message, not
/// an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineResponse {
    pub id: ConversionId,
    pub success: bool,
    pub error: Option<String>,
    pub output_path: Option<PathBuf>,
}

impl EngineResponse {
    /// A successful conversion that wrote `output_path`.
    pub fn succeeded(output_path: impl Into<PathBuf>) -> Self {
        Self {
            id: ConversionId::new(),
            success: true,
            error: None,
            output_path: Some(output_path.into()),
        }
    }

    /// A conversion the engine attempted and gave up on.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            id: ConversionId::new(),
            success: false,
            error: Some(message.into()),
            output_path: None,
        }
    }
}
