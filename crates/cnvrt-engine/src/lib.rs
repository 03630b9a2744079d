//! # cnvrt-engine
//!
//! The seam between the conversion queue and whatever actually converts files.
//!
//! [`ConversionEngine`] is the request/response contract: submit a payload (in
//! memory or by path), get back a success flag, an identifier, and an optional
//! error message. [`LocalEngine`] implements it on this machine:
//!
//! - images are decoded and re-encoded in-process with the `image` crate
//! - videos are transcoded through the ffmpeg CLI
//!
//! ## Example
//!
//! ```no_run
//! use cnvrt_engine::{ConversionEngine, LocalEngine, PathRequest};
//!
//! # async fn run() -> cnvrt_engine::Result<()> {
//! let engine = LocalEngine::new();
//! let response = engine
//!     .convert_path(PathRequest {
//!         input_path: "/photos/cat.png".into(),
//!         output_path: "/photos/cat.jpg".into(),
//!         from_format: "png".into(),
//!         to_format: "jpg".into(),
//!     })
//!     .await?;
//! println!("success: {}", response.success);
//! # Ok(())
//! # }
//! ```

mod error;
pub mod images;
mod local;
mod request;
pub mod tools;
pub mod video;

use async_trait::async_trait;

// Re-exports
pub use error::{Error, Result};
pub use local::LocalEngine;
pub use request::{ByteRequest, EngineResponse, PathRequest};
pub use tools::{check_tools, ToolInfo};

/// A backend that converts one file per call.
///
/// `Err` means the request never got a verdict (transport or worker failure);
/// a conversion that was attempted and failed comes back as `Ok` with
/// `success == false`.
#[async_trait]
pub trait ConversionEngine: Send + Sync {
    /// Convert bytes the caller already holds in memory.
    async fn convert_bytes(&self, request: ByteRequest) -> Result<EngineResponse>;

    /// Convert a file by its filesystem path.
    async fn convert_path(&self, request: PathRequest) -> Result<EngineResponse>;
}
