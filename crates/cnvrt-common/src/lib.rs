//! cnvrt-common: shared types, constants, and utilities.
//!
//! This crate provides common functionality used across cnvrt:
//!
//! - **Typed IDs**: UUID wrappers for queued files, conversions, and notifications
//! - **Format tables**: image/video extension allow-lists and supported targets
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use cnvrt_common::{ConversionId, Error, Result};
//! use cnvrt_common::formats::is_video_format;
//!
//! let id = ConversionId::new();
//! assert!(!id.to_string().is_empty());
//!
//! assert!(is_video_format("MKV"));
//! assert!(!is_video_format("png"));
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("file"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod formats;
pub mod ids;

pub use error::{Error, Result};
pub use formats::MediaKind;
pub use ids::*;
