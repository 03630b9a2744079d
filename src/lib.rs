//! cnvrt - File conversion queue with toast notifications
//!
//! This library crate exposes the queue manager, the notification center and
//! their shared event bus, for the CLI and for integration testing.

pub mod config;
pub mod events;
pub mod notifications;
pub mod progress;
pub mod queue;

pub use cnvrt_common::{ConversionId, FileId, NotificationId};
pub use cnvrt_engine::{ByteRequest, ConversionEngine, EngineResponse, LocalEngine, PathRequest};
