//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which wires a [`ConversionQueue`] and a
//! [`NotificationCenter`] to a shared [`EventBus`] and a scripted
//! [`MockEngine`] that records every request it receives.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use cnvrt::config::Config;
use cnvrt::events::{Event, EventBus, EventPayload};
use cnvrt::notifications::{Notification, NotificationCenter};
use cnvrt::queue::{ConversionQueue, FileItem};
use cnvrt::{ByteRequest, ConversionEngine, EngineResponse, PathRequest};

/// What the mock engine does with the next request.
#[derive(Debug, Clone)]
pub enum Reply {
    Succeed,
    /// `success == false`, with an optional message.
    Fail(Option<String>),
    /// The call itself errors, as a broken transport would.
    Error,
}

/// A request the mock engine received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Bytes {
        len: usize,
        output_path: PathBuf,
        from_format: String,
        to_format: String,
        keep_transparency: bool,
    },
    Path {
        input_path: PathBuf,
        output_path: PathBuf,
        from_format: String,
        to_format: String,
    },
}

/// Engine that answers from a script, one reply per request, and succeeds
/// once the script runs out.
#[derive(Default)]
pub struct MockEngine {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Call>>,
    delay: Mutex<Duration>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, replies: impl IntoIterator<Item = Reply>) {
        self.replies.lock().extend(replies);
    }

    /// Make every request take `delay` (in tokio time).
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    async fn answer(&self, call: Call) -> cnvrt_engine::Result<EngineResponse> {
        let output_path = match &call {
            Call::Bytes { output_path, .. } | Call::Path { output_path, .. } => {
                output_path.clone()
            }
        };
        self.calls.lock().push(call);

        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let reply = self.replies.lock().pop_front().unwrap_or(Reply::Succeed);
        match reply {
            Reply::Succeed => Ok(EngineResponse::succeeded(output_path)),
            Reply::Fail(message) => {
                let mut response = EngineResponse::failed("");
                response.error = message;
                Ok(response)
            }
            Reply::Error => Err(cnvrt_engine::Error::Worker("connection reset".into())),
        }
    }
}

#[async_trait]
impl ConversionEngine for MockEngine {
    async fn convert_bytes(&self, request: ByteRequest) -> cnvrt_engine::Result<EngineResponse> {
        self.answer(Call::Bytes {
            len: request.data.len(),
            output_path: request.output_path,
            from_format: request.from_format,
            to_format: request.to_format,
            keep_transparency: request.keep_transparency,
        })
        .await
    }

    async fn convert_path(&self, request: PathRequest) -> cnvrt_engine::Result<EngineResponse> {
        self.answer(Call::Path {
            input_path: request.input_path,
            output_path: request.output_path,
            from_format: request.from_format,
            to_format: request.to_format,
        })
        .await
    }
}

/// Queue plus notification center sharing one event bus and a mock engine.
pub struct TestHarness {
    pub queue: ConversionQueue,
    pub notifications: NotificationCenter,
    pub events: Arc<EventBus>,
    pub engine: Arc<MockEngine>,
}

impl TestHarness {
    /// Create a new harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let events = Arc::new(EventBus::default());
        let engine = Arc::new(MockEngine::new());
        let notifications = NotificationCenter::new(config.notifications.clone(), events.clone());
        let queue = ConversionQueue::new(
            &config,
            engine.clone(),
            notifications.clone(),
            events.clone(),
        );

        Self {
            queue,
            notifications,
            events,
            engine,
        }
    }

    /// Titles of the visible notifications, oldest first.
    pub fn notification_titles(&self) -> Vec<String> {
        self.notifications
            .notifications()
            .into_iter()
            .map(|n| n.title)
            .collect()
    }

    pub fn find_notification(&self, title: &str) -> Option<Notification> {
        self.notifications
            .notifications()
            .into_iter()
            .find(|n| n.title == title)
    }
}

/// A dropped-in file held in memory, with no filesystem path.
pub fn memory_file(name: &str, target: &str) -> FileItem {
    FileItem::from_bytes(name, Bytes::from_static(b"\x89PNG fake")).with_target(target)
}

/// A file known only by its path on disk.
pub fn disk_file(path: &str, target: &str) -> FileItem {
    let path = PathBuf::from(path);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    FileItem {
        path,
        content: None,
        ..FileItem::from_bytes(&name, Bytes::new())
    }
    .with_target(target)
}

/// Drain every event currently buffered on `rx`.
pub fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<EventPayload> {
    let mut payloads = Vec::new();
    while let Ok(event) = rx.try_recv() {
        payloads.push(event.payload);
    }
    payloads
}

/// `(percentage, message)` of every progress change in `payloads`.
pub fn progress_changes(payloads: &[EventPayload]) -> Vec<(u32, String)> {
    payloads
        .iter()
        .filter_map(|p| match p {
            EventPayload::ProgressChanged {
                percentage,
                message,
            } => Some((*percentage, message.clone())),
            _ => None,
        })
        .collect()
}
