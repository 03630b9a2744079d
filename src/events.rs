//! Store change events.
//!
//! [`EventBus`] wraps a `tokio::sync::broadcast` channel with a bounded
//! ring-buffer of recent events so that a view attaching late can catch up.
//! The queue manager and the notification center publish here whenever their
//! state changes; readers then pull fresh snapshots from the owning store.

use chrono::{DateTime, Utc};
use cnvrt_common::{ConversionId, FileId, NotificationId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Maximum number of events retained in the ring buffer.
const MAX_RECENT_EVENTS: usize = 100;

// ---------------------------------------------------------------------------
// EventPayload
// ---------------------------------------------------------------------------

/// Payload describing what changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    // -- Queue ---------------------------------------------------------------
    FileAdded {
        file_id: FileId,
        name: String,
    },
    FileRemoved {
        file_id: FileId,
    },
    FilesCleared,
    FileFormatUpdated {
        file_id: FileId,
        target_format: String,
    },

    // -- History -------------------------------------------------------------
    HistoryAppended {
        entry_id: ConversionId,
        success: bool,
    },

    // -- Batch ---------------------------------------------------------------
    ProcessingStarted {
        total: usize,
    },
    ProgressChanged {
        percentage: u32,
        message: String,
    },
    ProcessingFinished {
        succeeded: usize,
        failed: usize,
    },

    // -- Notifications -------------------------------------------------------
    NotificationAdded {
        notification_id: NotificationId,
        title: String,
    },
    NotificationRemoved {
        notification_id: NotificationId,
    },
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A timestamped event ready for broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub payload: EventPayload,
}

impl Event {
    /// Create a new event with a fresh UUID and the current timestamp.
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Broadcast channel with a bounded ring buffer of recent events.
pub struct EventBus {
    tx: broadcast::Sender<Event>,
    recent: RwLock<VecDeque<Event>>,
}

impl EventBus {
    /// Create a new event bus.
    ///
    /// `capacity` controls the broadcast channel buffer size (not the ring
    /// buffer, which is always [`MAX_RECENT_EVENTS`]).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            recent: RwLock::new(VecDeque::with_capacity(MAX_RECENT_EVENTS)),
        }
    }

    /// Subscribe to the broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Broadcast an event to all current subscribers and store it in the
    /// ring buffer.
    pub fn publish(&self, payload: EventPayload) {
        let event = Event::new(payload);

        {
            let mut recent = self.recent.write();
            if recent.len() >= MAX_RECENT_EVENTS {
                recent.pop_back();
            }
            recent.push_front(event.clone());
        }

        if self.tx.send(event).is_err() {
            tracing::trace!("No subscribers for store event");
        }
    }

    /// Return the `n` most recent events (newest first).
    pub fn recent_events(&self, n: usize) -> Vec<Event> {
        let recent = self.recent.read();
        recent.iter().take(n).cloned().collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
