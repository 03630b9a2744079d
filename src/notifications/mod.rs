//! Self-expiring toast notifications.
//!
//! Each notification gets two timers on the tokio runtime: a decay ticker that
//! lowers its remaining progress linearly, and an expiry sleep that removes it
//! once its duration has elapsed. The expiry timer does not depend on the
//! ticker, so a notification is always removed on time.

mod types;

pub use types::*;

use crate::config::NotificationConfig;
use crate::events::{EventBus, EventPayload};
use cnvrt_common::NotificationId;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

struct Timers {
    decay: JoinHandle<()>,
    expiry: JoinHandle<()>,
}

impl Timers {
    fn abort(self) {
        self.decay.abort();
        self.expiry.abort();
    }
}

struct Inner {
    notifications: RwLock<Vec<Notification>>,
    timers: Mutex<HashMap<NotificationId, Timers>>,
    config: NotificationConfig,
    events: Arc<EventBus>,
}

impl Inner {
    /// Returns false once the notification is gone.
    fn set_progress(&self, id: NotificationId, progress: f32) -> bool {
        let mut notifications = self.notifications.write();
        match notifications.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.progress = n.progress.min(progress);
                true
            }
            None => false,
        }
    }

    fn remove(&self, id: NotificationId) -> bool {
        if let Some(timers) = self.timers.lock().remove(&id) {
            timers.abort();
        }

        let removed = {
            let mut notifications = self.notifications.write();
            let len_before = notifications.len();
            notifications.retain(|n| n.id != id);
            notifications.len() < len_before
        };

        if removed {
            self.events
                .publish(EventPayload::NotificationRemoved { notification_id: id });
        }
        removed
    }
}

/// Owner of the visible notification set.
///
/// Cheap to clone; clones share the same set. Adding a notification spawns
/// its timers, so it must happen inside a tokio runtime.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

impl NotificationCenter {
    pub fn new(config: NotificationConfig, events: Arc<EventBus>) -> Self {
        Self {
            inner: Arc::new(Inner {
                notifications: RwLock::new(Vec::new()),
                timers: Mutex::new(HashMap::new()),
                config,
                events,
            }),
        }
    }

    /// Show a notification for `duration` and return its id.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn add_notification(
        &self,
        title: impl Into<String>,
        description: Option<&str>,
        kind: NotificationKind,
        duration: Duration,
    ) -> NotificationId {
        let notification = Notification::new(
            title.into(),
            description.map(str::to_string),
            kind,
            duration,
        );
        let id = notification.id;

        tracing::debug!(
            "Notification {:?} '{}' for {}ms",
            kind,
            notification.title,
            notification.duration_ms
        );
        let title = notification.title.clone();
        self.inner.notifications.write().push(notification);
        self.inner.events.publish(EventPayload::NotificationAdded {
            notification_id: id,
            title,
        });

        let created = Instant::now();
        let decay = tokio::spawn(decay(
            self.inner.clone(),
            id,
            created,
            duration,
            self.inner.config.tick(),
        ));
        let expiry = tokio::spawn(expire(self.inner.clone(), id, created + duration));

        self.inner
            .timers
            .lock()
            .insert(id, Timers { decay, expiry });

        // The expiry may already have fired on another worker thread before the
        // handles were registered.
        if self.get(id).is_none() {
            if let Some(timers) = self.inner.timers.lock().remove(&id) {
                timers.abort();
            }
        }

        id
    }

    /// Remove a notification early. Returns false if it was already gone.
    pub fn remove_notification(&self, id: NotificationId) -> bool {
        self.inner.remove(id)
    }

    pub fn success(&self, title: impl Into<String>, description: Option<&str>) -> NotificationId {
        let duration = Duration::from_millis(self.inner.config.success_ms);
        self.add_notification(title, description, NotificationKind::Success, duration)
    }

    pub fn error(&self, title: impl Into<String>, description: Option<&str>) -> NotificationId {
        let duration = Duration::from_millis(self.inner.config.error_ms);
        self.add_notification(title, description, NotificationKind::Error, duration)
    }

    pub fn info(&self, title: impl Into<String>, description: Option<&str>) -> NotificationId {
        let duration = Duration::from_millis(self.inner.config.info_ms);
        self.add_notification(title, description, NotificationKind::Info, duration)
    }

    pub fn warning(&self, title: impl Into<String>, description: Option<&str>) -> NotificationId {
        let duration = Duration::from_millis(self.inner.config.warning_ms);
        self.add_notification(title, description, NotificationKind::Warning, duration)
    }

    /// Snapshot of the visible notifications, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.notifications.read().clone()
    }

    pub fn get(&self, id: NotificationId) -> Option<Notification> {
        self.inner
            .notifications
            .read()
            .iter()
            .find(|n| n.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.notifications.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.notifications.read().is_empty()
    }
}

async fn decay(
    inner: Arc<Inner>,
    id: NotificationId,
    created: Instant,
    duration: Duration,
    tick: Duration,
) {
    let mut ticker = tokio::time::interval_at(created + tick, tick);
    loop {
        ticker.tick().await;
        let progress = remaining_progress(created.elapsed(), duration);
        if !inner.set_progress(id, progress) || progress <= 0.0 {
            break;
        }
    }
}

async fn expire(inner: Arc<Inner>, id: NotificationId, deadline: Instant) {
    tokio::time::sleep_until(deadline).await;
    inner.set_progress(id, 0.0);
    inner.remove(id);
}
