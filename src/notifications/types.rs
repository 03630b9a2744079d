use cnvrt_common::NotificationId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }
}

/// A toast shown to the user until its duration runs out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub description: Option<String>,
    pub kind: NotificationKind,
    pub duration_ms: u64,
    /// Remaining lifetime as a percentage, 100 at creation down to 0.
    pub progress: f32,
}

impl Notification {
    pub fn new(
        title: String,
        description: Option<String>,
        kind: NotificationKind,
        duration: Duration,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            title,
            description,
            kind,
            duration_ms: duration.as_millis() as u64,
            progress: 100.0,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Remaining progress after `elapsed` of a `duration` lifetime, clamped to
/// `[0, 100]`.
pub fn remaining_progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 0.0;
    }
    let spent = elapsed.as_secs_f64() / duration.as_secs_f64() * 100.0;
    (100.0 - spent).clamp(0.0, 100.0) as f32
}
