use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    pub progress: ProgressConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueConfig {
    /// Number of finished conversions kept in history (default: 50)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Folder converted files are written to when none is given explicitly
    #[serde(default)]
    pub default_destination: Option<PathBuf>,

    /// Keep alpha channels when the target format supports them (default: true)
    #[serde(default = "default_keep_transparency")]
    pub keep_transparency: bool,
}

fn default_history_limit() -> usize {
    50
}

fn default_keep_transparency() -> bool {
    true
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            default_destination: None,
            keep_transparency: default_keep_transparency(),
        }
    }
}

/// Simulated progress shown while a video is being transcoded.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProgressConfig {
    #[serde(default = "default_simulator_interval")]
    pub simulator_interval_ms: u64,

    /// Simulated progress never passes this percentage
    #[serde(default = "default_simulator_ceiling")]
    pub simulator_ceiling: u32,

    /// Largest random step added per tick
    #[serde(default = "default_simulator_max_step")]
    pub simulator_max_step: f64,
}

fn default_simulator_interval() -> u64 {
    500
}
fn default_simulator_ceiling() -> u32 {
    95
}
fn default_simulator_max_step() -> f64 {
    15.0
}

impl ProgressConfig {
    pub fn simulator_interval(&self) -> Duration {
        Duration::from_millis(self.simulator_interval_ms)
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            simulator_interval_ms: default_simulator_interval(),
            simulator_ceiling: default_simulator_ceiling(),
            simulator_max_step: default_simulator_max_step(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Decay timer period
    #[serde(default = "default_tick")]
    pub tick_ms: u64,

    #[serde(default = "default_short_duration")]
    pub success_ms: u64,

    #[serde(default = "default_short_duration")]
    pub info_ms: u64,

    #[serde(default = "default_short_duration")]
    pub warning_ms: u64,

    #[serde(default = "default_error_duration")]
    pub error_ms: u64,
}

fn default_tick() -> u64 {
    16
}
fn default_short_duration() -> u64 {
    3000
}
fn default_error_duration() -> u64 {
    4000
}

impl NotificationConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick(),
            success_ms: default_short_duration(),
            info_ms: default_short_duration(),
            warning_ms: default_short_duration(),
            error_ms: default_error_duration(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
}
