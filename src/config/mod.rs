mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./cnvrt.toml", "~/.config/cnvrt/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.queue.history_limit == 0 {
        anyhow::bail!("queue.history_limit must be at least 1");
    }

    if config.progress.simulator_interval_ms == 0 {
        anyhow::bail!("progress.simulator_interval_ms cannot be 0");
    }
    if config.progress.simulator_ceiling > 100 {
        anyhow::bail!(
            "progress.simulator_ceiling must be at most 100, got {}",
            config.progress.simulator_ceiling
        );
    }
    let step = config.progress.simulator_max_step;
    if step.is_nan() || step < 0.0 {
        anyhow::bail!("progress.simulator_max_step must be a non-negative number");
    }

    let notifications = &config.notifications;
    if notifications.tick_ms == 0 {
        anyhow::bail!("notifications.tick_ms cannot be 0");
    }
    for (name, value) in [
        ("success_ms", notifications.success_ms),
        ("info_ms", notifications.info_ms),
        ("warning_ms", notifications.warning_ms),
        ("error_ms", notifications.error_ms),
    ] {
        if value == 0 {
            anyhow::bail!("notifications.{} cannot be 0", name);
        }
    }

    if let Some(ref dest) = config.queue.default_destination {
        if !dest.exists() {
            tracing::warn!("Default destination does not exist: {:?}", dest);
        }
    }

    Ok(())
}
