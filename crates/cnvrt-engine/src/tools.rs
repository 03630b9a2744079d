//! External tool detection.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check if a tool is available using a custom version argument.
pub fn check_tool_with_arg(name: &str, version_arg: &str) -> ToolInfo {
    let result = Command::new(name).arg(version_arg).output();

    match result {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path: which::which(name).ok(),
            }
        }
        _ => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Directory holding tool binaries bundled with cnvrt: `<cache>/cnvrt`.
pub fn bundled_tools_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("cnvrt"))
}

/// Where a bundled copy of `name` would live inside `dir`.
pub fn bundled_tool_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}{}", name, std::env::consts::EXE_SUFFIX))
}

/// Check the tools the local engine shells out to.
///
/// Only ffmpeg is needed; images are converted in-process.
pub fn check_tools(ffmpeg_path: Option<&Path>) -> Vec<ToolInfo> {
    let ffmpeg = ffmpeg_path
        .map(Path::to_path_buf)
        .or_else(|| {
            bundled_tools_dir()
                .map(|dir| bundled_tool_path(&dir, "ffmpeg"))
                .filter(|p| p.exists())
        })
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "ffmpeg".to_string());
    let mut info = check_tool_with_arg(&ffmpeg, "-version");
    info.name = "ffmpeg".to_string();
    if info.available && info.path.is_none() {
        info.path = Some(PathBuf::from(ffmpeg));
    }
    vec![info]
}

/// Require that a tool is available on `PATH`, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool: the configured path, then the bundled copy in
/// [`bundled_tools_dir`], then `PATH`.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    resolve_tool_path(name, config_path, bundled_tools_dir().as_deref())
}

fn resolve_tool_path(
    name: &str,
    config_path: Option<&Path>,
    bundled_dir: Option<&Path>,
) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        tracing::warn!(
            "Configured {} path {} does not exist, falling back to PATH",
            name,
            path.display()
        );
    }

    if let Some(bundled) = bundled_dir.map(|dir| bundled_tool_path(dir, name)) {
        if bundled.exists() {
            tracing::debug!("Using bundled {} at {}", name, bundled.display());
            return Ok(bundled);
        }
    }

    require_tool(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tool_not_found() {
        let info = check_tool_with_arg("nonexistent_tool_12345", "--version");
        assert!(!info.available);
        assert!(info.version.is_none());
        assert!(info.path.is_none());
    }

    #[test]
    fn test_require_tool_missing() {
        let err = require_tool("nonexistent_tool_12345").unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }

    #[test]
    fn test_configured_path_wins() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = get_tool_path("nonexistent_tool_12345", Some(file.path())).unwrap();
        assert_eq!(path, file.path());
    }

    #[test]
    fn test_bundled_copy_used_before_path() {
        let dir = tempfile::tempdir().unwrap();
        let bundled = bundled_tool_path(dir.path(), "nonexistent_tool_12345");
        std::fs::write(&bundled, b"").unwrap();

        let path = resolve_tool_path("nonexistent_tool_12345", None, Some(dir.path())).unwrap();
        assert_eq!(path, bundled);
    }

    #[test]
    fn test_configured_path_beats_bundled_copy() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(bundled_tool_path(dir.path(), "nonexistent_tool_12345"), b"").unwrap();
        let configured = tempfile::NamedTempFile::new().unwrap();

        let path = resolve_tool_path(
            "nonexistent_tool_12345",
            Some(configured.path()),
            Some(dir.path()),
        )
        .unwrap();
        assert_eq!(path, configured.path());
    }

    #[test]
    fn test_missing_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_tool_path("nonexistent_tool_12345", None, Some(dir.path())).unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }

    #[test]
    fn test_bundled_tool_path_name() {
        let path = bundled_tool_path(Path::new("/cache/cnvrt"), "ffmpeg");
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            format!("ffmpeg{}", std::env::consts::EXE_SUFFIX)
        );
    }
}
