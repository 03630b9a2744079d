use bytes::Bytes;
use chrono::{DateTime, Utc};
use cnvrt_common::formats::{extension_of, is_video_format, mime_label};
use cnvrt_common::{ConversionId, Error, FileId, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Raw content the caller already has for a file, e.g. from a drag-and-drop.
#[derive(Clone)]
pub enum RawContent {
    /// Bytes held in memory.
    Bytes(Bytes),
    /// Bytes staged somewhere readable, loaded when the file is submitted.
    Staged(PathBuf),
}

impl RawContent {
    pub async fn read(&self) -> std::io::Result<Bytes> {
        match self {
            Self::Bytes(bytes) => Ok(bytes.clone()),
            Self::Staged(path) => tokio::fs::read(path).await.map(Bytes::from),
        }
    }
}

impl fmt::Debug for RawContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            Self::Staged(path) => f.debug_tuple("Staged").field(path).finish(),
        }
    }
}

/// A file waiting in the conversion queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileItem {
    pub id: FileId,
    /// Display name, usually the file name with extension.
    pub name: String,
    /// Where the file came from. Relative for content that never touched the
    /// filesystem.
    pub path: PathBuf,
    pub size: u64,
    pub mime_type: String,
    /// Source extension, without the dot.
    pub extension: String,
    /// Requested output format; empty until chosen.
    pub target_format: String,
    #[serde(skip)]
    pub content: Option<RawContent>,
    pub preview: Option<String>,
}

impl FileItem {
    /// Describe a file on disk. The target format starts out empty.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::not_found(path.display().to_string()));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| Error::invalid_input(format!("not a file: {}", path.display())))?;
        let metadata = std::fs::metadata(path)?;
        let extension = extension_of(path).unwrap_or_default();

        Ok(Self {
            id: FileId::new(),
            name,
            path: path.to_path_buf(),
            size: metadata.len(),
            mime_type: mime_label(&extension),
            extension,
            target_format: String::new(),
            content: None,
            preview: None,
        })
    }

    /// Describe content that only exists in memory under a display name.
    pub fn from_bytes(name: &str, data: Bytes) -> Self {
        let extension = extension_of(Path::new(name)).unwrap_or_default();
        Self {
            id: FileId::new(),
            name: name.to_string(),
            path: PathBuf::from(name),
            size: data.len() as u64,
            mime_type: mime_label(&extension),
            extension,
            target_format: String::new(),
            content: Some(RawContent::Bytes(data)),
            preview: None,
        }
    }

    pub fn with_target(mut self, format: impl Into<String>) -> Self {
        self.target_format = format.into();
        self
    }

    pub fn with_content(mut self, content: RawContent) -> Self {
        self.content = Some(content);
        self
    }

    /// Display name up to its first dot.
    pub fn base_name(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }

    /// `{base}.{target}`.
    pub fn output_name(&self) -> String {
        format!("{}.{}", self.base_name(), self.target_format)
    }

    /// Whether `path` points at a real filesystem location (rooted or
    /// drive-qualified) rather than a bare display name.
    pub fn has_filesystem_path(&self) -> bool {
        let path = self.path.to_string_lossy();
        path.contains(':') || path.starts_with('/') || self.path.is_absolute()
    }

    /// In-memory submission applies when content is at hand and there is no
    /// real path to hand the engine instead.
    pub fn submits_in_memory(&self) -> bool {
        self.content.is_some() && !self.has_filesystem_path()
    }

    pub fn is_video(&self) -> bool {
        is_video_format(&self.extension)
    }

    pub fn has_target(&self) -> bool {
        !self.target_format.trim().is_empty()
    }

    pub fn targets_own_format(&self) -> bool {
        self.extension.eq_ignore_ascii_case(&self.target_format)
    }
}

/// One finished conversion attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: ConversionId,
    pub from_format: String,
    pub to_format: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Build an entry stamped now; formats are upper-cased.
    pub fn new(id: ConversionId, from_format: &str, to_format: &str, success: bool) -> Self {
        Self {
            id,
            from_format: from_format.to_uppercase(),
            to_format: to_format.to_uppercase(),
            success,
            timestamp: Utc::now(),
        }
    }
}

/// Progress of the item currently being converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    pub percentage: u32,
    pub message: String,
}

impl ProgressState {
    pub fn idle() -> Self {
        Self {
            percentage: 0,
            message: "Starting conversion...".to_string(),
        }
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::idle()
    }
}

/// Outcome counts of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}
