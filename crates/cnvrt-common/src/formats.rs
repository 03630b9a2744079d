//! Format tables for deciding how a file is routed and what it may become.
//!
//! Formats are plain lowercase extension tags (`"png"`, `"mkv"`). Every lookup
//! here is case-insensitive.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Extensions handled as video: routed to the transcoder and shown with
/// simulated progress while converting.
const VIDEO_FORMATS: &[&str] = &[
    "mp4", "m4v", "mkv", "mov", "webm", "avi", "flv", "mpg", "mpeg", "ts", "m2ts", "mts", "ogv",
    "ogg",
];

/// Extensions the image decoder path accepts.
const IMAGE_FORMATS: &[&str] = &[
    "png", "jpg", "jpeg", "jfif", "webp", "bmp", "gif", "tiff", "tif", "ico", "ppm", "pgm", "pbm",
    "avif", "heic", "heif", "tga", "dds", "apng", "cur", "exr", "svg", "pdf", "psd", "psb", "fits",
    "dcm", "pcx",
];

/// Targets offered for a video source.
const VIDEO_TARGETS: &[&str] = &["mp4", "mkv", "mov", "webm", "avi", "flv", "mpg", "ts", "ogv"];

/// Targets offered for an image source.
const IMAGE_TARGETS: &[&str] = &[
    "png", "jpg", "jpeg", "webp", "bmp", "gif", "tiff", "ico", "ppm", "pgm", "pbm",
];

/// Broad media category of a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a format tag, returning `None` for unknown formats.
    pub fn of(format: &str) -> Option<Self> {
        if is_video_format(format) {
            Some(Self::Video)
        } else if is_image_format(format) {
            Some(Self::Image)
        } else {
            None
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
        }
    }
}

fn contains(table: &[&str], format: &str) -> bool {
    table.contains(&format.to_lowercase().as_str())
}

/// Check whether a format tag names a video container.
///
/// # Examples
///
/// ```
/// use cnvrt_common::formats::is_video_format;
///
/// assert!(is_video_format("mp4"));
/// assert!(is_video_format("M2TS"));
/// assert!(!is_video_format("gif"));
/// ```
pub fn is_video_format(format: &str) -> bool {
    contains(VIDEO_FORMATS, format)
}

/// Check whether a format tag names an image format.
pub fn is_image_format(format: &str) -> bool {
    contains(IMAGE_FORMATS, format)
}

/// Check whether a format tag is known at all.
pub fn is_supported_format(format: &str) -> bool {
    is_image_format(format) || is_video_format(format)
}

/// Formats a source of the given format may be converted into.
///
/// Video sources get the video target list; anything else is assumed to be an
/// image.
///
/// # Examples
///
/// ```
/// use cnvrt_common::formats::supported_targets;
///
/// assert!(supported_targets("mkv").contains(&"webm"));
/// assert!(supported_targets("png").contains(&"jpg"));
/// ```
#[must_use]
pub fn supported_targets(format: &str) -> &'static [&'static str] {
    if is_video_format(format) {
        VIDEO_TARGETS
    } else {
        IMAGE_TARGETS
    }
}

/// Get the list of video format tags.
#[must_use]
pub fn video_formats() -> &'static [&'static str] {
    VIDEO_FORMATS
}

/// Get the list of image format tags.
#[must_use]
pub fn image_formats() -> &'static [&'static str] {
    IMAGE_FORMATS
}

/// Lowercased extension of a path, if it has one.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// MIME type label shown next to a queued file.
pub fn mime_label(format: &str) -> String {
    let format = format.to_lowercase();
    let subtype = match format.as_str() {
        "jpg" | "jpeg" | "jfif" => "jpeg",
        "tif" => "tiff",
        "svg" => "svg+xml",
        "ico" | "cur" => "x-icon",
        "mkv" => "x-matroska",
        "mov" => "quicktime",
        "avi" => "x-msvideo",
        "flv" => "x-flv",
        "mpg" => "mpeg",
        "ts" | "m2ts" | "mts" => "mp2t",
        "ogv" => "ogg",
        "m4v" => "x-m4v",
        "pdf" => return "application/pdf".to_string(),
        other => other,
    };
    match MediaKind::of(&format) {
        Some(kind) => format!("{kind}/{subtype}"),
        None => "application/octet-stream".to_string(),
    }
}
