//! Video transcoding through the ffmpeg CLI.

use crate::{tools, Error, Result};
use cnvrt_common::formats::is_video_format;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const DEFAULT_BITRATE: &str = "5000k";
const DEFAULT_PRESET: &str = "medium";
const AUDIO_BITRATE: &str = "128k";

/// Video codec ffmpeg should encode for a target container.
pub fn codec_for_format(format: &str) -> &'static str {
    match format.to_lowercase().as_str() {
        "webm" => "vp9",
        "ogv" | "ogg" => "theora",
        "mpg" | "mpeg" => "mpeg2video",
        "avi" => "mpeg4",
        _ => "h264",
    }
}

/// Audio codec ffmpeg should encode for a target container.
pub fn audio_codec_for_format(format: &str) -> &'static str {
    if format.eq_ignore_ascii_case("webm") {
        "libopus"
    } else {
        "aac"
    }
}

/// Builder for a single ffmpeg transcode.
#[derive(Debug, Clone)]
pub struct VideoTranscoder {
    input: PathBuf,
    output: PathBuf,
    target_format: String,
    bitrate: String,
    preset: String,
}

impl VideoTranscoder {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, target_format: &str) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            target_format: target_format.to_lowercase(),
            bitrate: DEFAULT_BITRATE.to_string(),
            preset: DEFAULT_PRESET.to_string(),
        }
    }

    pub fn with_bitrate(mut self, bitrate: &str) -> Self {
        self.bitrate = bitrate.to_string();
        self
    }

    pub fn with_preset(mut self, preset: &str) -> Self {
        self.preset = preset.to_string();
        self
    }

    /// The ffmpeg argument list, without the program name.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-i".into(), self.input.clone().into_os_string()];
        args.push("-y".into());
        args.extend(
            [
                "-c:v",
                codec_for_format(&self.target_format),
                "-b:v",
                self.bitrate.as_str(),
                "-preset",
                self.preset.as_str(),
                "-c:a",
                audio_codec_for_format(&self.target_format),
                "-b:a",
                AUDIO_BITRATE,
            ]
            .into_iter()
            .map(OsString::from),
        );
        args.push(self.output.clone().into_os_string());
        args
    }

    /// Run ffmpeg to completion.
    pub fn transcode(&self, ffmpeg: &Path) -> Result<()> {
        if !self.input.exists() {
            return Err(Error::file_not_found(&self.input));
        }

        tracing::debug!(
            "Transcoding {} -> {} ({})",
            self.input.display(),
            self.output.display(),
            codec_for_format(&self.target_format)
        );

        let output = Command::new(ffmpeg)
            .args(self.args())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::tool_failed("ffmpeg", format!("failed to start: {}", e)))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(Error::tool_failed(
                "ffmpeg",
                format!(
                    "exited with {}: {}",
                    output.status,
                    stderr_tail(&output.stderr)
                ),
            ))
        }
    }
}

/// Last few lines of ffmpeg's stderr; the banner and stream dump come first.
fn stderr_tail(stderr: &[u8]) -> String {
    const TAIL_LINES: usize = 5;
    let stderr = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(TAIL_LINES)..].join("\n")
}

/// Transcode `input` into the `target_format` container at `output`.
pub fn convert_video(
    input: &Path,
    output: &Path,
    target_format: &str,
    ffmpeg_path: Option<&Path>,
) -> Result<()> {
    if !is_video_format(target_format) {
        return Err(Error::unsupported(target_format));
    }

    let ffmpeg = tools::get_tool_path("ffmpeg", ffmpeg_path)?;
    VideoTranscoder::new(input, output, target_format).transcode(&ffmpeg)
}
