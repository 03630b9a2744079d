//! Native engine: images in-process, video through ffmpeg.

use crate::request::{ByteRequest, EngineResponse, PathRequest};
use crate::{images, video, ConversionEngine, Error, Result};
use async_trait::async_trait;
use cnvrt_common::MediaKind;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Engine that performs conversions on this machine.
///
/// Work runs on tokio's blocking pool so the caller's event loop stays free
/// for progress and notification timers.
#[derive(Debug, Clone, Default)]
pub struct LocalEngine {
    ffmpeg_path: Option<PathBuf>,
}

impl LocalEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific ffmpeg binary instead of the one on `PATH`.
    pub fn with_ffmpeg_path(mut self, path: Option<PathBuf>) -> Self {
        self.ffmpeg_path = path;
        self
    }

    /// Convert one on-disk file, routing by source and target format.
    pub fn convert_file(
        &self,
        input: &Path,
        output: &Path,
        from_format: &str,
        to_format: &str,
        keep_transparency: bool,
    ) -> Result<()> {
        // GIF output goes through the image encoder whatever the source claims.
        if to_format.eq_ignore_ascii_case("gif") {
            return images::convert_image(input, output, to_format, keep_transparency);
        }

        match MediaKind::of(from_format) {
            Some(MediaKind::Video) => {
                video::convert_video(input, output, to_format, self.ffmpeg_path.as_deref())
            }
            Some(MediaKind::Image) => {
                images::convert_image(input, output, to_format, keep_transparency)
            }
            None => Err(Error::unsupported(from_format)),
        }
    }

    fn convert_staged(&self, request: &ByteRequest) -> Result<()> {
        if request.data.is_empty() {
            return Err(Error::InvalidInput("no input data".to_string()));
        }
        let mut staged = tempfile::Builder::new()
            .prefix("cnvrt_input_")
            .suffix(&format!(".{}", request.from_format.to_lowercase()))
            .tempfile()?;
        staged.write_all(&request.data)?;
        staged.flush()?;

        self.convert_file(
            staged.path(),
            &request.output_path,
            &request.from_format,
            &request.to_format,
            request.keep_transparency,
        )
    }

    fn respond(result: Result<()>, output: &Path, from: &str, to: &str) -> EngineResponse {
        match result {
            Ok(()) => {
                tracing::info!("Converted {} to {}: {}", from, to, output.display());
                EngineResponse::succeeded(output)
            }
            Err(e) => {
                tracing::warn!("Conversion {} -> {} failed: {}", from, to, e);
                EngineResponse::failed(format!("Conversion error: {}", e))
            }
        }
    }
}

#[async_trait]
impl ConversionEngine for LocalEngine {
    async fn convert_bytes(&self, request: ByteRequest) -> Result<EngineResponse> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || {
            let result = engine.convert_staged(&request);
            Self::respond(
                result,
                &request.output_path,
                &request.from_format,
                &request.to_format,
            )
        })
        .await
        .map_err(|e| Error::Worker(e.to_string()))
    }

    async fn convert_path(&self, request: PathRequest) -> Result<EngineResponse> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || {
            let result = engine.convert_file(
                &request.input_path,
                &request.output_path,
                &request.from_format,
                &request.to_format,
                true,
            );
            Self::respond(
                result,
                &request.output_path,
                &request.from_format,
                &request.to_format,
            )
        })
        .await
        .map_err(|e| Error::Worker(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use image::{ImageFormat, Rgb, RgbImage};

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(3, 2, Rgb([1, 2, 3]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[tokio::test]
    async fn test_convert_bytes_png_to_bmp() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("photo.bmp");

        let response = LocalEngine::new()
            .convert_bytes(ByteRequest {
                data: Bytes::from(png_bytes()),
                output_path: output.clone(),
                from_format: "png".into(),
                to_format: "bmp".into(),
                keep_transparency: true,
            })
            .await
            .unwrap();

        assert!(response.success, "{:?}", response.error);
        assert_eq!(response.output_path.as_deref(), Some(output.as_path()));
        assert!(output.exists());
    }

    #[tokio::test]
    async fn test_convert_path_reports_failure_in_response() {
        let dir = tempfile::tempdir().unwrap();

        let response = LocalEngine::new()
            .convert_path(PathRequest {
                input_path: dir.path().join("missing.png"),
                output_path: dir.path().join("missing.jpg"),
                from_format: "png".into(),
                to_format: "jpg".into(),
            })
            .await
            .unwrap();

        assert!(!response.success);
        assert!(response.error.unwrap().contains("file not found"));
    }

    #[tokio::test]
    async fn test_empty_payload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let response = LocalEngine::new()
            .convert_bytes(ByteRequest {
                data: Bytes::new(),
                output_path: dir.path().join("empty.jpg"),
                from_format: "png".into(),
                to_format: "jpg".into(),
                keep_transparency: true,
            })
            .await
            .unwrap();

        assert!(!response.success);
        assert!(response.error.unwrap().contains("no input data"));
    }

    #[test]
    fn test_unknown_source_format() {
        let err = LocalEngine::new()
            .convert_file(Path::new("a.xyz"), Path::new("a.png"), "xyz", "png", true)
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn test_gif_target_uses_image_path_for_any_source() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("frame.png");
        std::fs::write(&input, png_bytes()).unwrap();
        let output = dir.path().join("frame.gif");

        // Claimed source format is irrelevant for GIF output.
        LocalEngine::new()
            .convert_file(&input, &output, "mp4", "gif", true)
            .unwrap();
        assert!(output.exists());
    }
}
