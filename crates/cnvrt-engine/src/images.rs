//! In-process image conversion built on the `image` crate.

use crate::{Error, Result};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;

/// Map a target format tag to the encoder that writes it.
pub fn target_image_format(format: &str) -> Option<ImageFormat> {
    let format = match format.to_lowercase().as_str() {
        "jpg" | "jpeg" => ImageFormat::Jpeg,
        "png" => ImageFormat::Png,
        "webp" => ImageFormat::WebP,
        "bmp" => ImageFormat::Bmp,
        "gif" => ImageFormat::Gif,
        "tiff" | "tif" => ImageFormat::Tiff,
        "ico" => ImageFormat::Ico,
        "ppm" | "pgm" | "pbm" => ImageFormat::Pnm,
        _ => return None,
    };
    Some(format)
}

/// Encoders that cannot store an alpha channel.
fn drops_alpha(format: ImageFormat) -> bool {
    matches!(format, ImageFormat::Jpeg | ImageFormat::Bmp | ImageFormat::Pnm)
}

/// Decode `input` (format sniffed from content) and write it to `output` as
/// `target_format`.
pub fn convert_image(
    input: &Path,
    output: &Path,
    target_format: &str,
    keep_transparency: bool,
) -> Result<()> {
    if !input.exists() {
        return Err(Error::file_not_found(input));
    }

    let format =
        target_image_format(target_format).ok_or_else(|| Error::unsupported(target_format))?;

    let img = ImageReader::open(input)?.with_guessed_format()?.decode()?;

    let img = if !keep_transparency || drops_alpha(format) {
        DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img
    };

    tracing::debug!(
        "Encoding {} -> {} as {:?}",
        input.display(),
        output.display(),
        format
    );
    img.save_with_format(output, format)?;
    Ok(())
}
