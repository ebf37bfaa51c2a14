//! Image decoding and encoding.
//!
//! Accepts raw image bytes (PNG, JPEG, WebP, BMP) and produces a 16-bit
//! RGBA image for the pixel stages. Output is written as 8-bit PNG or
//! JPEG.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{self, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};

use crate::color::Color;
use crate::types::{OutputFormat, PipelineError, PngCompression, ProcessOptions, Rgba64Image};

/// Decode raw image bytes into a 16-bit RGBA image.
///
/// Supports whatever the `image` crate was built to decode. 8-bit
/// channels are widened so that `v` becomes `v * 257`.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<Rgba64Image, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.into_rgba16())
}

/// Clamp a user-supplied JPEG quality into `1..=100`.
///
/// Anything outside that range, including zero and negatives, falls
/// back to [`ProcessOptions::DEFAULT_QUALITY`].
#[must_use]
pub fn normalize_quality(quality: i64) -> u8 {
    u8::try_from(quality)
        .ok()
        .filter(|q| (1..=100).contains(q))
        .unwrap_or(ProcessOptions::DEFAULT_QUALITY)
}

/// Encode `image` in the requested format.
///
/// `quality` applies to JPEG and is clamped into `1..=100`.
/// `compression` applies to PNG.
///
/// # Errors
///
/// Returns [`PipelineError::ImageEncode`] if the encoder rejects the
/// image (for example, zero dimensions).
pub fn encode(
    image: &Rgba64Image,
    format: OutputFormat,
    quality: u8,
    compression: PngCompression,
) -> Result<Vec<u8>, PipelineError> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Png => {
            let rgba = to_rgba8(image);
            let encoder = PngEncoder::new_with_quality(
                &mut buf,
                png_compression_type(compression),
                png::FilterType::Adaptive,
            );
            encoder
                .write_image(
                    rgba.as_raw(),
                    rgba.width(),
                    rgba.height(),
                    ExtendedColorType::Rgba8,
                )
                .map_err(PipelineError::ImageEncode)?;
        }
        OutputFormat::Jpeg => {
            let rgb = flatten_to_rgb8(image);
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
            encoder
                .write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ExtendedColorType::Rgb8,
                )
                .map_err(PipelineError::ImageEncode)?;
        }
    }
    Ok(buf)
}

const fn png_compression_type(compression: PngCompression) -> png::CompressionType {
    match compression {
        PngCompression::Fast => png::CompressionType::Fast,
        PngCompression::Default => png::CompressionType::Default,
        PngCompression::Best => png::CompressionType::Best,
    }
}

/// Narrow a 16-bit channel to 8 bits, inverting the `* 257` widening.
fn narrow(channel: u16) -> u8 {
    u8::try_from(channel / 257).unwrap_or(u8::MAX)
}

fn to_rgba8(image: &Rgba64Image) -> RgbaImage {
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        Rgba([narrow(r), narrow(g), narrow(b), narrow(a)])
    })
}

/// Drop alpha by compositing over black.
///
/// This is alpha premultiplication, so cleared background pixels come
/// out black rather than revealing whatever RGB they held.
fn flatten_to_rgb8(image: &Rgba64Image) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let color = Color::from(*image.get_pixel(x, y));
        Rgb([narrow(color.r), narrow(color.g), narrow(color.b)])
    })
}
