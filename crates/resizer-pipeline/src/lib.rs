//! resizer-pipeline: Pure image processing pipeline (sans-IO).
//!
//! Turns raw image bytes into a re-encoded image through:
//! decode -> optional border trim -> optional background removal ->
//! resize -> encode.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns encoded bytes. HTTP, WebAssembly, and
//! filesystem front ends live in their own crates.

pub mod background;
pub mod codec;
pub mod color;
pub mod dimensions;
pub mod grid;
pub mod pipeline;
pub mod resample;
pub mod trim;
pub mod types;

pub use background::{BackgroundMask, background_mask, remove_background};
pub use codec::normalize_quality;
pub use color::{Color, colors_equal};
pub use dimensions::resolve_target_size;
pub use grid::{PixelGrid, Rect, Region};
pub use pipeline::{Pipeline, PipelineStage};
pub use resample::ResampleFilter;
pub use trim::{TrimBounds, find_trim_bounds, trim};
pub use types::{
    Dimensions, OutputFormat, PipelineError, PngCompression, ProcessOptions, ProcessOutput,
    Rgba64Image,
};

/// Run the full image processing pipeline.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP) and options, then
/// produces the encoded output image.
///
/// # Pipeline steps
///
/// 1. Decode to 16-bit RGBA
/// 2. Optional border trim
/// 3. Optional edge-connected background removal
/// 4. Resize to the resolved target size (always runs)
/// 5. Encode as PNG or JPEG
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
/// Returns [`PipelineError::TooLarge`] if the decoded or target image
/// exceeds `options.max_pixels`.
/// Returns [`PipelineError::ImageEncode`] if the encoder fails.
pub fn process(
    image_bytes: &[u8],
    options: &ProcessOptions,
) -> Result<ProcessOutput, PipelineError> {
    pipeline::decode_stage(image_bytes, options.clone())?.complete()
}
