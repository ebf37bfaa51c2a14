//! Shared types for the resizer image pipeline.

use std::fmt;

use image::error::{DecodingError, EncodingError, ImageFormatHint};
use serde::{Deserialize, Serialize};

use crate::resample::ResampleFilter;

/// 16-bit RGBA image buffer used by every pipeline stage.
///
/// 8-bit sources are widened on decode. Front ends can name the type
/// without depending on `image` directly.
pub type Rgba64Image = image::ImageBuffer<image::Rgba<u16>, Vec<u16>>;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create a new dimensions pair.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Dimensions of an in-memory image.
    #[must_use]
    pub fn of(image: &Rgba64Image) -> Self {
        Self::new(image.width(), image.height())
    }

    /// Total number of pixels.
    #[must_use]
    pub fn pixel_count(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Encoded output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG, 8-bit RGBA.
    #[default]
    Png,
    /// Lossy JPEG, 8-bit RGB. Transparency is flattened onto black.
    #[serde(alias = "jpg")]
    Jpeg,
}

impl OutputFormat {
    /// Parse a user-supplied format name.
    ///
    /// Anything other than `jpeg`/`jpg` (case-insensitive) selects PNG,
    /// including the empty string.
    #[must_use]
    pub fn from_name_lenient(name: &str) -> Self {
        let name = name.trim();
        if name.eq_ignore_ascii_case("jpeg") || name.eq_ignore_ascii_case("jpg") {
            Self::Jpeg
        } else {
            Self::Png
        }
    }

    /// MIME type of the encoded bytes.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Conventional file extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => f.write_str("png"),
            Self::Jpeg => f.write_str("jpeg"),
        }
    }
}

/// PNG deflate effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    /// Fastest encoding, largest files.
    Fast,
    /// Encoder default.
    #[default]
    Default,
    /// Slowest encoding, smallest files.
    Best,
}

impl PngCompression {
    /// Bucket a single 1-100 quality knob into a compression level.
    ///
    /// Lower quality asks for a smaller file: 1-33 is [`Best`](Self::Best),
    /// 34-66 is [`Default`](Self::Default), 67-100 is [`Fast`](Self::Fast).
    #[must_use]
    pub const fn from_quality(quality: u8) -> Self {
        match quality {
            0..=33 => Self::Best,
            34..=66 => Self::Default,
            _ => Self::Fast,
        }
    }
}

impl fmt::Display for PngCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => f.write_str("fast"),
            Self::Default => f.write_str("default"),
            Self::Best => f.write_str("best"),
        }
    }
}

/// Options controlling a single pipeline run.
///
/// A `width` or `height` of zero means "not requested". When only one of
/// them is set the other follows the source aspect ratio; see
/// [`resolve_target_size`](crate::dimensions::resolve_target_size).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessOptions {
    /// Crop uniform or transparent borders before anything else.
    pub trim: bool,

    /// Make edge-connected background pixels transparent.
    pub remove_background: bool,

    /// Output encoding.
    pub format: OutputFormat,

    /// JPEG quality, 1-100. Ignored for PNG.
    pub quality: u8,

    /// Requested output width, 0 when unset.
    pub width: u32,

    /// Requested output height, 0 when unset.
    pub height: u32,

    /// PNG deflate effort. Ignored for JPEG.
    pub png_compression: PngCompression,

    /// Resampling kernel for the final resize.
    pub filter: ResampleFilter,

    /// Reject decoded or target images above this many pixels.
    pub max_pixels: Option<u64>,
}

impl ProcessOptions {
    /// Default JPEG quality.
    pub const DEFAULT_QUALITY: u8 = 90;
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            trim: false,
            remove_background: false,
            format: OutputFormat::default(),
            quality: Self::DEFAULT_QUALITY,
            width: 0,
            height: 0,
            png_compression: PngCompression::default(),
            filter: ResampleFilter::default(),
            max_pixels: None,
        }
    }
}

/// Result of a full pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Encoded image bytes.
    pub data: Vec<u8>,
    /// Format of `data`.
    pub format: OutputFormat,
    /// Dimensions of the encoded image.
    pub dimensions: Dimensions,
}

impl ProcessOutput {
    /// MIME type of the encoded bytes.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Size of the encoded bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Errors that can occur during pipeline processing.
///
/// The pixel algorithms themselves cannot fail; every variant belongs to
/// decoding, encoding, or the limits a caller places around them.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// An image with zero width or height reached size resolution.
    #[error("image has zero width or height")]
    ZeroDimension,

    /// The decoded or requested image exceeds the configured pixel ceiling.
    #[error("image of {width}x{height} exceeds the limit of {limit} pixels")]
    TooLarge {
        /// Offending width.
        width: u32,
        /// Offending height.
        height: u32,
        /// Configured ceiling.
        limit: u64,
    },

    /// Failed to encode the output image.
    #[error("failed to encode image: {0}")]
    ImageEncode(#[source] image::ImageError),

    /// Options could not be parsed or are inconsistent.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

/// Serde-compatible proxy for `PipelineError`.
///
/// `image::ImageError` does not implement serde, so the decode and
/// encode variants carry their `Display` string. Deserializing rebuilds
/// an `ImageError` with an unknown format hint around that message.
#[derive(Serialize, Deserialize)]
enum PipelineErrorProxy {
    ImageDecode(String),
    EmptyInput,
    ZeroDimension,
    TooLarge { width: u32, height: u32, limit: u64 },
    ImageEncode(String),
    InvalidOptions(String),
}

impl Serialize for PipelineError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let proxy = match self {
            Self::ImageDecode(e) => PipelineErrorProxy::ImageDecode(e.to_string()),
            Self::EmptyInput => PipelineErrorProxy::EmptyInput,
            Self::ZeroDimension => PipelineErrorProxy::ZeroDimension,
            Self::TooLarge {
                width,
                height,
                limit,
            } => PipelineErrorProxy::TooLarge {
                width: *width,
                height: *height,
                limit: *limit,
            },
            Self::ImageEncode(e) => PipelineErrorProxy::ImageEncode(e.to_string()),
            Self::InvalidOptions(s) => PipelineErrorProxy::InvalidOptions(s.clone()),
        };
        proxy.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PipelineError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let proxy = PipelineErrorProxy::deserialize(deserializer)?;
        Ok(match proxy {
            PipelineErrorProxy::ImageDecode(msg) => Self::ImageDecode(image::ImageError::Decoding(
                DecodingError::new(ImageFormatHint::Unknown, msg),
            )),
            PipelineErrorProxy::EmptyInput => Self::EmptyInput,
            PipelineErrorProxy::ZeroDimension => Self::ZeroDimension,
            PipelineErrorProxy::TooLarge {
                width,
                height,
                limit,
            } => Self::TooLarge {
                width,
                height,
                limit,
            },
            PipelineErrorProxy::ImageEncode(msg) => Self::ImageEncode(image::ImageError::Encoding(
                EncodingError::new(ImageFormatHint::Unknown, msg),
            )),
            PipelineErrorProxy::InvalidOptions(s) => Self::InvalidOptions(s),
        })
    }
}
