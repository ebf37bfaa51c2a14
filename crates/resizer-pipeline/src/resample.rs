//! Resampling to the resolved output size.
//!
//! The final resize always runs, even when the target equals the source
//! size, so every output passes through the same kernel.

use std::fmt;

use image::Rgba;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::types::{Dimensions, Rgba64Image};

/// Resampling kernel used for the final resize.
///
/// Ordered from fastest/lowest-quality to slowest/highest-quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResampleFilter {
    /// Nearest-neighbor: fastest, blocky artifacts.
    Nearest,
    /// Bilinear interpolation: fast, decent quality.
    Triangle,
    /// Bicubic (Catmull-Rom): moderate speed, good quality.
    #[default]
    CatmullRom,
    /// Gaussian: moderate speed, smooth output.
    Gaussian,
    /// Lanczos with 3 lobes: slowest, sharpest.
    Lanczos3,
}

impl ResampleFilter {
    /// Convert to the `image` crate's `FilterType`.
    const fn to_image_filter(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nearest => f.write_str("Nearest"),
            Self::Triangle => f.write_str("Triangle"),
            Self::CatmullRom => f.write_str("CatmullRom"),
            Self::Gaussian => f.write_str("Gaussian"),
            Self::Lanczos3 => f.write_str("Lanczos3"),
        }
    }
}

/// Resample `image` to exactly `target`, ignoring aspect ratio.
///
/// `target` should come from
/// [`resolve_target_size`](crate::dimensions::resolve_target_size), which
/// already applied the aspect-ratio policy.
///
/// Filtering happens on premultiplied color, so transparent pixels
/// contribute no color to their neighbors.
#[must_use = "returns the resized image"]
pub fn resize(image: &Rgba64Image, target: Dimensions, filter: ResampleFilter) -> Rgba64Image {
    let mut premultiplied = image.clone();
    for pixel in premultiplied.pixels_mut() {
        *pixel = Rgba::from(Color::from(*pixel));
    }

    let mut resized = image::imageops::resize(
        &premultiplied,
        target.width,
        target.height,
        filter.to_image_filter(),
    );
    for pixel in resized.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        *pixel = Color::new(r, g, b, a).to_straight();
    }
    resized
}
