//! Border trimming: crop uniform or transparent edges.
//!
//! The top-left pixel decides the mode once per call. If it is not fully
//! opaque, every pixel with zero alpha is trimmable. Otherwise every pixel
//! exactly equal to it is trimmable. Each edge is then scanned inward
//! until a row or column with at least one pixel to keep is found.
//!
//! An image where nothing is worth keeping is returned as-is rather than
//! collapsed to zero size.

use crate::color::{Color, colors_equal};
use crate::grid::{PixelGrid, Rect};
use crate::types::Rgba64Image;

/// The rectangle kept by a trim, in the grid's coordinate space.
pub type TrimBounds = Rect;

/// What makes a pixel trimmable, fixed for the whole call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrimMode {
    /// Only zero-alpha pixels are trimmable.
    Transparency,
    /// Only pixels equal to the reference color are trimmable.
    SolidColor(Color),
}

impl TrimMode {
    const fn detect(reference: Color) -> Self {
        if reference.is_opaque() {
            Self::SolidColor(reference)
        } else {
            Self::Transparency
        }
    }

    const fn is_trimmable(self, color: Color) -> bool {
        match self {
            Self::Transparency => color.is_transparent(),
            Self::SolidColor(reference) => colors_equal(color, reference),
        }
    }
}

/// Find the smallest rectangle containing every non-trimmable pixel.
///
/// Returns the grid's own bounds when there is nothing to trim, including
/// the case where every pixel is trimmable.
#[must_use]
pub fn find_trim_bounds<G: PixelGrid + ?Sized>(grid: &G) -> TrimBounds {
    let bounds = grid.rect();
    if bounds.is_empty() {
        return bounds;
    }

    let (min_x, min_y) = (bounds.left(), bounds.top());
    let (max_x, max_y) = (bounds.right(), bounds.bottom());

    let mode = TrimMode::detect(grid.color(min_x, min_y));
    let keep = |x: u32, y: u32| !mode.is_trimmable(grid.color(x, y));

    let row_has_content = |y: u32| (min_x..max_x).any(|x| keep(x, y));
    let top = (min_y..max_y).find(|&y| row_has_content(y)).unwrap_or(min_y);
    let bottom = (top..max_y)
        .rev()
        .find(|&y| row_has_content(y))
        .map_or(max_y, |y| y + 1);

    // Columns are only scanned across the rows that survived.
    let column_has_content = |x: u32| (top..bottom).any(|y| keep(x, y));
    let left = (min_x..max_x)
        .find(|&x| column_has_content(x))
        .unwrap_or(min_x);
    let right = (left..max_x)
        .rev()
        .find(|&x| column_has_content(x))
        .map_or(max_x, |x| x + 1);

    Rect::from_edges(left, top, right, bottom)
}

/// Trim uniform or transparent borders.
///
/// When nothing can be trimmed the input buffer is returned untouched,
/// without copying. Otherwise the kept rectangle is copied into a new
/// image starting at `(0, 0)`.
#[must_use = "returns the trimmed image"]
pub fn trim(image: Rgba64Image) -> Rgba64Image {
    let bounds = find_trim_bounds(&image);
    if bounds == image.rect() {
        return image;
    }
    crop(&image, bounds)
}

/// Copy `rect` out of `grid` into a new image starting at `(0, 0)`.
///
/// `rect` must lie within the grid's bounds.
#[must_use = "returns the cropped image"]
pub fn crop<G: PixelGrid + ?Sized>(grid: &G, rect: Rect) -> Rgba64Image {
    Rgba64Image::from_fn(rect.width, rect.height, |x, y| {
        grid.pixel(rect.x + x, rect.y + y)
    })
}
