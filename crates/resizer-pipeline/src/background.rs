//! Background removal: make edge-connected background pixels transparent.
//!
//! The background color is the pixel at the grid origin. Every border
//! pixel of that exact color seeds a breadth-first flood fill over
//! 4-connected neighbors of the same color. Only pixels the fill reaches
//! are cleared, so a background-colored area fully enclosed by other
//! colors survives.

use std::collections::VecDeque;

use image::Rgba;

use crate::color::colors_equal;
use crate::grid::PixelGrid;
use crate::types::Rgba64Image;

/// Which pixels of a grid are edge-connected background.
///
/// Coordinates are relative to the grid origin. Stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundMask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl BackgroundMask {
    fn new(width: u32, height: u32) -> Self {
        let len = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(usize::MAX);
        Self {
            width,
            height,
            cells: vec![false; len],
        }
    }

    /// Mask width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel at `(x, y)`, relative to the grid origin, is background.
    #[must_use]
    pub fn is_background(&self, x: u32, y: u32) -> bool {
        self.cells[self.index(x, y)]
    }

    /// Number of background pixels.
    #[must_use]
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    /// Mark `(x, y)`; returns `false` if it was already marked.
    fn mark(&mut self, x: u32, y: u32) -> bool {
        let index = self.index(x, y);
        !std::mem::replace(&mut self.cells[index], true)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        // Fits: the cell vector was allocated with width * height entries.
        y as usize * self.width as usize + x as usize
    }
}

/// Flood-fill the background from the grid's border.
#[must_use = "returns the background mask"]
pub fn background_mask<G: PixelGrid + ?Sized>(grid: &G) -> BackgroundMask {
    let rect = grid.rect();
    let (width, height) = (rect.width, rect.height);
    let mut mask = BackgroundMask::new(width, height);
    if rect.is_empty() {
        return mask;
    }

    let reference = grid.color(rect.x, rect.y);
    let is_reference = |x: u32, y: u32| colors_equal(grid.color(rect.x + x, rect.y + y), reference);

    let mut queue = VecDeque::new();

    let horizontal = (0..width).flat_map(|x| [(x, 0), (x, height - 1)]);
    let vertical = (0..height).flat_map(|y| [(0, y), (width - 1, y)]);
    for (x, y) in horizontal.chain(vertical) {
        if is_reference(x, y) && mask.mark(x, y) {
            queue.push_back((x, y));
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        for (nx, ny) in neighbors(x, y, width, height) {
            if !mask.is_background(nx, ny) && is_reference(nx, ny) {
                mask.mark(nx, ny);
                queue.push_back((nx, ny));
            }
        }
    }

    mask
}

/// The in-bounds 4-connected neighbors of `(x, y)`.
fn neighbors(x: u32, y: u32, width: u32, height: u32) -> impl Iterator<Item = (u32, u32)> {
    [
        x.checked_sub(1).map(|nx| (nx, y)),
        (x + 1 < width).then_some((x + 1, y)),
        y.checked_sub(1).map(|ny| (x, ny)),
        (y + 1 < height).then_some((x, y + 1)),
    ]
    .into_iter()
    .flatten()
}

/// Copy `grid` into a new image, clearing every pixel marked in `mask`.
///
/// The mask must have the grid's dimensions. Cleared pixels become
/// `(0, 0, 0, 0)`; all others are copied unchanged.
#[must_use = "returns the masked image"]
pub fn apply_mask<G: PixelGrid + ?Sized>(grid: &G, mask: &BackgroundMask) -> Rgba64Image {
    let rect = grid.rect();
    Rgba64Image::from_fn(rect.width, rect.height, |x, y| {
        if mask.is_background(x, y) {
            Rgba([0, 0, 0, 0])
        } else {
            grid.pixel(rect.x + x, rect.y + y)
        }
    })
}

/// Replace edge-connected background pixels with full transparency.
///
/// The output always has the input's dimensions.
#[must_use = "returns the image with its background removed"]
pub fn remove_background<G: PixelGrid + ?Sized>(grid: &G) -> Rgba64Image {
    let mask = background_mask(grid);
    apply_mask(grid, &mask)
}
