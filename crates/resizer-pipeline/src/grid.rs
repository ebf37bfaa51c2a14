//! Uniform read access to rectangular RGBA pixel grids.
//!
//! The pixel algorithms only need to know where a grid lives and what
//! color sits at a coordinate. [`PixelGrid`] provides exactly that, for
//! whole images (origin `(0, 0)`) and for [`Region`] views that keep
//! their parent's coordinate space.

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::types::{Dimensions, Rgba64Image};

/// An axis-aligned rectangle. Right and bottom edges are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: u32,
    /// Top edge (inclusive).
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Create a rectangle from its origin and size.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from its four edges.
    ///
    /// `right` and `bottom` are exclusive and must not be smaller than
    /// `left` and `top`; a smaller value collapses that axis to zero.
    #[must_use]
    pub const fn from_edges(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self::new(
            left,
            top,
            right.saturating_sub(left),
            bottom.saturating_sub(top),
        )
    }

    /// Left edge (inclusive).
    #[must_use]
    pub const fn left(self) -> u32 {
        self.x
    }

    /// Top edge (inclusive).
    #[must_use]
    pub const fn top(self) -> u32 {
        self.y
    }

    /// Right edge (exclusive).
    #[must_use]
    pub const fn right(self) -> u32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[must_use]
    pub const fn bottom(self) -> u32 {
        self.y + self.height
    }

    /// Whether the rectangle covers no pixels.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width and height.
    #[must_use]
    pub const fn dimensions(self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Whether `(x, y)` lies inside.
    #[must_use]
    pub const fn contains(self, x: u32, y: u32) -> bool {
        x >= self.left() && x < self.right() && y >= self.top() && y < self.bottom()
    }

    /// Whether `other` lies entirely inside.
    #[must_use]
    pub const fn contains_rect(self, other: Self) -> bool {
        other.left() >= self.left()
            && other.top() >= self.top()
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Read-only access to a rectangle of RGBA pixels.
///
/// Coordinates passed to [`pixel`](Self::pixel) are absolute: they must
/// lie within [`rect`](Self::rect), which need not start at `(0, 0)`.
pub trait PixelGrid {
    /// The grid's bounds in its own coordinate space.
    fn rect(&self) -> Rect;

    /// The raw pixel at `(x, y)`.
    ///
    /// Out-of-bounds coordinates are a caller bug and may panic.
    fn pixel(&self, x: u32, y: u32) -> Rgba<u16>;

    /// The pixel at `(x, y)` as a comparable [`Color`].
    fn color(&self, x: u32, y: u32) -> Color {
        Color::from(self.pixel(x, y))
    }
}

impl PixelGrid for Rgba64Image {
    fn rect(&self) -> Rect {
        Rect::new(0, 0, self.width(), self.height())
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba<u16> {
        *self.get_pixel(x, y)
    }
}

/// A borrowed sub-rectangle of another grid.
///
/// The view shares the parent's storage and coordinate space: its origin
/// is wherever the rectangle starts in the parent.
#[derive(Debug)]
pub struct Region<'a, G: PixelGrid + ?Sized = Rgba64Image> {
    parent: &'a G,
    rect: Rect,
}

impl<'a, G: PixelGrid + ?Sized> Region<'a, G> {
    /// Create a view of `rect` inside `parent`.
    ///
    /// Returns `None` if `rect` is not fully contained in the parent.
    #[must_use]
    pub fn new(parent: &'a G, rect: Rect) -> Option<Self> {
        parent
            .rect()
            .contains_rect(rect)
            .then_some(Self { parent, rect })
    }

    /// The grid this view borrows from.
    #[must_use]
    pub const fn parent(&self) -> &'a G {
        self.parent
    }
}

impl<G: PixelGrid + ?Sized> Clone for Region<'_, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G: PixelGrid + ?Sized> Copy for Region<'_, G> {}

impl<G: PixelGrid + ?Sized> PixelGrid for Region<'_, G> {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba<u16> {
        self.parent.pixel(x, y)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges() {
        let r = Rect::new(2, 3, 4, 5);
        assert_eq!((r.left(), r.top(), r.right(), r.bottom()), (2, 3, 6, 8));
        assert_eq!(Rect::from_edges(2, 3, 6, 8), r);
    }

    #[test]
    fn rect_from_inverted_edges_is_empty() {
        let r = Rect::from_edges(5, 5, 3, 9);
        assert!(r.is_empty());
    }

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::new(1, 1, 2, 2);
        assert!(r.contains(1, 1));
        assert!(r.contains(2, 2));
        assert!(!r.contains(3, 2));
        assert!(!r.contains(0, 1));
    }

    #[test]
    fn image_grid_starts_at_origin() {
        let img = Rgba64Image::new(4, 3);
        assert_eq!(img.rect(), Rect::new(0, 0, 4, 3));
    }

    #[test]
    fn region_uses_parent_coordinates() {
        let img = Rgba64Image::from_fn(6, 6, |x, y| {
            let v = u16::try_from(x * 10 + y).unwrap();
            Rgba([v, 0, 0, u16::MAX])
        });
        let region = Region::new(&img, Rect::new(2, 3, 3, 2)).unwrap();
        assert_eq!(region.rect(), Rect::new(2, 3, 3, 2));
        assert_eq!(region.pixel(4, 4).0[0], 44);
        assert_eq!(region.color(2, 3).r, 23);
    }

    #[test]
    fn region_outside_parent_is_rejected() {
        let img = Rgba64Image::new(4, 4);
        assert!(Region::new(&img, Rect::new(2, 2, 3, 1)).is_none());
        assert!(Region::new(&img, Rect::new(0, 0, 4, 4)).is_some());
    }

    #[test]
    fn region_of_region() {
        let img = Rgba64Image::new(10, 10);
        let outer = Region::new(&img, Rect::new(2, 2, 6, 6)).unwrap();
        assert!(Region::new(&outer, Rect::new(3, 3, 2, 2)).is_some());
        assert!(Region::new(&outer, Rect::new(0, 0, 2, 2)).is_none());
    }
}
