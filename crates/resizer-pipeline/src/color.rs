//! Exact color comparison at 16-bit precision.
//!
//! Both border trimming and background removal decide membership by
//! comparing a pixel against a single reference color with no tolerance.
//! Colors are compared after alpha premultiplication, so every fully
//! transparent pixel is the same color no matter what RGB it hides.

use image::Rgba;

/// An RGBA color with alpha-premultiplied 16-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red, premultiplied.
    pub r: u16,
    /// Green, premultiplied.
    pub g: u16,
    /// Blue, premultiplied.
    pub b: u16,
    /// Alpha.
    pub a: u16,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Create a color from already premultiplied channels.
    #[must_use]
    pub const fn new(r: u16, g: u16, b: u16, a: u16) -> Self {
        Self { r, g, b, a }
    }

    /// Whether alpha is at its maximum.
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.a == u16::MAX
    }

    /// Whether alpha is zero.
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Undo premultiplication, rounding to nearest.
    ///
    /// Channels above alpha are clamped. Fully transparent colors come
    /// back as transparent black.
    #[must_use]
    pub fn to_straight(self) -> Rgba<u16> {
        Rgba([
            unpremultiply(self.r, self.a),
            unpremultiply(self.g, self.a),
            unpremultiply(self.b, self.a),
            self.a,
        ])
    }
}

impl From<Rgba<u16>> for Color {
    fn from(pixel: Rgba<u16>) -> Self {
        let [r, g, b, a] = pixel.0;
        Self::new(
            premultiply(r, a),
            premultiply(g, a),
            premultiply(b, a),
            a,
        )
    }
}

/// Scale `channel` by `alpha / 65535`, truncating.
fn premultiply(channel: u16, alpha: u16) -> u16 {
    let scaled = u32::from(channel) * u32::from(alpha) / u32::from(u16::MAX);
    u16::try_from(scaled).unwrap_or(u16::MAX)
}

impl From<Color> for Rgba<u16> {
    /// Premultiplied channels as a pixel.
    fn from(color: Color) -> Self {
        Self([color.r, color.g, color.b, color.a])
    }
}

/// Scale `channel` by `65535 / alpha`, rounding and saturating.
fn unpremultiply(channel: u16, alpha: u16) -> u16 {
    if alpha == 0 {
        return 0;
    }
    let alpha = u32::from(alpha);
    let scaled = (u32::from(channel) * u32::from(u16::MAX) + alpha / 2) / alpha;
    u16::try_from(scaled).unwrap_or(u16::MAX)
}

/// Exact equality on all four channels.
#[must_use]
pub const fn colors_equal(c1: Color, c2: Color) -> bool {
    c1.r == c2.r && c1.g == c2.g && c1.b == c2.b && c1.a == c2.a
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Color {
        let widen = |v: u8| u16::from(v) * 257;
        Color::from(Rgba([widen(r), widen(g), widen(b), widen(a)]))
    }

    #[test]
    fn same_white() {
        assert!(colors_equal(
            rgba8(255, 255, 255, 255),
            rgba8(255, 255, 255, 255)
        ));
    }

    #[test]
    fn white_vs_black() {
        assert!(!colors_equal(rgba8(255, 255, 255, 255), rgba8(0, 0, 0, 255)));
    }

    #[test]
    fn single_channel_difference_is_unequal() {
        assert!(!colors_equal(
            rgba8(255, 128, 64, 255),
            rgba8(255, 128, 65, 255)
        ));
    }

    #[test]
    fn alpha_difference_is_unequal() {
        assert!(!colors_equal(
            rgba8(10, 20, 30, 255),
            rgba8(10, 20, 30, 254)
        ));
    }

    #[test]
    fn transparent_pixels_compare_equal_regardless_of_rgb() {
        assert!(colors_equal(rgba8(0, 0, 0, 0), rgba8(255, 12, 99, 0)));
        assert!(colors_equal(rgba8(255, 12, 99, 0), Color::TRANSPARENT));
    }

    #[test]
    fn opaque_pixels_are_not_altered_by_premultiplication() {
        let c = Color::from(Rgba([1000, 2000, 65535, u16::MAX]));
        assert_eq!(c, Color::new(1000, 2000, 65535, u16::MAX));
        assert!(c.is_opaque());
    }

    #[test]
    fn half_alpha_scales_channels() {
        let c = Color::from(Rgba([65535, 0, 0, 32768]));
        assert_eq!(c.r, 32768);
        assert!(!c.is_opaque());
        assert!(!c.is_transparent());
    }

    #[test]
    fn straight_round_trip_for_opaque_colors() {
        let pixel = Rgba([1000, 2000, 65535, u16::MAX]);
        assert_eq!(Color::from(pixel).to_straight(), pixel);
    }

    #[test]
    fn straight_restores_full_red_under_partial_alpha() {
        let c = Color::from(Rgba([65535, 0, 0, 16962]));
        assert_eq!(c.r, 16962);
        assert_eq!(c.to_straight(), Rgba([65535, 0, 0, 16962]));
    }

    #[test]
    fn straight_clamps_channels_above_alpha() {
        let c = Color::new(40000, 0, 0, 20000);
        assert_eq!(c.to_straight().0[0], u16::MAX);
    }

    #[test]
    fn straight_of_transparent_is_transparent_black() {
        assert_eq!(Color::new(5, 6, 7, 0).to_straight(), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn full_precision_is_respected() {
        // Two colors that collapse to the same 8-bit value stay distinct.
        let a = Color::from(Rgba([1000, 0, 0, u16::MAX]));
        let b = Color::from(Rgba([1001, 0, 0, u16::MAX]));
        assert!(!colors_equal(a, b));
    }
}
