//! Output size resolution from optional requested width and height.

use crate::types::{Dimensions, PipelineError};

/// Resolve the final output size.
///
/// A requested dimension of `0` means "not set".
///
/// - width only: height follows the source aspect ratio
/// - height only: width follows the source aspect ratio
/// - neither: the original size
/// - both: taken verbatim, the aspect ratio is not preserved
///
/// The derived side is computed in floating point and truncated, then
/// raised to 1 if it would otherwise be 0.
///
/// # Errors
///
/// Returns [`PipelineError::ZeroDimension`] if the original width or
/// height is zero.
pub fn resolve_target_size(
    original: Dimensions,
    requested_width: u32,
    requested_height: u32,
) -> Result<Dimensions, PipelineError> {
    if original.width == 0 || original.height == 0 {
        return Err(PipelineError::ZeroDimension);
    }

    let (width, height) = match (requested_width, requested_height) {
        (0, 0) => (original.width, original.height),
        (width, 0) => (width, scale(original.height, width, original.width)),
        (0, height) => (scale(original.width, height, original.height), height),
        (width, height) => (width, height),
    };

    Ok(Dimensions::new(width, height))
}

/// `length * numerator / denominator`, truncated, at least 1.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale(length: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = f64::from(length) * f64::from(numerator) / f64::from(denominator);
    // `as` saturates; the value is finite and non-negative.
    (scaled as u32).max(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn resolve(ow: u32, oh: u32, rw: u32, rh: u32) -> (u32, u32) {
        let d = resolve_target_size(Dimensions::new(ow, oh), rw, rh).unwrap();
        (d.width, d.height)
    }

    #[test]
    fn width_only_preserves_aspect_ratio() {
        assert_eq!(resolve(200, 100, 100, 0), (100, 50));
    }

    #[test]
    fn height_only_preserves_aspect_ratio() {
        assert_eq!(resolve(200, 100, 0, 25), (50, 25));
    }

    #[test]
    fn neither_is_pass_through() {
        assert_eq!(resolve(200, 100, 0, 0), (200, 100));
    }

    #[test]
    fn both_are_verbatim() {
        assert_eq!(resolve(200, 100, 30, 90), (30, 90));
    }

    #[test]
    fn upscale() {
        assert_eq!(resolve(10, 10, 100, 0), (100, 100));
    }

    #[test]
    fn derived_side_truncates() {
        // 100 * 33 / 300 = 11.0, 101 * 50 / 300 = 16.83 -> 16
        assert_eq!(resolve(300, 100, 33, 0), (33, 11));
        assert_eq!(resolve(300, 101, 50, 0), (50, 16));
        assert_eq!(resolve(3, 7, 0, 2), (1, 2));
    }

    #[test]
    fn derived_side_is_at_least_one() {
        assert_eq!(resolve(1000, 1, 10, 0), (10, 1));
        assert_eq!(resolve(1, 1000, 0, 10), (1, 10));
    }

    #[test]
    fn zero_original_dimension_is_rejected() {
        let result = resolve_target_size(Dimensions::new(0, 10), 5, 0);
        assert!(matches!(result, Err(PipelineError::ZeroDimension)));
        let result = resolve_target_size(Dimensions::new(10, 0), 0, 0);
        assert!(matches!(result, Err(PipelineError::ZeroDimension)));
    }

    proptest! {
        #[test]
        fn resolved_size_is_always_positive(
            ow in 1u32..10_000,
            oh in 1u32..10_000,
            rw in 0u32..10_000,
            rh in 0u32..10_000,
        ) {
            let d = resolve_target_size(Dimensions::new(ow, oh), rw, rh).unwrap();
            prop_assert!(d.width > 0 && d.height > 0);
            if rw > 0 {
                prop_assert_eq!(d.width, rw);
            }
            if rh > 0 {
                prop_assert_eq!(d.height, rh);
            }
        }
    }
}
