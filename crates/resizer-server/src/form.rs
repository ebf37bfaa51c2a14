//! Multipart form fields for `POST /resize`.
//!
//! Field parsing is lenient: a missing or malformed number reads as
//! "not set" and an unknown format reads as PNG.

use axum::body::Bytes;
use axum::extract::Multipart;
use resizer_pipeline::{OutputFormat, PngCompression, ProcessOptions, normalize_quality};

use crate::error::AppError;

/// The fields of a resize request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeForm {
    /// Uploaded file bytes, if any were sent.
    pub image: Option<Bytes>,
    /// Requested width, 0 when unset.
    pub width: u32,
    /// Requested height, 0 when unset.
    pub height: u32,
    /// Output encoding.
    pub format: OutputFormat,
    /// JPEG quality, already normalized into 1..=100.
    pub quality: u8,
    /// Crop uniform or transparent borders.
    pub trim: bool,
    /// Clear edge-connected background.
    pub remove_background: bool,
}

impl Default for ResizeForm {
    fn default() -> Self {
        Self {
            image: None,
            width: 0,
            height: 0,
            format: OutputFormat::Png,
            quality: ProcessOptions::DEFAULT_QUALITY,
            trim: false,
            remove_background: false,
        }
    }
}

impl ResizeForm {
    /// Drain `multipart` into a form.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ParseForm`] if the body is malformed and
    /// [`AppError::UploadTooLarge`] if it exceeds the body limit.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::from_multipart(&e))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            if name == "image" {
                let bytes = field.bytes().await.map_err(|e| AppError::from_multipart(&e))?;
                // Browsers send an empty part when no file was chosen.
                form.image = (!bytes.is_empty()).then_some(bytes);
            } else {
                let value = field.text().await.map_err(|e| AppError::from_multipart(&e))?;
                form.set(&name, &value);
            }
        }
        Ok(form)
    }

    /// Apply one text field. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: &str) {
        match name {
            "width" => self.width = parse_dimension(value),
            "height" => self.height = parse_dimension(value),
            "format" => self.format = OutputFormat::from_name_lenient(value),
            "quality" => {
                self.quality = normalize_quality(value.trim().parse::<i64>().unwrap_or(0));
            }
            "trim" => self.trim = parse_flag(value),
            "remove_background" => self.remove_background = parse_flag(value),
            _ => tracing::debug!(field = name, "ignoring unknown form field"),
        }
    }

    /// Pipeline options for this request.
    #[must_use]
    pub fn options(&self, max_pixels: Option<u64>) -> ProcessOptions {
        ProcessOptions {
            trim: self.trim,
            remove_background: self.remove_background,
            format: self.format,
            quality: self.quality,
            width: self.width,
            height: self.height,
            png_compression: PngCompression::Default,
            max_pixels,
            ..ProcessOptions::default()
        }
    }
}

/// Parse a requested dimension; anything that is not a positive integer
/// is unset.
fn parse_dimension(value: &str) -> u32 {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

/// Checkbox semantics: `1`, `on`, or `true` (any case) is checked.
fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    value == "1" || value.eq_ignore_ascii_case("on") || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_parse_leniently() {
        assert_eq!(parse_dimension("200"), 200);
        assert_eq!(parse_dimension(" 64 "), 64);
        assert_eq!(parse_dimension(""), 0);
        assert_eq!(parse_dimension("abc"), 0);
        assert_eq!(parse_dimension("-5"), 0);
        assert_eq!(parse_dimension("12.5"), 0);
        assert_eq!(parse_dimension("99999999999"), 0);
    }

    #[test]
    fn flags() {
        for on in ["1", "on", "ON", "true", "True"] {
            assert!(parse_flag(on), "{on}");
        }
        for off in ["", "0", "off", "false", "yes"] {
            assert!(!parse_flag(off), "{off}");
        }
    }

    #[test]
    fn set_fields() {
        let mut form = ResizeForm::default();
        form.set("width", "120");
        form.set("height", "x");
        form.set("format", "jpeg");
        form.set("quality", "55");
        form.set("trim", "1");
        form.set("remove_background", "on");
        form.set("unrelated", "whatever");

        assert_eq!(form.width, 120);
        assert_eq!(form.height, 0);
        assert_eq!(form.format, OutputFormat::Jpeg);
        assert_eq!(form.quality, 55);
        assert!(form.trim);
        assert!(form.remove_background);
    }

    #[test]
    fn bad_quality_falls_back_to_default() {
        let mut form = ResizeForm::default();
        form.set("quality", "0");
        assert_eq!(form.quality, 90);
        form.set("quality", "250");
        assert_eq!(form.quality, 90);
        form.set("quality", "soup");
        assert_eq!(form.quality, 90);
    }

    #[test]
    fn unknown_format_is_png() {
        let mut form = ResizeForm::default();
        form.set("format", "gif");
        assert_eq!(form.format, OutputFormat::Png);
    }

    #[test]
    fn options_carry_form_and_limit() {
        let mut form = ResizeForm::default();
        form.set("width", "10");
        form.set("trim", "true");
        let options = form.options(Some(1_000));
        assert_eq!(options.width, 10);
        assert!(options.trim);
        assert!(!options.remove_background);
        assert_eq!(options.max_pixels, Some(1_000));
        assert_eq!(options.png_compression, PngCompression::Default);
    }
}
