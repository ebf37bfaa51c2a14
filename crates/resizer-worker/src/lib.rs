//! Browser entry point for the resizer pipeline.
//!
//! This crate compiles to a WASM module exposing two functions to
//! JavaScript:
//!
//! - `processImage(imageData, width, height, trim, removeBackground,
//!   format, quality)` takes positional arguments.
//! - `processImageJson(imageData, optionsJson)` takes a JSON-serialized
//!   `ProcessOptions`.
//!
//! Both run the pipeline synchronously and return a plain object. On
//! success it holds:
//! - `data`: `Uint8Array` with the encoded image
//! - `mimeType`: `"image/png"` or `"image/jpeg"`
//! - `width`, `height`: output dimensions
//! - `size`: byte length of `data`
//!
//! On failure it holds:
//! - `error`: human-readable message
//! - `errorJson`: JSON-serialized `PipelineError`

use resizer_pipeline::{
    OutputFormat, PipelineError, ProcessOptions, ProcessOutput, normalize_quality,
};
use wasm_bindgen::prelude::*;

/// Called automatically when the WASM module is instantiated.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Resize with positional options.
///
/// Zero or negative `width`/`height` mean "not set". `quality` outside
/// 1..=100 falls back to 90. Unknown `format` strings select PNG.
#[wasm_bindgen(js_name = processImage)]
#[allow(clippy::fn_params_excessive_bools)]
#[must_use]
pub fn process_image(
    image_data: &[u8],
    width: i32,
    height: i32,
    trim: bool,
    remove_background: bool,
    format: &str,
    quality: i32,
) -> JsValue {
    let options = options_from_args(width, height, trim, remove_background, format, quality);
    respond(resizer_pipeline::process(image_data, &options))
}

/// Resize with a JSON-serialized `ProcessOptions`.
///
/// Missing fields take their defaults.
#[wasm_bindgen(js_name = processImageJson)]
#[must_use]
pub fn process_image_json(image_data: &[u8], options_json: &str) -> JsValue {
    respond(
        parse_options(options_json)
            .and_then(|options| resizer_pipeline::process(image_data, &options)),
    )
}

/// Build pipeline options from the positional JavaScript arguments.
#[allow(clippy::fn_params_excessive_bools)]
#[must_use]
pub fn options_from_args(
    width: i32,
    height: i32,
    trim: bool,
    remove_background: bool,
    format: &str,
    quality: i32,
) -> ProcessOptions {
    ProcessOptions {
        trim,
        remove_background,
        format: OutputFormat::from_name_lenient(format),
        quality: normalize_quality(i64::from(quality)),
        width: requested(width),
        height: requested(height),
        ..ProcessOptions::default()
    }
}

/// Parse a JSON options object, normalizing the quality.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidOptions`] if `json` does not describe
/// a `ProcessOptions`.
pub fn parse_options(json: &str) -> Result<ProcessOptions, PipelineError> {
    let mut options: ProcessOptions = serde_json::from_str(json)
        .map_err(|e| PipelineError::InvalidOptions(format!("failed to parse options: {e}")))?;
    options.quality = normalize_quality(i64::from(options.quality));
    Ok(options)
}

fn requested(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Convert a pipeline result into the object handed back to JavaScript.
#[allow(clippy::cast_precision_loss)]
fn respond(result: Result<ProcessOutput, PipelineError>) -> JsValue {
    let response = js_sys::Object::new();
    let set = |key: &str, val: &JsValue| {
        let _ = js_sys::Reflect::set(&response, &JsValue::from_str(key), val);
    };

    match result {
        Ok(output) => {
            set("data", &js_sys::Uint8Array::from(output.data.as_slice()));
            set("mimeType", &JsValue::from_str(output.mime_type()));
            set("width", &JsValue::from_f64(f64::from(output.dimensions.width)));
            set(
                "height",
                &JsValue::from_f64(f64::from(output.dimensions.height)),
            );
            set("size", &JsValue::from_f64(output.size() as f64));
        }
        Err(err) => {
            let message = err.to_string();
            web_sys::console::error_1(&JsValue::from_str(&message));
            set("error", &JsValue::from_str(&message));
            if let Ok(json) = serde_json::to_string(&err) {
                set("errorJson", &JsValue::from_str(&json));
            }
        }
    }

    response.into()
}
