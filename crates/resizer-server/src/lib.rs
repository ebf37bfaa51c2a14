//! resizer-server: HTTP front end for the resizer pipeline.
//!
//! Routes:
//!
//! - `GET /` serves an HTML upload form.
//! - `POST /resize` accepts a multipart form, runs the pipeline on a
//!   blocking thread, and answers with the encoded image as an
//!   attachment.

pub mod config;
pub mod error;
pub mod form;

use axum::Router;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};

pub use config::{Config, init_tracing};
pub use error::AppError;
pub use form::ResizeForm;

const INDEX_HTML: &str = include_str!("index.html");

/// Per-server settings shared by every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppState {
    /// Request body ceiling in bytes.
    pub max_upload_bytes: usize,
    /// Pixel ceiling handed to the pipeline.
    pub max_pixels: Option<u64>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            max_upload_bytes: config::DEFAULT_MAX_UPLOAD_BYTES,
            max_pixels: Some(config::DEFAULT_MAX_PIXELS),
        }
    }
}

impl From<&Config> for AppState {
    fn from(config: &Config) -> Self {
        Self {
            max_upload_bytes: config.max_upload_bytes,
            max_pixels: config.pixel_limit(),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/resize", post(resize).fallback(method_not_allowed))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

async fn resize(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let multipart = multipart.map_err(|rejection| {
        tracing::debug!(%rejection, "not a multipart body");
        AppError::ParseForm
    })?;
    let form = ResizeForm::read(multipart).await?;
    let options = form.options(state.max_pixels);
    let image = form.image.ok_or(AppError::MissingImage)?;

    tracing::info!(
        input_bytes = image.len(),
        width = options.width,
        height = options.height,
        format = %options.format,
        trim = options.trim,
        remove_background = options.remove_background,
        "resize request"
    );

    let output =
        tokio::task::spawn_blocking(move || resizer_pipeline::process(&image, &options)).await??;

    tracing::info!(
        dimensions = %output.dimensions,
        output_bytes = output.size(),
        "resize complete"
    );

    let headers = [
        (header::CONTENT_TYPE, output.mime_type().to_owned()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=resized.{}", output.format.extension()),
        ),
    ];
    Ok((headers, output.data).into_response())
}
