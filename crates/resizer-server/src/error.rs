//! Request failures and their HTTP status codes.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use resizer_pipeline::PipelineError;
use tokio::task::JoinError;

/// Everything that can go wrong while serving `POST /resize`.
///
/// The `Display` text is sent to the client as the plain-text body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The body was not a readable multipart form.
    #[error("Failed to parse form")]
    ParseForm,

    /// The body exceeded the configured upload limit.
    #[error("Request body exceeds the upload limit")]
    UploadTooLarge,

    /// No non-empty `image` field was sent.
    #[error("Failed to get image")]
    MissingImage,

    /// The upload could not be decoded as an image.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// The decoded or requested image exceeds the pixel ceiling.
    #[error("{0}")]
    TooLarge(PipelineError),

    /// The pipeline rejected the request for another reason.
    #[error("Invalid request: {0}")]
    Invalid(PipelineError),

    /// The encoder failed.
    #[error("Failed to encode image")]
    Encode(#[source] PipelineError),

    /// The blocking pipeline task panicked or was cancelled.
    #[error("Image processing failed")]
    Task(#[from] JoinError),
}

impl AppError {
    /// Classify a multipart read failure.
    pub(crate) fn from_multipart(err: &MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::UploadTooLarge
        } else {
            Self::ParseForm
        }
    }

    /// HTTP status for this failure.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::ParseForm | Self::MissingImage | Self::Decode(_) | Self::Invalid(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::UploadTooLarge | Self::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Encode(_) | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::ImageDecode(source) => Self::Decode(source.to_string()),
            PipelineError::EmptyInput => Self::Decode(err.to_string()),
            PipelineError::TooLarge { .. } => Self::TooLarge(err),
            PipelineError::ImageEncode(_) => Self::Encode(err),
            PipelineError::ZeroDimension | PipelineError::InvalidOptions(_) => Self::Invalid(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, %status, "request failed");
        } else {
            tracing::warn!(error = %self, %status, "request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use image::error::{DecodingError, EncodingError, ImageFormatHint};

    use super::*;

    fn decode_error(msg: &str) -> PipelineError {
        PipelineError::ImageDecode(image::ImageError::Decoding(DecodingError::new(
            ImageFormatHint::Unknown,
            msg,
        )))
    }

    #[test]
    fn decode_failure_is_bad_request_with_detail() {
        let err = AppError::from(decode_error("bad magic"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let text = err.to_string();
        assert!(text.starts_with("Failed to decode image: "), "{text}");
        assert!(text.contains("bad magic"), "{text}");
    }

    #[test]
    fn empty_input_is_a_decode_failure() {
        let err = AppError::from(PipelineError::EmptyInput);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Failed to decode image: input image data is empty"
        );
    }

    #[test]
    fn too_large_is_payload_too_large() {
        let err = AppError::from(PipelineError::TooLarge {
            width: 10,
            height: 10,
            limit: 50,
        });
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.to_string(), "image of 10x10 exceeds the limit of 50 pixels");
    }

    #[test]
    fn encode_failure_is_internal_error() {
        let source = image::ImageError::Encoding(EncodingError::new(
            ImageFormatHint::Unknown,
            "disk on fire",
        ));
        let err = AppError::from(PipelineError::ImageEncode(source));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to encode image");
    }

    #[test]
    fn form_errors_use_fixed_messages() {
        assert_eq!(AppError::ParseForm.to_string(), "Failed to parse form");
        assert_eq!(AppError::MissingImage.to_string(), "Failed to get image");
        assert_eq!(AppError::MissingImage.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::UploadTooLarge.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }
}
