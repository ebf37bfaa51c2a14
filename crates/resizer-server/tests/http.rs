//! Router tests driven through `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use http_body_util::BodyExt;
use image::{GenericImageView, Rgba, RgbaImage};
use resizer_server::{AppState, router};
use tower::ServiceExt;

const BOUNDARY: &str = "resizer-test-boundary";

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a [u8]),
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File(name, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"upload.png\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body)
}

async fn post_resize(app: Router, parts: &[Part<'_>]) -> (StatusCode, HeaderMap, Bytes) {
    let request = Request::builder()
        .method("POST")
        .uri("/resize")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    send(app, request).await
}

/// 10x10 white PNG with a red 4x4 block at (3,3)-(6,6).
fn framed_png() -> Vec<u8> {
    let img = RgbaImage::from_fn(10, 10, |x, y| {
        if (3..7).contains(&x) && (3..7).contains(&y) {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn app() -> Router {
    router(AppState::default())
}

fn text(body: &Bytes) -> String {
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn index_serves_upload_form() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, headers, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    let html = text(&body);
    assert!(html.contains(r#"action="/resize""#));
    assert!(html.contains(r#"name="image""#));
    assert!(html.contains(r#"name="remove_background""#));
}

#[tokio::test]
async fn get_on_resize_is_method_not_allowed() {
    let request = Request::builder()
        .uri("/resize")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(text(&body), "Method not allowed");
}

#[tokio::test]
async fn non_multipart_body_fails_to_parse() {
    let request = Request::builder()
        .method("POST")
        .uri("/resize")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("hello"))
        .unwrap();
    let (status, _, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body), "Failed to parse form");
}

#[tokio::test]
async fn missing_image_is_bad_request() {
    let (status, _, body) = post_resize(app(), &[Part::Text("width", "10")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body), "Failed to get image");
}

#[tokio::test]
async fn empty_file_part_counts_as_missing() {
    let (status, _, body) = post_resize(app(), &[Part::File("image", b"")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body), "Failed to get image");
}

#[tokio::test]
async fn undecodable_image_is_bad_request() {
    let (status, _, body) = post_resize(app(), &[Part::File("image", b"not an image")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(text(&body).starts_with("Failed to decode image: "));
}

#[tokio::test]
async fn resize_to_width_returns_png_attachment() {
    let png = framed_png();
    let (status, headers, body) = post_resize(
        app(),
        &[Part::File("image", &png), Part::Text("width", "5")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=resized.png"
    );
    let decoded = image::load_from_memory(&body).unwrap();
    assert_eq!(decoded.dimensions(), (5, 5));
}

#[tokio::test]
async fn jpeg_format_sets_jpeg_headers() {
    let png = framed_png();
    let (status, headers, body) = post_resize(
        app(),
        &[
            Part::File("image", &png),
            Part::Text("format", "jpeg"),
            Part::Text("quality", "60"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=resized.jpg"
    );
    assert_eq!(&body[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn trim_checkbox_crops_to_content() {
    let png = framed_png();
    let (status, _, body) = post_resize(
        app(),
        &[
            Part::Text("trim", "1"),
            Part::File("image", &png),
            Part::Text("width", ""),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let decoded = image::load_from_memory(&body).unwrap();
    assert_eq!(decoded.dimensions(), (4, 4));
}

#[tokio::test]
async fn remove_background_checkbox_clears_corners() {
    let png = framed_png();
    let (status, _, body) = post_resize(
        app(),
        &[
            Part::File("image", &png),
            Part::Text("remove_background", "on"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let decoded = image::load_from_memory(&body).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(0, 0).0[3], 0);
    assert_eq!(decoded.get_pixel(5, 5).0, [255, 0, 0, 255]);
}

#[tokio::test]
async fn pixel_ceiling_is_payload_too_large() {
    let state = AppState {
        max_pixels: Some(50),
        ..AppState::default()
    };
    let png = framed_png();
    let (status, _, body) = post_resize(router(state), &[Part::File("image", &png)]).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(text(&body).contains("exceeds the limit of 50 pixels"));
}

#[tokio::test]
async fn oversized_body_is_payload_too_large() {
    let state = AppState {
        max_upload_bytes: 64,
        ..AppState::default()
    };
    let png = framed_png();
    let (status, _, _) = post_resize(router(state), &[Part::File("image", &png)]).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}
