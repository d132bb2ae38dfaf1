use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::post,
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

use super::routes::{detect, invalid_request};
use super::state::AppState;
use crate::config::{Configuration, ServerConfig};
use crate::error::AppError;

/// Room for boundaries and part headers on top of the image bytes, so an
/// image at the configured limit still reaches the decoder.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn router(state: AppState, settings: &ServerConfig) -> Router {
    let detect_route = post(detect).fallback(invalid_request);

    let router = Router::new()
        .route("/detect/", detect_route.clone())
        .route("/detect", detect_route)
        .layer(DefaultBodyLimit::max(
            settings
                .max_upload_bytes
                .saturating_add(MULTIPART_OVERHEAD_BYTES),
        ))
        .with_state(state);

    match cors_layer(&settings.cors_allowed_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::POST, Method::OPTIONS])
            .allow_headers(Any),
    )
}

pub struct Server {
    configuration: Configuration,
}

impl Server {
    pub fn new(configuration: Configuration) -> Self {
        Self { configuration }
    }

    pub async fn start(self) -> Result<(), AppError> {
        let address = self.configuration.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|e| AppError::Bind(e, address.clone()))?;
        info!(
            "Color detector listening on http://{} (palette: {:?}, grid: {}x{})",
            address,
            self.configuration.detector.palette,
            self.configuration.detector.target_width,
            self.configuration.detector.target_height
        );

        let app = router(
            AppState::from_config(&self.configuration),
            &self.configuration.server,
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(AppError::Serve)?;

        info!("Color detector stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::ColorClassifier;
    use crate::network::IMAGE_FIELD;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use tower::ServiceExt;

    const BOUNDARY: &str = "color-detector-test-boundary";
    const LIMIT: usize = 1024 * 1024;

    fn settings(max_upload_bytes: usize) -> ServerConfig {
        ServerConfig {
            max_upload_bytes,
            ..ServerConfig::default()
        }
    }

    fn limited_app(max_upload_bytes: usize) -> Router {
        let classifier = ColorClassifier::default().with_input_limit(max_upload_bytes);
        router(AppState::new(classifier, 4), &settings(max_upload_bytes))
    }

    fn app() -> Router {
        limited_app(LIMIT)
    }

    fn png(color: Rgb<u8>) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, color))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode png");
        buf
    }

    fn part(name: &str, bytes: &[u8]) -> Vec<u8> {
        let mut part = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"frame.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .into_bytes();
        part.extend_from_slice(bytes);
        part.extend_from_slice(b"\r\n");
        part
    }

    fn upload(parts: Vec<Vec<u8>>) -> Request<Body> {
        let mut body: Vec<u8> = parts.concat();
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/detect/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn detects_uploaded_color() {
        let response = app()
            .oneshot(upload(vec![part(IMAGE_FIELD, &png(Rgb([0, 0, 200])))]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json(response).await,
            serde_json::json!({ "detected_color": "blue", "pixel_count": 40000 })
        );
    }

    #[tokio::test]
    async fn unmatched_image_reports_unknown() {
        let response = app()
            .oneshot(upload(vec![part(IMAGE_FIELD, &png(Rgb([255, 255, 255])))]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["detected_color"], "unknown");
        assert_eq!(body["pixel_count"], 0);
    }

    #[tokio::test]
    async fn image_field_is_found_among_other_fields() {
        let response = app()
            .oneshot(upload(vec![
                part("note", b"hello"),
                part(IMAGE_FIELD, &png(Rgb([0, 200, 0]))),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["detected_color"], "green");
    }

    #[tokio::test]
    async fn missing_image_field_is_bad_request() {
        let response = app()
            .oneshot(upload(vec![part("photo", &png(Rgb([0, 200, 0])))]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "No image uploaded");
    }

    #[tokio::test]
    async fn non_multipart_body_is_missing_image() {
        let request = Request::builder()
            .method("POST")
            .uri("/detect/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "No image uploaded");
    }

    #[tokio::test]
    async fn corrupt_image_is_bad_request() {
        let response = app()
            .oneshot(upload(vec![part(IMAGE_FIELD, b"\x89PNG\r\n\x1a\nnope")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "Invalid image format");
    }

    #[tokio::test]
    async fn image_exactly_at_the_limit_is_classified() {
        let image = png(Rgb([0, 200, 0]));
        let response = limited_app(image.len())
            .oneshot(upload(vec![part(IMAGE_FIELD, &image)]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["detected_color"], "green");
    }

    #[tokio::test]
    async fn image_over_the_limit_is_payload_too_large() {
        let image = png(Rgb([0, 200, 0]));
        let response = limited_app(image.len() - 1)
            .oneshot(upload(vec![part(IMAGE_FIELD, &image)]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json(response).await["error"], "Image too large");
    }

    #[tokio::test]
    async fn cors_is_off_by_default() {
        let mut request = upload(vec![part(IMAGE_FIELD, &png(Rgb([0, 0, 200])))]);
        request.headers_mut().insert(
            header::ORIGIN,
            HeaderValue::from_static("http://localhost:3000"),
        );
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn configured_origin_passes_preflight() {
        let settings = ServerConfig {
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
            ..settings(LIMIT)
        };
        let app = router(AppState::new(ColorClassifier::default(), 4), &settings);

        let request = Request::builder()
            .method("OPTIONS")
            .uri("/detect/")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("http://localhost:3000"))
        );
    }

    #[tokio::test]
    async fn other_methods_are_invalid_requests() {
        let request = Request::builder()
            .method("GET")
            .uri("/detect/")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "Invalid request");
    }

    #[tokio::test]
    async fn route_without_trailing_slash_also_detects() {
        let mut request = upload(vec![part(IMAGE_FIELD, &png(Rgb([150, 75, 0])))]);
        *request.uri_mut() = "/detect".parse().unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["detected_color"], "brown");
    }
}
