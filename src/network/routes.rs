use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tower::ServiceExt;
use tracing::info;
use uuid::Uuid;

use super::state::AppState;
use crate::detector::ClassificationResult;
use crate::error::ApiError;

/// Multipart field carrying the uploaded picture.
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionResponse {
    pub detected_color: String,
    pub pixel_count: u32,
}

impl From<ClassificationResult> for DetectionResponse {
    fn from(result: ClassificationResult) -> Self {
        Self {
            detected_color: result.label,
            pixel_count: result.pixel_count,
        }
    }
}

#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn detect(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectionResponse>, ApiError> {
    // A body that is not multipart at all carries no image either.
    let mut multipart = multipart.map_err(|_| ApiError::MissingImage)?;
    let image = read_image_field(&mut multipart)
        .await?
        .ok_or(ApiError::MissingImage)?;
    let upload_size = image.len();

    let result = state.classifier.oneshot(image).await?;
    match state.windows.academic_year(&result.label) {
        Some(year) => info!(
            "Detected {} (year {}, {} px) from {} byte upload",
            result.label, year, result.pixel_count, upload_size
        ),
        None => info!(
            "Detected {} ({} px) from {} byte upload",
            result.label, result.pixel_count, upload_size
        ),
    }
    Ok(Json(result.into()))
}

pub async fn invalid_request() -> ApiError {
    ApiError::InvalidRequest
}

async fn read_image_field(multipart: &mut Multipart) -> Result<Option<Bytes>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(IMAGE_FIELD) {
            return Ok(Some(field.bytes().await?));
        }
    }
    Ok(None)
}
