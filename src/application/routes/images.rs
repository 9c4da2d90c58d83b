use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};

use crate::application::errors::{ApiError, AppError};
use crate::application::state::AppState;
use crate::domain::ids::ImageId;
use crate::domain::images::{GenerateImageRequest, GenerateImageResponse, ImageSummary};

/// Stored images never change, so clients may cache them for good.
const IMMUTABLE_CACHE: &str = "public, max-age=31536000, immutable";

/// The body is read as JSON regardless of its declared content type; a body
/// that doesn't parse is treated as an empty prompt and still sent upstream.
#[tracing::instrument(skip_all)]
pub(crate) async fn generate_image(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = GenerateImageRequest::from_body(&body);
    let summary = state.image_service.create(request.prompt()).await?;

    Ok((
        StatusCode::CREATED,
        Json(GenerateImageResponse {
            image_id: summary.id,
        }),
    )
        .into_response())
}

#[tracing::instrument(skip(state))]
pub(crate) async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    // An id that doesn't parse was never issued.
    let id: ImageId = id.parse().map_err(|_| AppError::NotFound)?;
    let image = state.image_service.get(id).await?;

    Ok((
        [
            (CONTENT_TYPE, image.content_type),
            (CACHE_CONTROL, IMMUTABLE_CACHE.to_string()),
        ],
        image.image_data,
    )
        .into_response())
}

#[tracing::instrument(skip(state))]
pub(crate) async fn list_images(
    State(state): State<AppState>,
) -> Result<Json<Vec<ImageSummary>>, ApiError> {
    let images = state.image_service.list().await?;
    Ok(Json(images))
}
