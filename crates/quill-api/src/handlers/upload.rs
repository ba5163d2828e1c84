//! Upload handlers
//!
//! Responses follow the image-tool contract of block editors:
//! `{"success": 1, "file": {"url": ...}}`.
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use crate::extract::ValidatedJson;
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

/// Multipart field carrying the file
pub const IMAGE_FIELD: &str = "image";

/// Multipart upload form
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// Image file, at most 5 MiB
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// Remote fetch request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FetchUrlRequest {
    #[validate(length(min = 1, message = "url must not be empty"))]
    #[schema(example = "https://example.com/cover.png")]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadedFile {
    pub url: String,
}

/// Upload result
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Always `1` on success
    pub success: u8,
    pub file: UploadedFile,
}

impl UploadResponse {
    fn created(url: String) -> (StatusCode, Json<Self>) {
        (
            StatusCode::CREATED,
            Json(Self {
                success: 1,
                file: UploadedFile { url },
            }),
        )
    }
}

/// Upload an image from a multipart form
///
/// # Responses
///
/// * `201 Created` - Stored; returns the public URL
/// * `400 Bad Request` - Missing field, non-image content or oversized file
/// * `502 Bad Gateway` - Object storage rejected the write
#[utoipa::path(
    post,
    path = "/upload/file",
    tag = "upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "Invalid upload", body = crate::error::ApiError),
        (status = 502, description = "Storage failure", body = crate::error::ApiError),
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let body = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let url = state
            .uploads
            .upload_file(&file_name, &content_type, body)
            .await?;
        return Ok(UploadResponse::created(url));
    }

    Err(AppError::BadRequest(format!(
        "Missing multipart field `{IMAGE_FIELD}`"
    )))
}

/// Fetch a remote file and store it
///
/// # Responses
///
/// * `201 Created` - Stored; returns the public URL
/// * `400 Bad Request` - Invalid URL or oversized file
/// * `502 Bad Gateway` - Remote fetch or storage write failed
#[utoipa::path(
    post,
    path = "/upload/fetchUrl",
    tag = "upload",
    request_body = FetchUrlRequest,
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "Invalid URL", body = crate::error::ApiError),
        (status = 502, description = "Upstream failure", body = crate::error::ApiError),
    )
)]
pub async fn upload_from_url(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<FetchUrlRequest>,
) -> Result<impl IntoResponse, AppError> {
    let url = state.uploads.upload_from_url(request.url.trim()).await?;
    Ok(UploadResponse::created(url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_response_shape() {
        let (status, Json(body)) = UploadResponse::created("http://cdn/x.png".to_string());
        assert_eq!(status, StatusCode::CREATED);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], 1);
        assert_eq!(json["file"]["url"], "http://cdn/x.png");
    }
}
