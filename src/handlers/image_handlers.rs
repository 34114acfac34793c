//! HTTP handlers for image uploads and the image inventory.

use crate::{errors::AppError, models::image::ImageInfo, routes::routes::AppState};
use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct UploadImageResponse {
    pub success: bool,
    pub message: String,
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteImageReq {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteImageResponse {
    pub message: String,
}

/// POST `/api/upload-image` — multipart upload of a single `image` field.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(err.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::bad_request(err.to_string()))?;

        let saved = state.images.upload(&file_name, &content_type, bytes).await?;
        return Ok((
            StatusCode::CREATED,
            Json(UploadImageResponse {
                success: true,
                message: "Image uploaded successfully.".to_string(),
                url: saved.url,
                filename: saved.path,
            }),
        ));
    }

    Err(AppError::bad_request("an `image` file field is required"))
}

/// GET `/api/images` — list all uploaded images.
pub async fn list_images(
    State(state): State<AppState>,
) -> Result<Json<Vec<ImageInfo>>, AppError> {
    Ok(Json(state.images.list().await?))
}

/// DELETE `/api/images` — remove an image by its public URL.
pub async fn delete_image(
    State(state): State<AppState>,
    Json(req): Json<DeleteImageReq>,
) -> Result<impl IntoResponse, AppError> {
    let url = match req.url {
        Some(url) if !url.trim().is_empty() => url,
        _ => return Err(AppError::bad_request("`url` is required")),
    };

    state.images.delete(&url).await?;
    Ok(Json(DeleteImageResponse {
        message: "Image deleted successfully.".to_string(),
    }))
}
