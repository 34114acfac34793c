//! HTTP handlers for the document CRUD API.
//!
//! Field presence is validated here so a missing or empty required field
//! answers 400; everything past the boundary is the repository's business.

use crate::{
    errors::AppError,
    models::document::DocumentSummary,
    routes::routes::AppState,
    services::document_service::NewDocument,
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DocumentQuery {
    pub code: Option<String>,
}

/// Body for `POST /api/markdown`. Everything optional at the serde level so
/// missing fields produce a 400 from our validation, not a 422 from axum.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
}

/// Body for `PUT /api/markdown`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentReq {
    pub original_code: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
}

/// Body for `DELETE /api/markdown`.
#[derive(Debug, Deserialize)]
pub struct DeleteDocumentReq {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDocumentResponse {
    pub message: String,
    pub file_name: String,
    pub code: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteDocumentResponse {
    pub message: String,
    pub code: String,
}

/// GET `/api/markdown` — list summaries, or fetch one document via `?code=`.
pub async fn get_documents(
    State(state): State<AppState>,
    Query(query): Query<DocumentQuery>,
) -> Result<Response, AppError> {
    match query.code {
        Some(code) => {
            let document = state.documents.get_by_code(&code).await?;
            Ok(Json(document).into_response())
        }
        None => {
            let summaries: Vec<DocumentSummary> = state
                .documents
                .list()
                .await?
                .into_iter()
                .map(DocumentSummary::from)
                .collect();
            Ok(Json(summaries).into_response())
        }
    }
}

/// POST `/api/markdown` — create a document.
pub async fn create_document(
    State(state): State<AppState>,
    Json(req): Json<CreateDocumentReq>,
) -> Result<impl IntoResponse, AppError> {
    let title = require("title", req.title)?;
    let code = require("code", req.code)?;
    let content = require("content", req.content)?;

    let saved = state
        .documents
        .create(NewDocument {
            title,
            description: req.description.unwrap_or_default(),
            code,
            content,
            image: req.image,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SaveDocumentResponse {
            message: "Markdown file created successfully.".to_string(),
            file_name: saved.file_name,
            code: saved.code,
            url: saved.url,
        }),
    ))
}

/// PUT `/api/markdown` — replace the document identified by `originalCode`.
pub async fn update_document(
    State(state): State<AppState>,
    Json(req): Json<UpdateDocumentReq>,
) -> Result<impl IntoResponse, AppError> {
    let original_code = require("originalCode", req.original_code)?;
    let title = require("title", req.title)?;
    let code = require("code", req.code)?;
    let content = require("content", req.content)?;

    let saved = state
        .documents
        .update(
            &original_code,
            NewDocument {
                title,
                description: req.description.unwrap_or_default(),
                code,
                content,
                image: req.image,
            },
        )
        .await?;

    Ok(Json(SaveDocumentResponse {
        message: "Markdown file updated successfully.".to_string(),
        file_name: saved.file_name,
        code: saved.code,
        url: saved.url,
    }))
}

/// DELETE `/api/markdown` — permanently remove a document.
pub async fn delete_document(
    State(state): State<AppState>,
    Json(req): Json<DeleteDocumentReq>,
) -> Result<impl IntoResponse, AppError> {
    let code = require("code", req.code)?;
    state.documents.delete(&code).await?;

    Ok(Json(DeleteDocumentResponse {
        message: "File deleted successfully.".to_string(),
        code,
    }))
}

fn require(name: &str, value: Option<String>) -> Result<String, AppError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::bad_request(format!("`{}` is required", name))),
    }
}
