//! Health & readiness handlers.
//!
//! - GET /healthz          -> simple liveness ("ok")
//! - GET /readyz           -> readiness that exercises the blob store
//! - GET /api/blob-status  -> store connectivity plus document count

use crate::routes::routes::AppState;
use crate::services::document_service::DOCUMENT_PREFIX;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// `GET /healthz`
///
/// Very small liveness probe — always returns 200 OK with a plain JSON body.
/// This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Readiness probe that performs a best-effort write/read/delete of a probe
/// object through the blob store. Returns JSON describing the check,
/// HTTP 200 when it passes, HTTP 503 when it fails.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let probe_path = format!("readyz-{}.tmp", Uuid::new_v4());

    let store_check = match state
        .store
        .put(&probe_path, Bytes::from_static(b"readyz"))
        .await
    {
        Ok(put) => match state.store.get(&probe_path).await {
            Ok(bytes) if &bytes[..] == b"readyz" => match state.store.delete(&put.url).await {
                Ok(()) => (true, None::<String>),
                Err(e) => (true, Some(format!("could not remove probe object: {}", e))),
            },
            Ok(_) => {
                let _ = state.store.delete(&put.url).await;
                (false, Some("probe content mismatch".to_string()))
            }
            Err(e) => {
                let _ = state.store.delete(&put.url).await;
                (false, Some(format!("could not read probe object: {}", e)))
            }
        },
        Err(e) => (false, Some(format!("could not write probe object: {}", e))),
    };

    let store_ok = store_check.0;
    let mut checks = HashMap::new();
    checks.insert(
        "store",
        CheckStatus {
            ok: store_ok,
            error: store_check.1,
        },
    );

    let body = ReadyResponse {
        status: if store_ok { "ok".into() } else { "error".into() },
        checks,
    };

    let status = if store_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

/// `GET /api/blob-status`
///
/// Reports whether the document prefix can be listed and how many files it
/// holds. 200 on success, 500 when the store is unreachable.
pub async fn blob_status(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.list(DOCUMENT_PREFIX).await {
        Ok(objects) => (
            StatusCode::OK,
            Json(BlobStatusResponse {
                success: true,
                message: "Blob storage is connected.".into(),
                file_count: Some(objects.len()),
            }),
        ),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(BlobStatusResponse {
                success: false,
                message: format!("Blob storage check failed: {}", err),
                file_count: None,
            }),
        ),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlobStatusResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_count: Option<usize>,
}
