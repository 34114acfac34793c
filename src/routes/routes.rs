//! Defines routes for the document API, image API, pages, and blob surface.
//!
//! ## Structure
//! - **Document API**
//!   - `GET    /api/markdown`        — list summaries, or one document via `?code=`
//!   - `POST   /api/markdown`        — create document
//!   - `PUT    /api/markdown`        — update document (body carries `originalCode`)
//!   - `DELETE /api/markdown`        — delete document (body carries `code`)
//!
//! - **Image API**
//!   - `POST   /api/upload-image`    — multipart upload
//!   - `GET    /api/images`          — list uploads
//!   - `DELETE /api/images`          — delete by URL
//!
//! - **Pages & payloads**
//!   - `GET /`                       — document index
//!   - `GET /view/{code}`            — rendered document
//!   - `GET /blobs/{*path}`          — raw stored payload
//!
//! - **Health**
//!   - `GET /healthz`, `GET /readyz`, `GET /api/blob-status`

use crate::{
    handlers::{
        blob_handlers::get_blob,
        document_handlers::{create_document, delete_document, get_documents, update_document},
        health_handlers::{blob_status, healthz, readyz},
        image_handlers::{delete_image, list_images, upload_image},
        page_handlers::{index, view_document},
    },
    services::{
        blob_store::BlobStore, document_service::DocumentService, image_service::ImageService,
        render::MarkdownRenderer,
    },
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;

/// Request bodies may legitimately carry a 5 MB image inside a multipart
/// envelope; the image service enforces the real size cap so oversized
/// uploads answer 400 rather than a framework 413.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Shared state carried to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BlobStore>,
    pub documents: DocumentService,
    pub images: ImageService,
    pub renderer: Arc<MarkdownRenderer>,
}

impl AppState {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            documents: DocumentService::new(store.clone()),
            images: ImageService::new(store.clone()),
            renderer: Arc::new(MarkdownRenderer::new()),
            store,
        }
    }
}

/// Build and return the router for every endpoint.
///
/// The router carries shared state ([`AppState`]) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // JSON API
        .route(
            "/api/markdown",
            get(get_documents)
                .post(create_document)
                .put(update_document)
                .delete(delete_document),
        )
        .route("/api/upload-image", post(upload_image))
        .route("/api/images", get(list_images).delete(delete_image))
        .route("/api/blob-status", get(blob_status))
        // pages and payloads
        .route("/", get(index))
        .route("/view/{code}", get(view_document))
        .route("/blobs/{*path}", get(get_blob))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::blob_store::memory::MemoryBlobStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::util::ServiceExt;

    fn test_app() -> Router {
        routes().with_state(AppState::new(Arc::new(MemoryBlobStore::new())))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn readyz_endpoint() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/readyz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_get_delete_roundtrip() {
        let app = test_app();

        let created = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/markdown",
                json!({"title": "Hello", "code": "hello-world", "content": "# Hi"}),
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let created = body_json(created).await;
        assert_eq!(created["code"], "hello-world");
        assert_eq!(created["fileName"], "hello-world.md");
        assert!(created["url"].as_str().unwrap().contains("md/hello-world.md"));

        let fetched = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/markdown?code=hello-world")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(fetched.status(), StatusCode::OK);
        let fetched = body_json(fetched).await;
        assert_eq!(fetched["title"], "Hello");
        assert_eq!(fetched["code"], "hello-world");
        assert_eq!(fetched["content"], "# Hi");

        let deleted = app
            .clone()
            .oneshot(json_request(
                "DELETE",
                "/api/markdown",
                json!({"code": "hello-world"}),
            ))
            .await
            .unwrap();
        assert_eq!(deleted.status(), StatusCode::OK);
        let deleted = body_json(deleted).await;
        assert_eq!(deleted["code"], "hello-world");

        let gone = app
            .oneshot(
                Request::builder()
                    .uri("/api/markdown?code=hello-world")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_missing_fields_answers_400() {
        let app = test_app();
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/markdown",
                json!({"title": "only a title"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn duplicate_code_answers_409() {
        let app = test_app();
        let doc = json!({"title": "One", "code": "dup", "content": "body"});

        let first = app
            .clone()
            .oneshot(json_request("POST", "/api/markdown", doc.clone()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app
            .oneshot(json_request("POST", "/api/markdown", doc))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn update_renames_document() {
        let app = test_app();

        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/markdown",
                json!({"title": "Old", "code": "a", "content": "old body"}),
            ))
            .await
            .unwrap();

        let updated = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/markdown",
                json!({
                    "originalCode": "a",
                    "title": "New",
                    "code": "b",
                    "content": "new body"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(updated.status(), StatusCode::OK);

        let old = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/markdown?code=a")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(old.status(), StatusCode::NOT_FOUND);

        let new = app
            .oneshot(
                Request::builder()
                    .uri("/api/markdown?code=b")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let new = body_json(new).await;
        assert_eq!(new["title"], "New");
        assert_eq!(new["content"], "new body");
    }

    #[tokio::test]
    async fn update_missing_answers_404() {
        let app = test_app();
        let response = app
            .oneshot(json_request(
                "PUT",
                "/api/markdown",
                json!({
                    "originalCode": "ghost",
                    "title": "x",
                    "code": "ghost",
                    "content": "x"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_missing_answers_404() {
        let app = test_app();
        let response = app
            .oneshot(json_request("DELETE", "/api/markdown", json!({"code": "nope"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_summaries_have_no_content_field() {
        let app = test_app();
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/markdown",
                json!({"title": "Doc", "code": "doc", "content": "body"}),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/markdown")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let listed = body_json(response).await;
        let listed = listed.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["code"], "doc");
        assert!(listed[0].get("content").is_none());
    }

    #[tokio::test]
    async fn upload_rejects_non_image_file() {
        let app = test_app();

        let boundary = "qqqq-test-boundary";
        let body = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"image\"; filename=\"notes.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             just text\r\n\
             --{b}--\r\n",
            b = boundary
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/upload-image")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={}", boundary),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upload_accepts_png_and_serves_it() {
        let app = test_app();

        let boundary = "qqqq-test-boundary";
        let body = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"image\"; filename=\"dot.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             not-really-a-png\r\n\
             --{b}--\r\n",
            b = boundary
        );

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/upload-image")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={}", boundary),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let uploaded = body_json(response).await;
        assert_eq!(uploaded["success"], true);
        assert!(
            uploaded["filename"]
                .as_str()
                .unwrap()
                .ends_with("_dot.png")
        );

        let listed = app
            .oneshot(
                Request::builder()
                    .uri("/api/images")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(listed.status(), StatusCode::OK);
        let listed = body_json(listed).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blob_status_reports_file_count() {
        let app = test_app();
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/markdown",
                json!({"title": "Doc", "code": "doc", "content": "body"}),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/blob-status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let status = body_json(response).await;
        assert_eq!(status["success"], true);
        assert_eq!(status["fileCount"], 1);
    }

    #[tokio::test]
    async fn index_and_view_pages_render() {
        let app = test_app();
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/markdown",
                json!({"title": "Viewable", "code": "viewable", "content": "# Heading"}),
            ))
            .await
            .unwrap();

        let index = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(index.status(), StatusCode::OK);

        let view = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/view/viewable")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(view.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(view.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Viewable"));
        assert!(html.contains("<h1>Heading</h1>"));

        let missing = app
            .oneshot(
                Request::builder()
                    .uri("/view/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
