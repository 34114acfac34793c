//! Server-rendered pages: the document index and single-document views.

use crate::{
    errors::AppError,
    models::document::Document,
    routes::routes::AppState,
    services::render::html_escape,
};
use axum::{
    extract::{Path, State},
    response::Html,
};
use tracing::warn;

/// GET `/` — index of all documents, most recently modified first.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let documents = match state.documents.list().await {
        Ok(documents) => documents,
        Err(err) => {
            warn!("listing documents for index page failed: {}", err);
            Vec::new()
        }
    };

    let mut items = String::new();
    for doc in &documents {
        items.push_str(&format!(
            "<li><a href=\"/view/{code}\">{title}</a>",
            code = html_escape(&doc.code),
            title = html_escape(&doc.title),
        ));
        if !doc.description.is_empty() {
            items.push_str(&format!(
                " <span class=\"desc\">{}</span>",
                html_escape(&doc.description)
            ));
        }
        items.push_str("</li>\n");
    }
    let body = if documents.is_empty() {
        "<p>No documents yet.</p>".to_string()
    } else {
        format!("<ul>\n{}</ul>", items)
    };

    Html(page_shell(
        "Markdown Documents",
        &format!("<h1>Markdown Documents</h1>\n{}", body),
    ))
}

/// GET `/view/{code}` — a single document rendered to HTML.
pub async fn view_document(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Html<String>, AppError> {
    let document = state.documents.get_by_code(&code).await?;
    let rendered = state.renderer.render(&document.content);

    let mut body = String::new();
    body.push_str(&format!("<h1>{}</h1>\n", html_escape(&document.title)));
    if !document.description.is_empty() {
        body.push_str(&format!(
            "<p class=\"desc\">{}</p>\n",
            html_escape(&document.description)
        ));
    }
    if let Some(date) = document.date {
        body.push_str(&format!(
            "<p class=\"date\">{}</p>\n",
            date.format("%Y-%m-%d")
        ));
    }
    if let Some(image) = &document.image {
        body.push_str(&format!(
            "<img class=\"header\" src=\"{}\" alt=\"{}\">\n",
            html_escape(image),
            html_escape(&document.title)
        ));
    }
    body.push_str("<hr>\n");
    body.push_str(&rendered);
    body.push_str("\n<p><a href=\"/\">Back to list</a></p>");

    Ok(Html(page_shell(&title_of(&document), &body)))
}

fn title_of(document: &Document) -> String {
    html_escape(&document.title)
}

fn page_shell(title: &str, body: &str) -> String {
    format!(
        concat!(
            "<!doctype html><html><head><meta charset=\"utf-8\">",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
            "<title>{title}</title>",
            "<style>",
            "body{{max-width:48rem;margin:0 auto;padding:1rem;",
            "font-family:system-ui,sans-serif;line-height:1.6}}",
            "img.header{{max-width:100%}}",
            ".desc{{color:#666}}.date{{color:#999;font-size:.9rem}}",
            "pre{{overflow-x:auto;padding:.75rem;border-radius:4px}}",
            "</style></head><body>{body}</body></html>"
        ),
        title = title,
        body = body,
    )
}
