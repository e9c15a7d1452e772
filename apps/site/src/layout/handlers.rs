use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::errors::AppError;
use crate::layout::content::DocumentKind;
use crate::layout::engine::layout_document;
use crate::layout::pdf::render_pdf;
use crate::state::AppState;

/// GET /docs/primer.pdf
pub async fn handle_primer(State(state): State<AppState>) -> Result<Response, AppError> {
    render_document(&state, DocumentKind::Primer).await
}

/// GET /docs/whitepaper.pdf
pub async fn handle_whitepaper(State(state): State<AppState>) -> Result<Response, AppError> {
    render_document(&state, DocumentKind::Whitepaper).await
}

async fn render_document(state: &AppState, kind: DocumentKind) -> Result<Response, AppError> {
    let spec = state
        .documents
        .get(kind)
        .cloned()
        .ok_or_else(|| {
            AppError::Configuration(format!("document library has no {}", kind.filename()))
        })?;
    let config = state.layout_config.clone();

    // Layout and serialisation are CPU-bound; keep them off the async workers.
    let (bytes, pages) = tokio::task::spawn_blocking(move || {
        let layout = layout_document(&spec, &config);
        let pages = layout.page_count();
        render_pdf(&layout, &spec.front.title).map(|bytes| (bytes, pages))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed rendering PDF: {e}")))??;

    info!(document = kind.filename(), pages, bytes = bytes.len(), "rendered document");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", kind.filename()),
            ),
            (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
        ],
        bytes,
    )
        .into_response())
}
