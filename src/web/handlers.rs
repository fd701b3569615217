//! Request handlers for the upload page.

use super::page::{render_page, PageContext};
use super::AppState;
use crate::convert::convert_to_fragment;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Html,
};
use tracing::{error, info, warn};

/// Multipart field carrying the document.
pub const UPLOAD_FIELD: &str = "file_upload";

/// Shown when the form is submitted without a file.
pub const NO_FILE_MESSAGE: &str = "Silakan pilih file terlebih dahulu.";

/// GET /
pub async fn index() -> Html<String> {
    Html(render_page(&PageContext::default()))
}

/// POST /
///
/// Stores the uploaded file, converts it and renders the page with the
/// fragment. Conversion errors are part of the fragment; only transport and
/// storage failures change the status code.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> (StatusCode, Html<String>) {
    let mut upload: Option<(String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read multipart field: {}", e);
                return page_with_error(e.status(), format!("Gagal membaca unggahan: {}", e));
            }
        };

        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        match field.bytes().await {
            Ok(data) => upload = Some((filename, data.to_vec())),
            Err(e) => {
                warn!("Failed to read file '{}': {}", filename, e);
                return page_with_error(
                    e.status(),
                    format!("Gagal membaca file '{}': {}", filename, e),
                );
            }
        }
    }

    let (filename, data) = match upload {
        Some((filename, data)) if !filename.is_empty() => (filename, data),
        _ => return page_with_error(StatusCode::OK, NO_FILE_MESSAGE.to_string()),
    };

    let stored = match state.store.save(&filename, &data).await {
        Ok(stored) => stored,
        Err(e) => {
            error!("Failed to store upload '{}': {}", filename, e);
            return page_with_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Gagal menyimpan file: {}", e),
            );
        }
    };
    info!("Converting upload '{}' ({} bytes) as {}", filename, data.len(), stored.name);

    let html_snippet = convert_to_fragment(stored.path.to_string_lossy(), &state.config).await;

    let ctx = PageContext {
        error: None,
        pdf_filename: stored.is_pdf().then(|| stored.name.clone()),
        html_snippet: Some(html_snippet),
    };
    (StatusCode::OK, Html(render_page(&ctx)))
}

fn page_with_error(status: StatusCode, message: String) -> (StatusCode, Html<String>) {
    let ctx = PageContext {
        error: Some(message),
        ..Default::default()
    };
    (status, Html(render_page(&ctx)))
}
