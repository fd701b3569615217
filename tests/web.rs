//! Router tests for the upload page.
//!
//! Every case here is decided before pdfium or tesseract would do real work
//! (format checks, PDF magic, a missing OCR binary), so no native libraries
//! or API keys are needed.

#![cfg(feature = "web")]

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use edgequake_pdf2html::error::{OCR_UNAVAILABLE_FRAGMENT, UNSUPPORTED_FORMAT_FRAGMENT};
use edgequake_pdf2html::web::{router, AppState, UploadStore, DEFAULT_MAX_UPLOAD_BYTES};
use edgequake_pdf2html::ConversionConfig;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "pdf2html-test-boundary";

// ── Test helpers ─────────────────────────────────────────────────────────────

async fn app_with_limit(max_upload_bytes: usize) -> (Router, UploadStore, TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let store = UploadStore::open(tmp.path().join("uploads")).await.unwrap();
    let config = ConversionConfig::builder()
        .tesseract_cmd("pdf2html-no-such-tesseract")
        .build()
        .unwrap();
    let state = AppState {
        config: Arc::new(config),
        store: store.clone(),
    };
    (router(state, max_upload_bytes), store, tmp)
}

async fn app() -> (Router, UploadStore, TempDir) {
    app_with_limit(DEFAULT_MAX_UPLOAD_BYTES).await
}

fn multipart_upload(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ── GET / ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn index_shows_upload_form() {
    let (app, _store, _tmp) = app().await;
    let resp = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains(r#"enctype="multipart/form-data""#));
    assert!(html.contains(r#"name="file_upload""#));
}

// ── POST / ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn post_without_file_asks_for_one() {
    let (app, _store, _tmp) = app().await;
    let resp = app
        .oneshot(multipart_upload("something_else", "a.pdf", b"%PDF"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp)
        .await
        .contains("Silakan pilih file terlebih dahulu."));
}

#[tokio::test]
async fn post_with_empty_filename_asks_for_one() {
    let (app, store, _tmp) = app().await;
    let resp = app.oneshot(multipart_upload("file_upload", "", b"")).await.unwrap();

    assert!(body_text(resp)
        .await
        .contains("Silakan pilih file terlebih dahulu."));
    assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 0);
}

#[tokio::test]
async fn unsupported_upload_shows_fixed_error() {
    let (app, store, _tmp) = app().await;
    let resp = app
        .oneshot(multipart_upload("file_upload", "catatan.TXT", b"halo"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains(UNSUPPORTED_FORMAT_FRAGMENT), "{html}");
    assert!(!html.contains("<iframe"));

    let stored: Vec<String> = std::fs::read_dir(store.dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].ends_with(".txt"), "{stored:?}");
}

#[tokio::test]
async fn image_without_ocr_engine_reports_it() {
    let (app, _store, _tmp) = app().await;
    let resp = app
        .oneshot(multipart_upload("file_upload", "scan.png", b"not really a png"))
        .await
        .unwrap();

    let html = body_text(resp).await;
    assert!(html.contains(OCR_UNAVAILABLE_FRAGMENT), "{html}");
}

#[tokio::test]
async fn broken_pdf_is_embedded_with_pdf_error() {
    let (app, _store, _tmp) = app().await;
    let resp = app
        .oneshot(multipart_upload("file_upload", "Laporan.PDF", b"this is no pdf"))
        .await
        .unwrap();

    let html = body_text(resp).await;
    assert!(html.contains("<p><strong>Error PDF:</strong>"), "{html}");
    assert!(html.contains(r#"<iframe src="/uploads/"#), "{html}");
    assert!(html.contains(".pdf\""));
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let (app, _store, _tmp) = app_with_limit(64).await;
    let resp = app
        .oneshot(multipart_upload("file_upload", "big.pdf", &[b'x'; 4096]))
        .await
        .unwrap();

    assert!(resp.status().is_client_error(), "{}", resp.status());
}

// ── GET /uploads/{name} ──────────────────────────────────────────────────────

#[tokio::test]
async fn stored_files_are_served() {
    let (app, store, _tmp) = app().await;
    let stored = store.save("doc.pdf", b"%PDF-1.7 sample").await.unwrap();

    let resp = app
        .oneshot(
            Request::get(format!("/uploads/{}", stored.name))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "%PDF-1.7 sample");
}

#[tokio::test]
async fn unknown_upload_is_not_found() {
    let (app, _store, _tmp) = app().await;
    let resp = app
        .oneshot(Request::get("/uploads/missing.pdf").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
