//! Conversion entry points.
//!
//! [`convert`] resolves the input, picks the extraction path from
//! `(config.mode, document kind)` and returns a [`ConversionOutput`]:
//!
//! | mode \ kind | PDF | Image |
//! |-------------|-----|-------|
//! | `Ocr` | text layer (OCR fallback for scans) → structurer | tesseract → structurer |
//! | `Vision` | rendered pages → model, concurrently | the image → model |
//!
//! [`convert_to_fragment`] is the variant the web front-end uses: it never
//! fails, and renders any error as an inline HTML fragment instead.

use crate::config::{ConversionConfig, ExtractionMode};
use crate::error::{PageError, Pdf2HtmlError};
use crate::output::{ConversionOutput, ConversionStats, DocumentMetadata, PageResult};
use crate::pipeline::input::DocumentKind;
use crate::pipeline::{encode, input, llm, ocr, postprocess, render};
use crate::structure::structure_text;
use edgequake_llm::{ImageData, LLMProvider, ProviderFactory};
use futures::stream::{self, StreamExt};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Model used when a provider is named without a model.
const DEFAULT_VISION_MODEL: &str = "gpt-4.1-nano";

/// Convert a PDF or image (local path or HTTP/HTTPS URL) to an HTML fragment.
///
/// # Errors
/// Returns `Err(Pdf2HtmlError)` for fatal errors: missing or unsupported
/// file, unreadable PDF, OCR engine missing or failing, provider not
/// configured, or every vision page failing. In vision mode individual page
/// failures are reported in `output.pages` instead.
pub async fn convert(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2HtmlError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting {:?} conversion: {}", config.mode, input_str);

    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let path = resolved.path().to_path_buf();

    let mut output = match (config.mode, resolved.kind()) {
        (ExtractionMode::Ocr, DocumentKind::Pdf) => ocr_pdf(&path, config).await?,
        (ExtractionMode::Ocr, DocumentKind::Image) => ocr_image(&path, config).await?,
        (ExtractionMode::Vision, DocumentKind::Pdf) => vision_pdf(&path, config).await?,
        (ExtractionMode::Vision, DocumentKind::Image) => vision_image(&path, config).await?,
    };

    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Conversion complete: {} bytes of HTML, {}/{} pages, {}ms",
        output.html.len(),
        output.stats.processed_pages,
        output.stats.total_pages,
        output.stats.total_duration_ms
    );

    Ok(output)
}

/// Convert and return only the fragment, rendering any error inline.
///
/// This is the contract of the upload page: the request itself never fails,
/// the result area shows either the converted snippet or a short
/// `<p><strong>Error…</strong> …</p>` message.
pub async fn convert_to_fragment(input_str: impl AsRef<str>, config: &ConversionConfig) -> String {
    let input_str = input_str.as_ref();
    match convert(input_str, config).await {
        Ok(output) => output.html,
        Err(e) => {
            warn!("Conversion of {} failed: {}", input_str, e);
            e.to_fragment()
        }
    }
}

/// Convert a document and write the fragment directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Pdf2HtmlError> {
    let output = convert(input_str, config).await?;
    let path = output_path.as_ref();
    let write_err = |e| Pdf2HtmlError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("html.tmp");
    let mut contents = output.html;
    if !contents.is_empty() && !contents.ends_with('\n') {
        contents.push('\n');
    }
    tokio::fs::write(&tmp_path, &contents).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    Ok(output.stats)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2HtmlError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2HtmlError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_str, config))
}

/// Extract PDF metadata without converting content.
///
/// Does not require an LLM provider, API key or OCR engine.
pub async fn inspect(input_str: impl AsRef<str>) -> Result<DocumentMetadata, Pdf2HtmlError> {
    let resolved = input::resolve_input(input_str.as_ref(), 120).await?;
    if resolved.kind() != DocumentKind::Pdf {
        return Err(Pdf2HtmlError::UnsupportedFormat {
            path: resolved.path().to_path_buf(),
        });
    }
    render::extract_metadata(resolved.path(), None).await
}

/// Convert in-memory document bytes.
///
/// `extension` (e.g. `"pdf"`, `".png"`) decides how the bytes are treated.
/// The bytes are written to a managed temp file that is removed on return.
pub async fn convert_from_bytes(
    bytes: &[u8],
    extension: &str,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2HtmlError> {
    let suffix = format!(".{}", extension.trim_start_matches('.').to_ascii_lowercase());
    let mut tmp = tempfile::Builder::new()
        .prefix("pdf2html-")
        .suffix(&suffix)
        .tempfile()
        .map_err(|e| Pdf2HtmlError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| Pdf2HtmlError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_string_lossy().to_string();
    // `tmp` is dropped (and the file deleted) when `convert` returns
    convert(&path, config).await
}

// ── OCR mode ─────────────────────────────────────────────────────────────

async fn ocr_pdf(path: &Path, config: &ConversionConfig) -> Result<ConversionOutput, Pdf2HtmlError> {
    let extract_start = Instant::now();
    let metadata = render::extract_metadata(path, config.password.as_deref()).await?;
    let total_pages = metadata.page_count;
    let page_indices = selected_pages(config, total_pages)?;

    let texts = render::extract_text(path, config.password.as_deref(), &page_indices).await?;
    let mut text = texts
        .into_iter()
        .map(|(_, t)| t)
        .collect::<Vec<_>>()
        .join("\n");

    let mut used_ocr_fallback = false;
    if text.trim().is_empty() && config.ocr_scanned_pdfs {
        info!("PDF has no text layer; running OCR on {} pages", page_indices.len());
        let rendered = render::render_pages(path, config, &page_indices).await?;
        text = ocr::ocr_rendered_pages(rendered, config).await?;
        used_ocr_fallback = true;
    }
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    debug!("Extracted {} chars from PDF", text.len());

    Ok(ConversionOutput {
        html: structure_text(&text).trim().to_string(),
        kind: DocumentKind::Pdf,
        mode: ExtractionMode::Ocr,
        pages: Vec::new(),
        metadata: Some(metadata),
        stats: ConversionStats {
            total_pages,
            processed_pages: page_indices.len(),
            extracted_chars: text.chars().count(),
            used_ocr_fallback,
            extract_duration_ms,
            ..Default::default()
        },
    })
}

async fn ocr_image(path: &Path, config: &ConversionConfig) -> Result<ConversionOutput, Pdf2HtmlError> {
    let extract_start = Instant::now();
    let text = ocr::ocr_image_file(path, config).await?;

    Ok(ConversionOutput {
        html: structure_text(&text).trim().to_string(),
        kind: DocumentKind::Image,
        mode: ExtractionMode::Ocr,
        pages: Vec::new(),
        metadata: None,
        stats: ConversionStats {
            total_pages: 1,
            processed_pages: 1,
            extracted_chars: text.chars().count(),
            extract_duration_ms: extract_start.elapsed().as_millis() as u64,
            ..Default::default()
        },
    })
}

// ── Vision mode ──────────────────────────────────────────────────────────

async fn vision_pdf(path: &Path, config: &ConversionConfig) -> Result<ConversionOutput, Pdf2HtmlError> {
    let provider = resolve_provider(config)?;

    let metadata = render::extract_metadata(path, config.password.as_deref()).await?;
    let total_pages = metadata.page_count;
    let page_indices = selected_pages(config, total_pages)?;

    let render_start = Instant::now();
    let rendered = render::render_pages(path, config, &page_indices).await?;
    let extract_duration_ms = render_start.elapsed().as_millis() as u64;
    info!("Rendered {} pages in {}ms", rendered.len(), extract_duration_ms);

    let mut failed_encodes = Vec::new();
    let encoded: Vec<(usize, ImageData)> = rendered
        .iter()
        .filter_map(|(idx, img)| match encode::encode_page(img) {
            Ok(data) => Some((*idx, data)),
            Err(e) => {
                warn!("Failed to encode page {}: {}", idx + 1, e);
                failed_encodes.push(encode_failure(idx + 1, &e));
                None
            }
        })
        .collect();

    let llm_start = Instant::now();
    let mut pages = process_concurrent(&provider, &encoded, config).await;
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;
    pages.extend(failed_encodes);

    finish_vision(
        pages,
        DocumentKind::Pdf,
        Some(metadata),
        total_pages,
        extract_duration_ms,
        llm_duration_ms,
        config,
    )
}

async fn vision_image(path: &Path, config: &ConversionConfig) -> Result<ConversionOutput, Pdf2HtmlError> {
    let provider = resolve_provider(config)?;

    let load_start = Instant::now();
    let owned = path.to_path_buf();
    let max_pixels = config.max_rendered_pixels;
    let image_data = tokio::task::spawn_blocking(move || {
        let img = encode::load_image(&owned, max_pixels)?;
        encode::encode_page(&img).map_err(|e| Pdf2HtmlError::ImageDecodeFailed {
            path: owned.clone(),
            detail: e.to_string(),
        })
    })
    .await
    .map_err(|e| Pdf2HtmlError::Internal(format!("Image task panicked: {}", e)))??;
    let extract_duration_ms = load_start.elapsed().as_millis() as u64;

    let llm_start = Instant::now();
    let page = llm::process_page(&provider, 1, image_data, config).await;
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;

    finish_vision(
        vec![page],
        DocumentKind::Image,
        None,
        1,
        extract_duration_ms,
        llm_duration_ms,
        config,
    )
}

/// Clean, order and assemble vision page results.
fn finish_vision(
    page_results: Vec<PageResult>,
    kind: DocumentKind,
    metadata: Option<DocumentMetadata>,
    total_pages: usize,
    extract_duration_ms: u64,
    llm_duration_ms: u64,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2HtmlError> {
    let mut pages: Vec<PageResult> = page_results
        .into_iter()
        .map(|mut pr| {
            if pr.error.is_none() {
                pr.html = postprocess::clean_html(&pr.html);
            }
            pr
        })
        .collect();
    pages.sort_by_key(|p| p.page_num);

    let processed = pages.iter().filter(|p| p.error.is_none()).count();
    let failed = pages.len() - processed;

    if processed == 0 {
        let first_error = pages
            .iter()
            .find_map(|p| p.error.as_ref())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());

        return Err(Pdf2HtmlError::AllPagesFailed {
            total: pages.len(),
            retries: config.max_retries,
            first_error,
        });
    }

    let html = assemble_fragment(&pages);

    let stats = ConversionStats {
        total_pages,
        processed_pages: processed,
        failed_pages: failed,
        total_input_tokens: pages.iter().map(|p| p.input_tokens as u64).sum(),
        total_output_tokens: pages.iter().map(|p| p.output_tokens as u64).sum(),
        extract_duration_ms,
        llm_duration_ms,
        ..Default::default()
    };

    Ok(ConversionOutput {
        html,
        kind,
        mode: ExtractionMode::Vision,
        pages,
        metadata,
        stats,
    })
}

/// Join successful pages in page order, one newline between pages.
fn assemble_fragment(pages: &[PageResult]) -> String {
    pages
        .iter()
        .filter(|p| p.error.is_none())
        .map(|p| p.html.trim())
        .filter(|h| !h.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn encode_failure(page_num: usize, e: &image::ImageError) -> PageResult {
    PageResult {
        page_num,
        html: String::new(),
        input_tokens: 0,
        output_tokens: 0,
        duration_ms: 0,
        retries: 0,
        error: Some(PageError::RenderFailed {
            page: page_num,
            detail: format!("Image encoding failed: {}", e),
        }),
    }
}

/// Process pages concurrently, at most `config.concurrency` calls in flight.
async fn process_concurrent(
    provider: &Arc<dyn LLMProvider>,
    pages: &[(usize, ImageData)],
    config: &ConversionConfig,
) -> Vec<PageResult> {
    let futures: Vec<_> = pages
        .iter()
        .map(|(idx, img_data)| {
            let provider = Arc::clone(provider);
            let img = img_data.clone();
            async move { llm::process_page(&provider, idx + 1, img, config).await }
        })
        .collect();
    stream::iter(futures)
        .buffer_unordered(config.concurrency)
        .collect()
        .await
}

fn selected_pages(config: &ConversionConfig, total_pages: usize) -> Result<Vec<usize>, Pdf2HtmlError> {
    let page_indices = config.pages.to_indices(total_pages);
    if page_indices.is_empty() {
        return Err(Pdf2HtmlError::PageOutOfRange {
            page: 0,
            total: total_pages,
        });
    }
    debug!("Selected {} of {} pages", page_indices.len(), total_pages);
    Ok(page_indices)
}

// ── Provider resolution ──────────────────────────────────────────────────

fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, Pdf2HtmlError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        Pdf2HtmlError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the vision provider, from most-specific to least-specific:
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model` or the
///    default model; the factory reads the matching API key from the env.
/// 3. **Environment pair** `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`.
/// 4. **OpenAI** when `OPENAI_API_KEY` is set, then full auto-detection via
///    [`ProviderFactory::from_env`].
fn resolve_provider(config: &ConversionConfig) -> Result<Arc<dyn LLMProvider>, Pdf2HtmlError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_VISION_MODEL);
        return create_vision_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_vision_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_VISION_MODEL);
            return create_vision_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| Pdf2HtmlError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or GEMINI_API_KEY.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page_num: usize, html: &str, failed: bool) -> PageResult {
        PageResult {
            page_num,
            html: html.to_string(),
            input_tokens: 10,
            output_tokens: 5,
            duration_ms: 1,
            retries: 0,
            error: failed.then(|| PageError::Timeout {
                page: page_num,
                secs: 60,
            }),
        }
    }

    #[test]
    fn fragment_skips_failed_pages_in_order() {
        let pages = vec![
            page(1, "<p>one</p>\n", false),
            page(2, "", true),
            page(3, "<p>three</p>\n", false),
        ];
        assert_eq!(assemble_fragment(&pages), "<p>one</p>\n<p>three</p>");
    }

    #[test]
    fn finish_vision_sorts_and_cleans() {
        let config = ConversionConfig::default();
        let out = finish_vision(
            vec![
                page(2, "```html\n<p>b</p>\n```", false),
                page(1, "<html><body><p>a</p></body></html>", false),
            ],
            DocumentKind::Pdf,
            None,
            2,
            0,
            0,
            &config,
        )
        .unwrap();
        assert_eq!(out.html, "<p>a</p>\n<p>b</p>");
        assert_eq!(out.stats.processed_pages, 2);
        assert_eq!(out.stats.total_input_tokens, 20);
        assert_eq!(out.pages[0].page_num, 1);
    }

    #[test]
    fn finish_vision_all_failed_is_fatal() {
        let config = ConversionConfig::default();
        let err = finish_vision(
            vec![page(1, "", true)],
            DocumentKind::Image,
            None,
            1,
            0,
            0,
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, Pdf2HtmlError::AllPagesFailed { total: 1, .. }));
    }

    #[test]
    fn empty_selection_is_out_of_range() {
        let config = ConversionConfig::builder()
            .pages(crate::config::PageSelection::Single(9))
            .build()
            .unwrap();
        assert!(matches!(
            selected_pages(&config, 3),
            Err(Pdf2HtmlError::PageOutOfRange { total: 3, .. })
        ));
    }

    #[tokio::test]
    async fn unsupported_bytes_are_rejected() {
        let out = convert_from_bytes(b"hello", "txt", &ConversionConfig::default()).await;
        assert!(matches!(out, Err(Pdf2HtmlError::UnsupportedFormat { .. })));
    }

    #[tokio::test]
    async fn vision_image_uses_configured_provider() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("halaman.png");
        image::RgbImage::new(16, 16).save(&png).unwrap();

        let mock = edgequake_llm::MockProvider::new();
        mock.add_response("```html\n<h1>Judul</h1>\n<p>Isi.</p>\n```").await;
        let config = ConversionConfig::builder()
            .mode(ExtractionMode::Vision)
            .provider(Arc::new(mock))
            .build()
            .unwrap();

        let out = convert(png.to_str().unwrap(), &config).await.unwrap();
        assert_eq!(out.html, "<h1>Judul</h1>\n<p>Isi.</p>");
        assert_eq!(out.kind, DocumentKind::Image);
        assert_eq!(out.mode, ExtractionMode::Vision);
        assert_eq!(out.pages.len(), 1);
        assert_eq!(out.stats.processed_pages, 1);
        assert_eq!(out.stats.failed_pages, 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn ocr_image_fragment_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("scan.png");
        std::fs::write(&png, b"not decoded by echo").unwrap();

        let config = ConversionConfig::builder().tesseract_cmd("echo").build().unwrap();
        let out = convert(png.to_str().unwrap(), &config).await.unwrap();

        assert!(out.html.starts_with("<p>"), "{}", out.html);
        assert!(out.html.ends_with("scan.png stdout -l ind</p>"), "{}", out.html);
        assert_eq!(out.kind, DocumentKind::Image);
    }

    #[tokio::test]
    async fn missing_file_renders_inline_error() {
        let frag = convert_to_fragment("/no/such/upload.pdf", &ConversionConfig::default()).await;
        assert!(frag.starts_with("<p><strong>Error:</strong> File not found"), "{frag}");
    }
}
