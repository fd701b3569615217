//! Conversion results.
//!
//! [`ConversionOutput`] carries the final fragment plus enough bookkeeping
//! (per-page vision results, timings, token counts) for the CLI's `--json`
//! mode and for logging.

use crate::config::ExtractionMode;
use crate::error::PageError;
use crate::pipeline::input::DocumentKind;
use serde::{Deserialize, Serialize};

/// Output of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The HTML fragment (no `<html>`/`<head>`/`<body>` wrapper).
    pub html: String,
    /// What kind of document was converted.
    pub kind: DocumentKind,
    /// Which extraction path produced `html`.
    pub mode: ExtractionMode,
    /// Per-page results. Vision mode only; empty for OCR mode.
    pub pages: Vec<PageResult>,
    /// PDF metadata; `None` for images.
    pub metadata: Option<DocumentMetadata>,
    pub stats: ConversionStats,
}

/// Result of sending one page image to the vision model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Cleaned HTML for this page; empty when `error` is set.
    pub html: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
    /// Retries used before success (or the retry budget on failure).
    pub retries: u8,
    pub error: Option<PageError>,
}

/// Aggregate statistics for one conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages in the document (1 for images).
    pub total_pages: usize,
    pub processed_pages: usize,
    pub failed_pages: usize,
    /// Characters of plain text extracted (OCR mode).
    pub extracted_chars: usize,
    /// True when a PDF without a text layer was OCR'd page by page.
    pub used_ocr_fallback: bool,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_duration_ms: u64,
    pub extract_duration_ms: u64,
    pub llm_duration_ms: u64,
}

/// Document-level PDF metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}
