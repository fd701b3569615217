//! Error types for the edgequake-pdf2html library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2HtmlError`]: **Fatal**: the conversion cannot proceed at all
//!   (unsupported file, corrupt PDF, OCR engine missing, provider not
//!   configured). Returned as `Err(Pdf2HtmlError)` from the `convert*`
//!   functions.
//!
//! * [`PageError`]: **Non-fatal**: a single page failed in vision mode
//!   (transient API error, timeout) while the other pages are fine. Stored
//!   inside [`crate::output::PageResult`].
//!
//! The web front-end never shows a failed request: every fatal error is
//! rendered as a small inline HTML fragment via [`Pdf2HtmlError::to_fragment`]
//! and embedded where the converted snippet would have been.

use crate::structure::escape_html;
use std::path::PathBuf;
use thiserror::Error;

/// Fragment shown when the uploaded file is neither a PDF nor a PNG/JPEG.
pub const UNSUPPORTED_FORMAT_FRAGMENT: &str =
    "<p><strong>Error:</strong> Format file tidak didukung.</p>";

/// Fragment shown when the tesseract binary cannot be found.
pub const OCR_UNAVAILABLE_FRAGMENT: &str =
    "<p><strong>Error:</strong> Tesseract tidak terinstal.</p>";

/// Fragment shown when vision mode has no usable model provider.
pub const PROVIDER_MISSING_FRAGMENT: &str =
    "<p><strong>Error:</strong> API key untuk model AI belum dikonfigurasi.</p>";

/// All fatal errors returned by the edgequake-pdf2html library.
#[derive(Debug, Error)]
pub enum Pdf2HtmlError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// Extension is not one of `.pdf`, `.png`, `.jpg`, `.jpeg`.
    #[error("Unsupported file format: '{path}'")]
    UnsupportedFormat { path: PathBuf },

    /// The file has a `.pdf` extension but is not a PDF.
    #[error("File is not a valid PDF: '{path}' (first bytes: {magic:?})")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Page selection matched no page of the document.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// pdfium returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error("Failed to bind to pdfium library: {0}\nSet PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide.")]
    PdfiumBindingFailed(String),

    // ── OCR / image errors ────────────────────────────────────────────────
    /// The tesseract binary could not be spawned.
    #[error("OCR engine '{command}' is not installed or not on PATH")]
    OcrUnavailable { command: String },

    /// tesseract exited unsuccessfully.
    #[error("OCR failed for '{path}': {detail}")]
    OcrFailed { path: PathBuf, detail: String },

    /// tesseract did not finish within the configured timeout.
    #[error("OCR timed out after {secs}s for '{path}'")]
    OcrTimeout { path: PathBuf, secs: u64 },

    /// The image could not be decoded or encoded.
    #[error("Cannot decode image '{path}': {detail}")]
    ImageDecodeFailed { path: PathBuf, detail: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Every page failed after all retries; output would be empty.
    #[error("All {total} pages failed after {retries} retries each.\nFirst error: {first_error}")]
    AllPagesFailed {
        total: usize,
        retries: u32,
        first_error: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output HTML file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2HtmlError {
    /// Render the error as an inline HTML fragment for the result area.
    ///
    /// Configuration problems get a fixed message; everything else embeds
    /// the (escaped) error text under a label naming the failing stage.
    pub fn to_fragment(&self) -> String {
        use Pdf2HtmlError::*;

        let label = match self {
            UnsupportedFormat { .. } => return UNSUPPORTED_FORMAT_FRAGMENT.to_string(),
            OcrUnavailable { .. } => return OCR_UNAVAILABLE_FRAGMENT.to_string(),
            ProviderNotConfigured { .. } => return PROVIDER_MISSING_FRAGMENT.to_string(),
            NotAPdf { .. }
            | CorruptPdf { .. }
            | PasswordRequired { .. }
            | WrongPassword { .. }
            | PageOutOfRange { .. }
            | RasterisationFailed { .. }
            | PdfiumBindingFailed(_) => "Error PDF:",
            OcrFailed { .. } | OcrTimeout { .. } | ImageDecodeFailed { .. } => "Error OCR:",
            _ => "Error:",
        };

        format!("<p><strong>{label}</strong> {}</p>", escape_html(&self.to_string()))
    }
}

/// A non-fatal error for a single page in vision mode.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Page rasterisation or encoding failed.
    #[error("Page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// LLM call failed after retries.
    #[error("Page {page}: LLM call failed after {retries} retries: {detail}")]
    LlmFailed {
        page: usize,
        retries: u8,
        detail: String,
    },

    /// LLM call timed out on the last attempt.
    #[error("Page {page}: LLM call timed out after {secs}s")]
    Timeout { page: usize, secs: u64 },
}
