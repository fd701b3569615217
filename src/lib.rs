//! # edgequake-pdf2html
//!
//! Turn uploaded PDFs and scanned images into an HTML fragment that can be
//! dropped straight into a knowledge-base page.
//!
//! Two extraction modes share one entry point:
//!
//! * **OCR** (default): the PDF text layer, or tesseract for images and
//!   scanned PDFs, is fed through a line-shape heuristic ([`structure_text`])
//!   that recognises headings, numbered and bulleted lists, FAQ questions
//!   and paragraphs.
//! * **Vision**: each page is rasterised and a vision model writes the HTML
//!   directly; the answer is cleaned of document wrappers and fences.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / PNG / JPG
//!  │
//!  ├─ 1. Input      resolve local file or download from URL, detect kind
//!  ├─ 2. Extract    pdfium text layer │ tesseract │ pdfium rasterise
//!  ├─ 3. Structure  line heuristics   │ vision model + cleanup
//!  └─ 4. Output     HTML fragment + per-page stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2html::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert("prosedur.pdf", &config).await?;
//!     println!("{}", output.html);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `web`   | via `cli` | Upload page and router ([`web`]), axum + tower-http + uuid |
//! | `cli`   | on      | The `pdf2html` binary (clap + anyhow + tracing-subscriber) |
//!
//! Library-only users can opt out of both:
//! ```toml
//! edgequake-pdf2html = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod structure;
#[cfg(feature = "web")]
pub mod web;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, ExtractionMode, PageSelection};
pub use convert::{
    convert, convert_from_bytes, convert_sync, convert_to_file, convert_to_fragment, inspect,
};
pub use error::{PageError, Pdf2HtmlError};
pub use output::{ConversionOutput, ConversionStats, DocumentMetadata, PageResult};
pub use pipeline::input::DocumentKind;
pub use structure::structure_text;
