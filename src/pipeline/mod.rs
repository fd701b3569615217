//! Pipeline stages for PDF/image-to-HTML conversion.
//!
//! Each submodule implements exactly one step, so every stage can be tested
//! on its own and the two extraction modes can share what they have in
//! common.
//!
//! ## Data Flow
//!
//! ```text
//!                 ┌─ ocr mode ──▶ render::extract_text ─┬─▶ structure ──▶ fragment
//! input ──▶ kind ─┤               (scans: render + ocr) ─┘
//!                 └─ vision ────▶ render/load ──▶ encode ──▶ llm ──▶ postprocess
//! ```
//!
//! 1. [`input`]: canonicalise the path or URL and detect PDF vs image
//! 2. [`render`]: pdfium metadata, text layer and rasterisation; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`ocr`]: tesseract child process for images and scanned pages
//! 4. [`encode`]: PNG-encode and base64-wrap images for the vision request
//! 5. [`llm`]: vision call with timeout and retry/backoff
//! 6. [`postprocess`]: strip document wrappers and fences from model HTML

pub mod encode;
pub mod input;
pub mod llm;
pub mod ocr;
pub mod postprocess;
pub mod render;
