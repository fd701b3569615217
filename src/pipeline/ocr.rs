//! OCR via the `tesseract` command-line tool.
//!
//! Tesseract is run as a child process (`tesseract <image> stdout -l <lang>`)
//! rather than linked, so the crate builds without leptonica/tesseract
//! headers and a missing engine degrades to a clear error instead of a link
//! failure. Each call is bounded by `ocr_timeout_secs`; the child is killed
//! when the timeout fires.

use crate::config::ConversionConfig;
use crate::error::Pdf2HtmlError;
use image::DynamicImage;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Stderr is truncated to this many characters in error messages.
const MAX_STDERR_CHARS: usize = 300;

/// OCR an image file and return the recognised plain text.
pub async fn ocr_image_file(path: &Path, config: &ConversionConfig) -> Result<String, Pdf2HtmlError> {
    let mut cmd = Command::new(&config.tesseract_cmd);
    cmd.arg(path)
        .arg("stdout")
        .arg("-l")
        .arg(&config.ocr_language)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Pdf2HtmlError::OcrUnavailable {
                command: config.tesseract_cmd.display().to_string(),
            }
        } else {
            Pdf2HtmlError::OcrFailed {
                path: path.to_path_buf(),
                detail: format!("cannot spawn tesseract: {e}"),
            }
        }
    })?;

    let secs = config.ocr_timeout_secs;
    let output = tokio::time::timeout(Duration::from_secs(secs), child.wait_with_output())
        .await
        .map_err(|_| Pdf2HtmlError::OcrTimeout {
            path: path.to_path_buf(),
            secs,
        })?
        .map_err(|e| Pdf2HtmlError::OcrFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail: String = stderr.trim().chars().take(MAX_STDERR_CHARS).collect();
        return Err(Pdf2HtmlError::OcrFailed {
            path: path.to_path_buf(),
            detail: if detail.is_empty() {
                format!("tesseract exited with {}", output.status)
            } else {
                detail
            },
        });
    }

    let text = String::from_utf8_lossy(&output.stdout).into_owned();
    debug!("OCR {} → {} chars", path.display(), text.len());
    Ok(text)
}

/// OCR rendered PDF pages one at a time.
///
/// Each page is PNG-encoded on the blocking pool into a temporary file,
/// which is removed when the call returns. Page texts are joined with
/// newlines in page order.
pub async fn ocr_rendered_pages(
    pages: Vec<(usize, DynamicImage)>,
    config: &ConversionConfig,
) -> Result<String, Pdf2HtmlError> {
    info!("OCR fallback over {} rendered pages", pages.len());
    let mut texts = Vec::with_capacity(pages.len());

    for (idx, img) in pages {
        let tmp = tempfile::Builder::new()
            .prefix("pdf2html-page-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| Pdf2HtmlError::Internal(format!("tempfile: {e}")))?;
        let png_path = tmp.path().to_path_buf();
        tokio::task::spawn_blocking(move || {
            img.save_with_format(&png_path, image::ImageFormat::Png)
        })
        .await
        .map_err(|e| Pdf2HtmlError::Internal(format!("PNG task panicked: {}", e)))?
        .map_err(|e| Pdf2HtmlError::RasterisationFailed {
            page: idx + 1,
            detail: format!("PNG write failed: {e}"),
        })?;
        texts.push(ocr_image_file(tmp.path(), config).await?);
    }

    Ok(texts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_unavailable() {
        let config = ConversionConfig::builder()
            .tesseract_cmd("/nonexistent/bin/tesseract-does-not-exist")
            .build()
            .unwrap();
        let err = ocr_image_file(Path::new("scan.png"), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2HtmlError::OcrUnavailable { .. }), "{err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_ocr_failure() {
        // `false` ignores its arguments and exits 1.
        let config = ConversionConfig::builder().tesseract_cmd("false").build().unwrap();
        let err = ocr_image_file(Path::new("scan.png"), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2HtmlError::OcrFailed { .. }), "{err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stdout_is_returned_as_text() {
        // `echo` stands in for tesseract: it prints its arguments.
        let config = ConversionConfig::builder().tesseract_cmd("echo").build().unwrap();
        let text = ocr_image_file(Path::new("scan.png"), &config).await.unwrap();
        assert_eq!(text.trim(), "scan.png stdout -l ind");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn rendered_pages_are_written_and_joined() {
        let config = ConversionConfig::builder().tesseract_cmd("echo").build().unwrap();
        let pages = vec![
            (0, DynamicImage::new_rgb8(8, 8)),
            (1, DynamicImage::new_rgb8(8, 8)),
        ];
        let text = ocr_rendered_pages(pages, &config).await.unwrap();

        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        assert_eq!(lines.len(), 2, "{text}");
        for line in lines {
            assert!(line.contains("pdf2html-page-"), "{line}");
            assert!(line.ends_with(".png stdout -l ind"), "{line}");
        }
    }
}
