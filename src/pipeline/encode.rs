//! Image encoding for the vision path: `DynamicImage` → base64 PNG
//! wrapped in `ImageData`.
//!
//! PNG keeps rendered text crisp; `detail: "high"` asks GPT-4-class models to
//! tile the image at full resolution so small print survives.

use crate::error::Pdf2HtmlError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Encode an image as a base64 PNG ready for the vision API.
pub fn encode_page(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded image → {} bytes base64", b64.len());

    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}

/// Decode an uploaded image and shrink it so neither side exceeds
/// `max_pixels`. Smaller images are returned unchanged.
pub fn load_image(path: &Path, max_pixels: u32) -> Result<DynamicImage, Pdf2HtmlError> {
    let img = image::open(path).map_err(|e| Pdf2HtmlError::ImageDecodeFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    Ok(fit_within(img, max_pixels))
}

fn fit_within(img: DynamicImage, max_pixels: u32) -> DynamicImage {
    if img.width() <= max_pixels && img.height() <= max_pixels {
        return img;
    }
    debug!(
        "Downscaling {}x{} to fit {} px",
        img.width(),
        img.height(),
        max_pixels
    );
    img.resize(max_pixels, max_pixels, image::imageops::FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_small_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let data = encode_page(&img).expect("encode should succeed");
        assert_eq!(data.mime_type, "image/png");
        let decoded = STANDARD.decode(&data.data).expect("valid base64");
        assert_eq!(&decoded[1..4], b"PNG");
    }

    #[test]
    fn large_image_is_downscaled_keeping_aspect() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(400, 200));
        let out = fit_within(img, 100);
        assert_eq!((out.width(), out.height()), (100, 50));
    }

    #[test]
    fn small_image_is_untouched() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(40, 20));
        let out = fit_within(img, 100);
        assert_eq!((out.width(), out.height()), (40, 20));
    }

    #[test]
    fn garbage_file_fails_to_decode() {
        let mut tmp = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        std::io::Write::write_all(&mut tmp, b"definitely not a png").unwrap();
        let err = load_image(tmp.path(), 100).unwrap_err();
        assert!(matches!(err, Pdf2HtmlError::ImageDecodeFailed { .. }));
    }
}
