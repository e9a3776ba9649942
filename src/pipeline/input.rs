//! Input classification: declared MIME type → image units.
//!
//! Files are classified by the content type the client declared, never by
//! sniffing bytes. An image file contributes one unit (its bytes as-is); a
//! PDF contributes one unit per page via the rasterizer. Classification runs
//! for the whole upload set before any expansion, so one mislabelled file
//! rejects the request before a single page is rendered or an OCR call made.

use crate::convert::InputFile;
use crate::error::Scan2DocError;
use crate::pipeline::rasterize::PageRasterizer;
use tracing::debug;

/// Image content types the OCR backend accepts.
pub const ALLOWED_IMAGE_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/bmp",
    "image/tiff",
];

pub const PDF_TYPE: &str = "application/pdf";

/// What an uploaded file is, per its declared content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Image,
    Pdf,
}

/// Strip MIME parameters and case: `"Image/PNG; charset=binary"` → `"image/png"`.
pub fn normalize_content_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Classify a declared content type, rejecting anything that is neither a
/// supported image nor a PDF.
pub fn classify(content_type: &str) -> Result<FileClass, Scan2DocError> {
    let normalized = normalize_content_type(content_type);
    if ALLOWED_IMAGE_TYPES.contains(&normalized.as_str()) {
        Ok(FileClass::Image)
    } else if normalized == PDF_TYPE {
        Ok(FileClass::Pdf)
    } else {
        Err(Scan2DocError::UnsupportedFileType {
            content_type: normalized,
        })
    }
}

/// Expand the upload set into an ordered list of image units.
///
/// Unit order follows file order; a PDF's pages land contiguously at the
/// file's position. The whole set is classified up front, so no rasterization
/// happens if any file has an unsupported type.
pub async fn collect_image_units(
    files: &[InputFile],
    rasterizer: &dyn PageRasterizer,
) -> Result<Vec<Vec<u8>>, Scan2DocError> {
    let classes = files
        .iter()
        .map(|f| classify(&f.content_type))
        .collect::<Result<Vec<_>, _>>()?;

    let mut units = Vec::with_capacity(files.len());
    for (file, class) in files.iter().zip(&classes) {
        match class {
            FileClass::Image => units.push(file.bytes.clone()),
            FileClass::Pdf => {
                let pages = rasterizer.extract_page_images(&file.bytes).await?;
                debug!("Expanded {} into {} page units", file.filename, pages.len());
                units.extend(pages);
            }
        }
    }

    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeRasterizer {
        pages_per_pdf: usize,
        calls: AtomicUsize,
    }

    impl FakeRasterizer {
        fn new(pages_per_pdf: usize) -> Self {
            FakeRasterizer {
                pages_per_pdf,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PageRasterizer for FakeRasterizer {
        async fn extract_page_images(&self, _pdf: &[u8]) -> Result<Vec<Vec<u8>>, Scan2DocError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((0..self.pages_per_pdf)
                .map(|p| format!("pdf{call}-page{p}").into_bytes())
                .collect())
        }
    }

    fn file(name: &str, content_type: &str, bytes: &[u8]) -> InputFile {
        InputFile {
            bytes: bytes.to_vec(),
            content_type: content_type.to_string(),
            filename: name.to_string(),
        }
    }

    #[test]
    fn normalization_strips_parameters_and_case() {
        assert_eq!(normalize_content_type("Image/PNG; charset=binary"), "image/png");
        assert_eq!(normalize_content_type("application/pdf"), "application/pdf");
        assert_eq!(normalize_content_type("  IMAGE/JPEG  "), "image/jpeg");
        assert_eq!(normalize_content_type(""), "");
    }

    #[test]
    fn classifies_every_allowed_image_type() {
        for ty in ALLOWED_IMAGE_TYPES {
            assert_eq!(classify(ty).unwrap(), FileClass::Image, "{ty}");
        }
        assert_eq!(classify("application/pdf").unwrap(), FileClass::Pdf);
    }

    #[test]
    fn rejects_by_declared_type_not_extension() {
        let err = classify("application/json").unwrap_err();
        match err {
            Scan2DocError::UnsupportedFileType { content_type } => {
                assert_eq!(content_type, "application/json");
            }
            other => panic!("wrong error: {other}"),
        }
        assert!(classify("text/plain").is_err());
        assert!(classify("image/svg+xml").is_err());
    }

    #[tokio::test]
    async fn units_follow_file_order_with_pdf_pages_inline() {
        let rasterizer = FakeRasterizer::new(2);
        let files = vec![
            file("a.png", "image/png", b"img-a"),
            file("b.pdf", "application/pdf", b"%PDF"),
            file("c.jpg", "image/jpeg", b"img-c"),
        ];
        let units = collect_image_units(&files, &rasterizer).await.unwrap();
        assert_eq!(
            units,
            vec![
                b"img-a".to_vec(),
                b"pdf0-page0".to_vec(),
                b"pdf0-page1".to_vec(),
                b"img-c".to_vec(),
            ]
        );
    }

    #[tokio::test]
    async fn bad_file_rejects_before_any_rasterization() {
        let rasterizer = FakeRasterizer::new(2);
        let files = vec![
            file("b.pdf", "application/pdf", b"%PDF"),
            file("evil.gif", "application/json", b"{}"),
        ];
        let err = collect_image_units(&files, &rasterizer).await.unwrap_err();
        assert!(matches!(err, Scan2DocError::UnsupportedFileType { .. }));
        assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 0);
    }
}
