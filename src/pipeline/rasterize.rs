//! PDF rasterisation: render every page of an uploaded PDF to a PNG unit.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread designed for blocking operations, preventing the Tokio worker
//! threads from stalling during CPU-heavy rendering.
//!
//! ## Why cap pixels, not DPI?
//!
//! Page sizes vary wildly: an A0 poster at 200 DPI would produce a
//! 6,600 × 9,300 px image. `max_rendered_pixels` caps the longest edge
//! regardless of physical size, keeping memory bounded while staying well
//! above what OCR needs to resolve body text.
//!
//! ## Why PNG?
//!
//! Lossless compression preserves text crispness. JPEG artefacts on rendered
//! text confuse OCR and degrade accuracy at low DPI.

use crate::error::Scan2DocError;
use async_trait::async_trait;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Cursor;
use tracing::debug;

/// Expands a PDF into one PNG image per page.
///
/// Object-safe so conversions can swap in a fake during tests; page order in
/// the returned vector is document order.
#[async_trait]
pub trait PageRasterizer: Send + Sync {
    async fn extract_page_images(&self, pdf: &[u8]) -> Result<Vec<Vec<u8>>, Scan2DocError>;
}

/// The production rasterizer, backed by pdfium.
pub struct PdfiumRasterizer {
    dpi: u32,
    max_rendered_pixels: u32,
}

impl PdfiumRasterizer {
    pub fn new(dpi: u32, max_rendered_pixels: u32) -> Self {
        PdfiumRasterizer {
            dpi,
            max_rendered_pixels,
        }
    }
}

#[async_trait]
impl PageRasterizer for PdfiumRasterizer {
    async fn extract_page_images(&self, pdf: &[u8]) -> Result<Vec<Vec<u8>>, Scan2DocError> {
        let bytes = pdf.to_vec();
        let dpi = self.dpi;
        let max_pixels = self.max_rendered_pixels;

        tokio::task::spawn_blocking(move || rasterize_blocking(&bytes, dpi, max_pixels))
            .await
            .map_err(|e| Scan2DocError::Internal(format!("Rasterize task panicked: {e}")))?
    }
}

/// Blocking implementation of page rasterisation.
fn rasterize_blocking(
    pdf: &[u8],
    dpi: u32,
    max_pixels: u32,
) -> Result<Vec<Vec<u8>>, Scan2DocError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_byte_slice(pdf, None)
        .map_err(|e| Scan2DocError::Processing {
            message: format!("Failed to open PDF: {e:?}"),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    debug!("PDF loaded: {} pages", total_pages);

    let mut units = Vec::with_capacity(total_pages);

    for (idx, page) in pages.iter().enumerate() {
        // Scale the page to the requested DPI, clamped so oversized pages
        // cannot blow up memory. PDF points are 1/72 inch.
        let target_width = (page.width().value * dpi as f32 / 72.0) as i32;
        let target_width = target_width.min(max_pixels as i32).max(1);

        let render_config = PdfRenderConfig::new()
            .set_target_width(target_width)
            .set_maximum_height(max_pixels as i32);

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| Scan2DocError::Processing {
                    message: format!("Failed to rasterize PDF page {}: {e:?}", idx + 1),
                })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        units.push(encode_png(&image, idx)?);
    }

    Ok(units)
}

fn encode_png(image: &DynamicImage, page_idx: usize) -> Result<Vec<u8>, Scan2DocError> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| Scan2DocError::Processing {
            message: format!("Failed to encode page {} as PNG: {e}", page_idx + 1),
        })?;
    Ok(buf)
}
