//! The conversion orchestrator.
//!
//! [`Converter`] owns the three collaborators (OCR, structure extraction,
//! rasterization) behind object-safe traits, so tests and alternative
//! backends drop in without touching the pipeline. One call to
//! [`Converter::convert`] runs the whole flow: classify the upload set,
//! expand PDFs to page units, fan units out across OCR + extraction, merge
//! the partial documents in unit order, and render the requested format.
//!
//! ## Concurrency model
//!
//! Units are independent until the merge, so OCR and extraction run
//! concurrently via `buffer_unordered`, bounded by
//! [`ConversionConfig::concurrency`]. Completion order is arbitrary; each
//! unit carries its original index and results are re-sorted before merging,
//! so output order never depends on service latency.

use crate::config::ConversionConfig;
use crate::document::Document;
use crate::error::Scan2DocError;
use crate::merge::merge;
use crate::output::{output_filename, ConversionOutput, ConversionStats, OutputFormat};
use crate::pipeline::extract::{ClaudeExtractor, StructureExtractor};
use crate::pipeline::input;
use crate::pipeline::ocr::{GoogleVisionOcr, TextDetector};
use crate::pipeline::rasterize::{PageRasterizer, PdfiumRasterizer};
use crate::render;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// One uploaded file, as received from the caller.
///
/// `content_type` is the type the client declared; classification trusts it
/// and never sniffs `bytes`.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub filename: String,
}

/// The conversion service: collaborators plus configuration.
pub struct Converter {
    ocr: Arc<dyn TextDetector>,
    extractor: Arc<dyn StructureExtractor>,
    rasterizer: Arc<dyn PageRasterizer>,
    config: ConversionConfig,
}

impl Converter {
    /// Build a converter from explicit collaborators.
    pub fn new(
        ocr: Arc<dyn TextDetector>,
        extractor: Arc<dyn StructureExtractor>,
        rasterizer: Arc<dyn PageRasterizer>,
        config: ConversionConfig,
    ) -> Self {
        Converter {
            ocr,
            extractor,
            rasterizer,
            config,
        }
    }

    /// Build the production converter: Google Vision OCR and Anthropic
    /// structure extraction, keys read from the environment.
    ///
    /// # Errors
    /// [`Scan2DocError::NotConfigured`] when an API key is missing; nothing
    /// fails lazily at conversion time.
    pub fn from_env(config: ConversionConfig) -> Result<Self, Scan2DocError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let ocr = Arc::new(GoogleVisionOcr::from_env(timeout)?);
        let extractor = Arc::new(ClaudeExtractor::from_env(&config)?);
        let rasterizer = Arc::new(PdfiumRasterizer::new(
            config.dpi,
            config.max_rendered_pixels,
        ));
        Ok(Converter::new(ocr, extractor, rasterizer, config))
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Convert an upload set into one document in the requested format.
    ///
    /// # Errors
    /// Request errors ([`Scan2DocError::is_user_error`]) for an empty or
    /// mistyped upload set and for uploads where no unit yields any text;
    /// service errors when a collaborator fails mid-flight.
    pub async fn convert(
        &self,
        files: &[InputFile],
        format: OutputFormat,
    ) -> Result<ConversionOutput, Scan2DocError> {
        let total_start = Instant::now();
        info!(
            "Starting conversion: {} file(s) → {}",
            files.len(),
            format
        );

        // ── Step 1: Classify and expand to image units ───────────────────
        if files.is_empty() {
            return Err(Scan2DocError::NoValidFiles);
        }
        let units = input::collect_image_units(files, self.rasterizer.as_ref()).await?;
        if units.is_empty() {
            return Err(Scan2DocError::NoValidFiles);
        }
        let units_total = units.len();
        debug!("Upload set expanded to {} image unit(s)", units_total);

        // ── Step 2: OCR + structure extraction, fanned out per unit ─────
        let extract_start = Instant::now();
        let results: Vec<Result<(usize, Option<Document>), Scan2DocError>> =
            stream::iter(units.into_iter().enumerate().map(|(idx, image)| {
                let ocr = Arc::clone(&self.ocr);
                let extractor = Arc::clone(&self.extractor);
                async move {
                    let text = ocr.detect_text(&image).await?;
                    if text.trim().is_empty() {
                        debug!("Unit {} produced no text; skipping", idx + 1);
                        return Ok((idx, None));
                    }
                    let part = extractor.extract_structure(&text).await?;
                    Ok((idx, Some(part)))
                }
            }))
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;
        let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

        // Completion order is arbitrary; restore unit order before merging.
        let mut parts = Vec::with_capacity(results.len());
        for result in results {
            parts.push(result?);
        }
        parts.sort_by_key(|(idx, _)| *idx);

        let units_skipped = parts.iter().filter(|(_, part)| part.is_none()).count();
        let documents: Vec<Document> = parts.into_iter().filter_map(|(_, part)| part).collect();
        if documents.is_empty() {
            return Err(Scan2DocError::NoTextDetected);
        }

        // ── Step 3: Merge and render ─────────────────────────────────────
        let document = merge(documents);
        let element_count = document.len();

        let render_start = Instant::now();
        let bytes = render::render(format, &document)?;
        let render_duration_ms = render_start.elapsed().as_millis() as u64;

        let first_filename = files
            .first()
            .map(|f| f.filename.as_str())
            .unwrap_or_default();
        let filename = output_filename(first_filename, files.len(), format);

        let stats = ConversionStats {
            units_total,
            units_skipped,
            element_count,
            extract_duration_ms,
            render_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };

        info!(
            "Conversion complete: {} element(s) from {}/{} unit(s), {}ms total",
            element_count,
            units_total - units_skipped,
            units_total,
            stats.total_duration_ms
        );

        Ok(ConversionOutput {
            bytes,
            filename,
            media_type: format.media_type(),
            format,
            stats,
        })
    }
}
