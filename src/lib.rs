//! # scan2doc
//!
//! Convert scanned images and PDFs into structured documents (DOCX, PDF, or
//! plain text).
//!
//! ## Why this crate?
//!
//! A photographed or scanned page is just pixels: OCR alone gives back a
//! wall of undifferentiated text. This crate pairs OCR with a language model
//! that reconstructs the page's structure — headings, paragraphs, bulleted
//! and numbered lists — and then renders that structure natively in the
//! requested output format, so a scanned report comes back as an editable
//! Word file with real heading styles and list numbering.
//!
//! ## Pipeline Overview
//!
//! ```text
//! images / PDFs
//!  │
//!  ├─ 1. Input      classify by declared MIME type, reject the rest
//!  ├─ 2. Rasterize  PDF pages → PNG via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. OCR        Google Vision text detection, one call per unit
//!  ├─ 4. Extract    Anthropic Messages → element JSON, tolerant parse
//!  ├─ 5. Merge      concatenate partial documents in unit order
//!  └─ 6. Render     DOCX (docx-rs) / PDF (lopdf) / plain text
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scan2doc::{ConversionConfig, Converter, InputFile, OutputFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Keys read from GOOGLE_VISION_API_KEY and ANTHROPIC_API_KEY
//!     let converter = Converter::from_env(ConversionConfig::default())?;
//!     let files = vec![InputFile {
//!         bytes: std::fs::read("scan.png")?,
//!         content_type: "image/png".into(),
//!         filename: "scan.png".into(),
//!     }];
//!     let output = converter.convert(&files, OutputFormat::Docx).await?;
//!     std::fs::write(&output.filename, &output.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | Enables the `scan2doc` binary (clap + anyhow + tracing-subscriber) |
//! | `server` | off     | Enables the `scan2doc-server` binary (axum multipart HTTP API) |
//!
//! Disable default features when using only the library:
//! ```toml
//! scan2doc = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod render;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{Converter, InputFile};
pub use document::{Document, Element};
pub use error::Scan2DocError;
pub use merge::merge;
pub use output::{ConversionOutput, ConversionStats, OutputFormat};
pub use pipeline::extract::StructureExtractor;
pub use pipeline::ocr::TextDetector;
pub use pipeline::rasterize::PageRasterizer;
