//! Pipeline stages for the scan-to-document conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different OCR backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ rasterize ──▶ ocr ──▶ extract
//! (MIME)    (pdfium)     (text)  (elements)
//! ```
//!
//! 1. [`input`]     — classify uploaded files by declared MIME type and
//!    expand them into page-image units
//! 2. [`rasterize`] — render PDF pages to PNG; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 3. [`ocr`]       — detect raw text in one image; the first stage with
//!    network I/O
//! 4. [`extract`]   — turn raw text into structured elements via the
//!    language model, with a tolerant JSON parse

pub mod extract;
pub mod input;
pub mod ocr;
pub mod rasterize;
