//! Error types for the scan2doc library.
//!
//! One enum covers the whole pipeline. Variants fall into two groups:
//!
//! * **Request errors** — the caller sent something unconvertible (unknown
//!   output format, a file that is neither image nor PDF, an upload set that
//!   yields no text). Detected locally, returned before any renderer runs.
//!
//! * **Service errors** — an external collaborator (OCR, structure
//!   extraction, rasterization) failed mid-flight. The underlying message is
//!   passed through verbatim; the library never retries on its own.
//!
//! The HTTP layer uses [`Scan2DocError::is_user_error`] to split the two
//! groups into 400 and 500 responses.

use thiserror::Error;

/// All errors returned by the scan2doc library.
#[derive(Debug, Error)]
pub enum Scan2DocError {
    // ── Request errors ────────────────────────────────────────────────────
    /// Requested output format is not one of docx, pdf, txt.
    #[error("Unsupported format: {format}. Supported formats: docx, pdf, txt.")]
    UnsupportedFormat { format: String },

    /// An uploaded file's declared type is neither a supported image nor a PDF.
    #[error("Unsupported file type: {content_type}. Upload images or PDFs.")]
    UnsupportedFileType { content_type: String },

    /// The upload set produced no image units at all.
    #[error("No valid files uploaded.")]
    NoValidFiles,

    /// Every image unit came back from OCR with empty text.
    #[error("No text could be detected in any of the uploaded files.")]
    NoTextDetected,

    // ── Service errors ────────────────────────────────────────────────────
    /// The OCR service rejected the call or the transport failed.
    #[error("OCR service error: {message}")]
    OcrService { message: String },

    /// The structure-extraction reply could not be parsed into elements.
    #[error("Structure extraction returned unparseable output: {detail}")]
    StructureParse { detail: String },

    /// Generic collaborator or pipeline failure (rasterization, LLM
    /// transport, anything without a more specific variant).
    #[error("Processing failed: {message}")]
    Processing { message: String },

    // ── Setup errors ──────────────────────────────────────────────────────
    /// A collaborator client cannot be constructed (missing API key etc.).
    /// Raised at startup, never from a running conversion.
    #[error("{service} is not configured.\n{hint}")]
    NotConfigured { service: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (output packaging, content encoding).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Scan2DocError {
    /// True for errors caused by the request itself rather than by a
    /// collaborator or the pipeline. The HTTP layer maps these to 400.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Scan2DocError::UnsupportedFormat { .. }
                | Scan2DocError::UnsupportedFileType { .. }
                | Scan2DocError::NoValidFiles
                | Scan2DocError::NoTextDetected
        )
    }
}
