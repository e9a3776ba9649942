//! Output types: the format table, filename derivation, and conversion results.

use crate::error::Scan2DocError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The three supported output formats.
///
/// The enum is the only place the format table lives; the media type and
/// extension accessors below are the contract the HTTP layer serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Office Open XML word-processing document. (default)
    #[default]
    Docx,
    /// Single PDF with automatic page breaks.
    Pdf,
    /// UTF-8 plain text.
    Txt,
}

impl OutputFormat {
    /// The canonical media type served with a rendered document.
    pub fn media_type(&self) -> &'static str {
        match self {
            OutputFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Txt => "text/plain; charset=utf-8",
        }
    }

    /// The canonical file extension, dot included.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Docx => ".docx",
            OutputFormat::Pdf => ".pdf",
            OutputFormat::Txt => ".txt",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Docx => "docx",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Txt => "txt",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Scan2DocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "docx" => Ok(OutputFormat::Docx),
            "pdf" => Ok(OutputFormat::Pdf),
            "txt" => Ok(OutputFormat::Txt),
            other => Err(Scan2DocError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

/// Derive the download filename from the first uploaded file's base name.
///
/// `total_files` counts uploaded files, not image units: a three-page PDF is
/// still one file. With more than one file the name gains an
/// `_and_{K}_more` suffix so the download hints at what was merged.
pub fn output_filename(first_filename: &str, total_files: usize, format: OutputFormat) -> String {
    let stem = Path::new(first_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("document");

    let mut name = stem.to_string();
    if total_files > 1 {
        name.push_str(&format!("_and_{}_more", total_files - 1));
    }
    name.push_str(format.extension());
    name
}

/// The result of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// The rendered document.
    pub bytes: Vec<u8>,
    /// Download filename, extension included.
    pub filename: String,
    /// Media type matching `format`.
    pub media_type: &'static str,
    /// The format that was rendered.
    pub format: OutputFormat,
    /// Pipeline statistics.
    pub stats: ConversionStats,
}

/// Statistics collected over one conversion request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Image units derived from the upload set (uploaded images plus
    /// rasterised PDF pages).
    pub units_total: usize,
    /// Units OCR returned no text for (silently skipped).
    pub units_skipped: usize,
    /// Elements in the merged document.
    pub element_count: usize,
    /// Wall-clock time spent in OCR + structure extraction.
    pub extract_duration_ms: u64,
    /// Wall-clock time spent rendering the output document.
    pub render_duration_ms: u64,
    /// End-to-end duration.
    pub total_duration_ms: u64,
}
