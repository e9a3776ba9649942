//! CLI binary for scan2doc.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, reads the input files, and writes the result.

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use scan2doc::{ConversionConfig, Converter, InputFile, OutputFormat};
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One scanned page to Word
  scan2doc scan.png

  # A whole scanned report (images + PDFs, merged in argument order)
  scan2doc cover.jpg body.pdf appendix.png -o report.docx

  # Searchable PDF output
  scan2doc -f pdf scan1.png scan2.png

  # Plain text, custom model
  scan2doc -f txt --model claude-3-haiku-20240307 notes.jpg

SUPPORTED INPUTS:
  Images: jpg, jpeg, png, webp, gif, bmp, tif, tiff
  PDFs:   every page is rasterised and read like a scanned image

ENVIRONMENT VARIABLES:
  GOOGLE_VISION_API_KEY   Google Cloud Vision API key (OCR)
  ANTHROPIC_API_KEY       Anthropic API key (structure extraction)

SETUP:
  1. export GOOGLE_VISION_API_KEY=...
  2. export ANTHROPIC_API_KEY=sk-ant-...
  3. scan2doc scan.png -o out.docx
"#;

/// Convert scanned images and PDFs to structured DOCX, PDF, or text.
#[derive(Parser, Debug)]
#[command(
    name = "scan2doc",
    version,
    about = "Convert scanned images and PDFs to structured DOCX, PDF, or text",
    long_about = "Convert scanned pages (images or PDFs) into structured documents. \
Each page is OCR'd with Google Cloud Vision, its structure (headings, paragraphs, \
lists) is reconstructed with an Anthropic model, and the result is rendered as a \
native DOCX, PDF, or plain-text file.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input files (images and/or PDFs), merged in argument order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output format: docx, pdf, or txt.
    #[arg(short, long, env = "SCAN2DOC_FORMAT", default_value = "docx")]
    format: String,

    /// Write output to this path instead of the derived filename.
    #[arg(short, long, env = "SCAN2DOC_OUTPUT")]
    output: Option<PathBuf>,

    /// Structure-extraction model ID.
    #[arg(long, env = "SCAN2DOC_MODEL")]
    model: Option<String>,

    /// PDF rasterisation DPI (72–400).
    #[arg(long, env = "SCAN2DOC_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Number of concurrent OCR/extraction calls.
    #[arg(short, long, env = "SCAN2DOC_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Max model output tokens per page.
    #[arg(long, env = "SCAN2DOC_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: u32,

    /// Path to a text file containing a custom extraction system prompt.
    #[arg(long, env = "SCAN2DOC_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "SCAN2DOC_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SCAN2DOC_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SCAN2DOC_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let format = OutputFormat::from_str(&cli.format).map_err(|e| anyhow::anyhow!("{e}"))?;

    // ── Build config and converter ───────────────────────────────────────
    let system_prompt = match cli.system_prompt {
        Some(ref path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {}", path.display()))?,
        ),
        None => None,
    };

    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .concurrency(cli.concurrency)
        .max_tokens(cli.max_tokens)
        .request_timeout_secs(cli.timeout);
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(prompt) = system_prompt {
        builder = builder.system_prompt(prompt);
    }
    let config = builder.build().context("Invalid configuration")?;

    let converter = Converter::from_env(config)?;

    // ── Read inputs ──────────────────────────────────────────────────────
    let mut files = Vec::with_capacity(cli.inputs.len());
    for path in &cli.inputs {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let content_type = content_type_for(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        files.push(InputFile {
            bytes,
            content_type: content_type.to_string(),
            filename,
        });
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let spinner = if cli.quiet {
        None
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix("Converting");
        bar.set_message(format!("{} file(s) → {format}", files.len()));
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    };

    let result = converter.convert(&files, format).await;

    if let Some(ref bar) = spinner {
        bar.finish_and_clear();
    }
    let output = result.context("Conversion failed")?;

    // ── Write output atomically (temp file + rename) ─────────────────────
    let output_path = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&output.filename));
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    let tmp_path = output_path.with_extension(format!("{}.tmp", format.as_str()));
    tokio::fs::write(&tmp_path, &output.bytes)
        .await
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    tokio::fs::rename(&tmp_path, &output_path)
        .await
        .with_context(|| format!("Failed to move output to {}", output_path.display()))?;

    if !cli.quiet {
        let stats = &output.stats;
        eprintln!(
            "{}  {} element(s) from {}/{} unit(s)  {}ms  →  {}",
            green("✔"),
            stats.element_count,
            stats.units_total - stats.units_skipped,
            stats.units_total,
            stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
        if stats.units_skipped > 0 {
            eprintln!(
                "   {}",
                dim(&format!("{} unit(s) had no detectable text", stats.units_skipped))
            );
        }
    }

    Ok(())
}

/// Infer the declared content type from the file extension.
fn content_type_for(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    Ok(match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "pdf" => "application/pdf",
        other => bail!(
            "Unsupported input extension '.{other}' for {}. \
             Supported: jpg, jpeg, png, webp, gif, bmp, tif, tiff, pdf",
            path.display()
        ),
    })
}
