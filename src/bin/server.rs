//! HTTP server binary for scan2doc.
//!
//! Exposes the converter over a small axum API:
//!
//! * `GET  /`        — health/identity probe
//! * `POST /convert` — multipart upload; `?output_format=docx|pdf|txt`
//!
//! The response to `/convert` is the rendered document itself, with
//! `Content-Type` and a `Content-Disposition` attachment filename derived
//! from the upload set. Request errors map to 400, collaborator failures
//! to 500, both as `{"error": "..."}` JSON.

use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use scan2doc::{ConversionConfig, Converter, InputFile, OutputFormat, Scan2DocError};
use serde::Deserialize;
use serde_json::json;
use std::io;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Uploads beyond this are rejected by axum before reaching the handler.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// HTTP API server for scan2doc.
#[derive(Parser, Debug)]
#[command(name = "scan2doc-server", version, about)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "SCAN2DOC_BIND", default_value = "0.0.0.0:8000")]
    bind: String,

    /// Structure-extraction model ID.
    #[arg(long, env = "SCAN2DOC_MODEL")]
    model: Option<String>,

    /// Concurrent OCR/extraction calls per request.
    #[arg(long, env = "SCAN2DOC_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SCAN2DOC_VERBOSE")]
    verbose: bool,
}

#[derive(Clone)]
struct AppState {
    converter: Arc<Converter>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let mut builder = ConversionConfig::builder().concurrency(cli.concurrency);
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    let config = builder.build().context("Invalid configuration")?;
    let converter = Converter::from_env(config).context("Converter setup failed")?;

    let state = AppState {
        converter: Arc::new(converter),
    };

    let app = Router::new()
        .route("/", get(health))
        .route("/convert", post(convert))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("Failed to bind {}", cli.bind))?;
    info!("scan2doc-server listening on {}", cli.bind);
    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "service": "scan2doc",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
    }))
}

#[derive(Deserialize)]
struct ConvertQuery {
    output_format: Option<String>,
}

async fn convert(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let format = match query.output_format {
        Some(ref raw) => OutputFormat::from_str(raw).map_err(AppError::Service)?,
        None => OutputFormat::default(),
    };

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        // Only file parts matter; other form fields are ignored.
        let Some(filename) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload {filename}: {e}")))?;
        files.push(InputFile {
            bytes: bytes.to_vec(),
            content_type,
            filename,
        });
    }

    let output = state
        .converter
        .convert(&files, format)
        .await
        .map_err(AppError::Service)?;

    info!(
        "Converted {} file(s) → {} ({} bytes)",
        files.len(),
        output.filename,
        output.bytes.len()
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, output.media_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", output.filename),
            ),
        ],
        output.bytes,
    )
        .into_response())
}

/// Error envelope for the HTTP surface.
enum AppError {
    /// A library error; status follows [`Scan2DocError::is_user_error`].
    Service(Scan2DocError),
    /// The request body itself was unreadable.
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Service(err) => {
                let status = if err.is_user_error() {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (status, err.to_string())
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
