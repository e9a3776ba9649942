//! Text detection: one image in, raw OCR text out.
//!
//! The production backend is the Google Cloud Vision `images:annotate`
//! endpoint in `TEXT_DETECTION` mode. The first annotation in the response
//! is the full-image transcription; per-word boxes that follow it are
//! ignored. A page with no detectable text is not an error — it yields an
//! empty string and the caller decides what that means for the conversion.

use crate::error::Scan2DocError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const VISION_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Detects the raw text in a single image unit.
///
/// Object-safe so conversions can run against a fake in tests.
#[async_trait]
pub trait TextDetector: Send + Sync {
    async fn detect_text(&self, image: &[u8]) -> Result<String, Scan2DocError>;
}

/// Google Cloud Vision OCR client.
pub struct GoogleVisionOcr {
    client: reqwest::Client,
    api_key: String,
}

impl GoogleVisionOcr {
    pub fn new(
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, Scan2DocError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Scan2DocError::Internal(format!("HTTP client build failed: {e}")))?;
        Ok(GoogleVisionOcr {
            client,
            api_key: api_key.into(),
        })
    }

    /// Read the API key from `GOOGLE_VISION_API_KEY`.
    pub fn from_env(timeout: Duration) -> Result<Self, Scan2DocError> {
        let api_key = std::env::var("GOOGLE_VISION_API_KEY").map_err(|_| {
            Scan2DocError::NotConfigured {
                service: "Google Vision OCR".into(),
                hint: "Set the GOOGLE_VISION_API_KEY environment variable.".into(),
            }
        })?;
        Self::new(api_key, timeout)
    }
}

#[async_trait]
impl TextDetector for GoogleVisionOcr {
    async fn detect_text(&self, image: &[u8]) -> Result<String, Scan2DocError> {
        let body = AnnotateRequest {
            requests: vec![ImageRequest {
                image: ImageContent {
                    content: STANDARD.encode(image),
                },
                features: vec![Feature {
                    feature_type: "TEXT_DETECTION".into(),
                }],
            }],
        };

        let response = self
            .client
            .post(VISION_ENDPOINT)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| Scan2DocError::OcrService {
                message: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Scan2DocError::OcrService {
                message: format!("HTTP {status}: {}", truncate(&detail, 200)),
            });
        }

        let parsed: AnnotateResponse =
            response
                .json()
                .await
                .map_err(|e| Scan2DocError::OcrService {
                    message: format!("unreadable response: {e}"),
                })?;

        let text = first_annotation(parsed)?;
        debug!("OCR detected {} chars", text.len());
        Ok(text)
    }
}

/// Pull the full-image transcription out of an annotate response.
fn first_annotation(parsed: AnnotateResponse) -> Result<String, Scan2DocError> {
    let first = parsed
        .responses
        .into_iter()
        .next()
        .ok_or_else(|| Scan2DocError::OcrService {
            message: "empty annotate response".into(),
        })?;

    if let Some(error) = first.error {
        return Err(Scan2DocError::OcrService {
            message: error.message,
        });
    }

    Ok(first
        .text_annotations
        .into_iter()
        .next()
        .map(|a| a.description)
        .unwrap_or_default())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct AnnotateRequest {
    requests: Vec<ImageRequest>,
}

#[derive(Serialize)]
struct ImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: String,
}

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct TextAnnotation {
    description: String,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<String, Scan2DocError> {
        first_annotation(serde_json::from_str(json).expect("fixture parses"))
    }

    #[test]
    fn full_transcription_is_first_annotation() {
        let text = parse(
            r#"{"responses":[{"textAnnotations":[
                {"description":"Invoice\nTotal: 42"},
                {"description":"Invoice"},
                {"description":"Total:"}]}]}"#,
        )
        .unwrap();
        assert_eq!(text, "Invoice\nTotal: 42");
    }

    #[test]
    fn no_annotations_means_empty_text_not_error() {
        assert_eq!(parse(r#"{"responses":[{}]}"#).unwrap(), "");
        assert_eq!(
            parse(r#"{"responses":[{"textAnnotations":[]}]}"#).unwrap(),
            ""
        );
    }

    #[test]
    fn per_image_error_surfaces_as_ocr_service() {
        let err = parse(
            r#"{"responses":[{"error":{"code":7,"message":"quota exceeded"}}]}"#,
        )
        .unwrap_err();
        match err {
            Scan2DocError::OcrService { message } => assert!(message.contains("quota exceeded")),
            other => panic!("wrong error: {other}"),
        }
    }

    #[test]
    fn empty_responses_array_is_an_error() {
        assert!(matches!(
            parse(r#"{"responses":[]}"#),
            Err(Scan2DocError::OcrService { .. })
        ));
    }

    #[test]
    fn request_body_shape() {
        let body = AnnotateRequest {
            requests: vec![ImageRequest {
                image: ImageContent {
                    content: STANDARD.encode(b"pixels"),
                },
                features: vec![Feature {
                    feature_type: "TEXT_DETECTION".into(),
                }],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["requests"][0]["features"][0]["type"], "TEXT_DETECTION");
        assert_eq!(json["requests"][0]["image"]["content"], STANDARD.encode(b"pixels"));
    }
}
