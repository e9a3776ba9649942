//! Structure extraction: raw OCR text → ordered document elements.
//!
//! The production backend is the Anthropic Messages API. The model is asked
//! for a single JSON object (see [`crate::prompts`]); because models
//! sometimes wrap replies in markdown fences or prose, parsing is tolerant:
//! it takes the substring from the first `{` to the last `}` before handing
//! it to serde. Normalisation of loose element kinds happens here and only
//! here — everything downstream sees well-formed [`Element`]s.

use crate::config::ConversionConfig;
use crate::document::{Document, Element};
use crate::error::Scan2DocError;
use crate::prompts::{extraction_user_message, STRUCTURE_SYSTEM_PROMPT};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const MESSAGES_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Turns one unit's raw text into a structured partial document.
#[async_trait]
pub trait StructureExtractor: Send + Sync {
    async fn extract_structure(&self, raw_text: &str) -> Result<Document, Scan2DocError>;
}

/// Anthropic Messages API client for structure extraction.
pub struct ClaudeExtractor {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl ClaudeExtractor {
    pub fn new(
        api_key: impl Into<String>,
        config: &ConversionConfig,
    ) -> Result<Self, Scan2DocError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Scan2DocError::Internal(format!("HTTP client build failed: {e}")))?;
        Ok(ClaudeExtractor {
            client,
            api_key: api_key.into(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| STRUCTURE_SYSTEM_PROMPT.to_string()),
        })
    }

    /// Read the API key from `ANTHROPIC_API_KEY`.
    pub fn from_env(config: &ConversionConfig) -> Result<Self, Scan2DocError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            Scan2DocError::NotConfigured {
                service: "Structure extraction".into(),
                hint: "Set the ANTHROPIC_API_KEY environment variable.".into(),
            }
        })?;
        Self::new(api_key, config)
    }
}

#[async_trait]
impl StructureExtractor for ClaudeExtractor {
    async fn extract_structure(&self, raw_text: &str) -> Result<Document, Scan2DocError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: &self.system_prompt,
            messages: vec![Message {
                role: "user",
                content: extraction_user_message(raw_text),
            }],
        };

        let response = self
            .client
            .post(MESSAGES_ENDPOINT)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| Scan2DocError::Processing {
                message: format!("structure extraction request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Scan2DocError::Processing {
                message: format!("structure extraction HTTP {status}: {detail}"),
            });
        }

        let parsed: MessagesResponse =
            response
                .json()
                .await
                .map_err(|e| Scan2DocError::Processing {
                    message: format!("unreadable extraction response: {e}"),
                })?;

        let reply = parsed
            .content
            .into_iter()
            .find(|block| block.block_type == "text")
            .map(|block| block.text)
            .ok_or_else(|| Scan2DocError::StructureParse {
                detail: "reply contained no text block".into(),
            })?;

        debug!("Extraction reply: {} chars", reply.len());
        parse_structure(&reply)
    }
}

/// Parse a model reply into a [`Document`], tolerating fences and prose
/// around the JSON object.
pub fn parse_structure(reply: &str) -> Result<Document, Scan2DocError> {
    let start = reply.find('{');
    let end = reply.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &reply[s..=e],
        _ => {
            return Err(Scan2DocError::StructureParse {
                detail: "no JSON object in reply".into(),
            })
        }
    };

    let raw: RawStructure =
        serde_json::from_str(json).map_err(|e| Scan2DocError::StructureParse {
            detail: e.to_string(),
        })?;

    Ok(raw.elements.into_iter().map(normalize).collect())
}

/// Map one loose wire element onto the closed [`Element`] set. Unknown or
/// missing kinds degrade to paragraphs, absent fields to empty content.
fn normalize(raw: RawElement) -> Element {
    let text = raw.text.unwrap_or_default();
    match raw.kind.as_deref() {
        Some("heading1") => Element::heading(1, text),
        Some("heading2") => Element::heading(2, text),
        Some("heading3") => Element::heading(3, text),
        Some("bullet_list") => Element::bullet_list(raw.items.unwrap_or_default()),
        Some("numbered_list") => Element::numbered_list(raw.items.unwrap_or_default()),
        _ => Element::paragraph(text),
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct RawStructure {
    #[serde(default)]
    elements: Vec<RawElement>,
}

#[derive(Deserialize)]
struct RawElement {
    #[serde(rename = "type")]
    kind: Option<String>,
    text: Option<String>,
    items: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_clean_reply() {
        let doc = parse_structure(
            r#"{"elements":[
                {"type":"heading1","text":"Title"},
                {"type":"paragraph","text":"Body."},
                {"type":"bullet_list","items":["a","b"]},
                {"type":"numbered_list","items":["x"]}]}"#,
        )
        .unwrap();
        assert_eq!(
            doc.elements,
            vec![
                Element::heading(1, "Title"),
                Element::paragraph("Body."),
                Element::bullet_list(["a", "b"]),
                Element::numbered_list(["x"]),
            ]
        );
    }

    #[test]
    fn recovers_json_from_markdown_fences() {
        let reply = "Here you go:\n```json\n{\"elements\":[{\"type\":\"heading2\",\"text\":\"S\"}]}\n```\nLet me know!";
        let doc = parse_structure(reply).unwrap();
        assert_eq!(doc.elements, vec![Element::heading(2, "S")]);
    }

    #[test]
    fn unknown_kind_degrades_to_paragraph() {
        let doc = parse_structure(
            r#"{"elements":[
                {"type":"table","text":"cells"},
                {"text":"untyped"}]}"#,
        )
        .unwrap();
        assert_eq!(
            doc.elements,
            vec![Element::paragraph("cells"), Element::paragraph("untyped")]
        );
    }

    #[test]
    fn missing_fields_become_empty_content() {
        let doc = parse_structure(
            r#"{"elements":[
                {"type":"bullet_list"},
                {"type":"heading3"},
                {"type":"paragraph"}]}"#,
        )
        .unwrap();
        assert_eq!(
            doc.elements,
            vec![
                Element::bullet_list(Vec::<String>::new()),
                Element::heading(3, ""),
                Element::paragraph(""),
            ]
        );
    }

    #[test]
    fn no_elements_key_is_an_empty_document() {
        assert!(parse_structure("{}").unwrap().is_empty());
        assert!(parse_structure(r#"{"elements":[]}"#).unwrap().is_empty());
    }

    #[test]
    fn junk_replies_fail_as_structure_parse() {
        for reply in ["", "I could not read the page.", "{broken", "}{"] {
            assert!(
                matches!(
                    parse_structure(reply),
                    Err(Scan2DocError::StructureParse { .. })
                ),
                "accepted junk: {reply:?}"
            );
        }
    }

    #[test]
    fn request_body_shape() {
        let body = MessagesRequest {
            model: "claude-3-haiku-20240307",
            max_tokens: 4096,
            system: "sys",
            messages: vec![Message {
                role: "user",
                content: "hello".into(),
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "claude-3-haiku-20240307");
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
