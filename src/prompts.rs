//! The structure-extraction system prompt.
//!
//! Centralised so the wire contract with the model lives in exactly one
//! place and can be inspected by unit tests without a live API call. Callers
//! can override it via [`crate::config::ConversionConfig::system_prompt`].

/// Default system prompt turning raw OCR text into the element JSON the
/// pipeline consumes.
///
/// The `type` tags named here are the wire contract that
/// [`crate::pipeline::extract`] normalises into [`crate::document::Element`];
/// change one and you must change the other.
pub const STRUCTURE_SYSTEM_PROMPT: &str = r#"You are a document reconstruction expert.
Your task is to take raw OCR text from a scanned page and reconstruct its structure into JSON that can be used to generate a document.

Identify:
- Headings (three levels)
- Paragraphs
- Lists (bulleted, numbered)

Return ONLY valid JSON with this structure:
{
    "elements": [
        {"type": "heading1", "text": "Title"},
        {"type": "paragraph", "text": "Some text..."},
        {"type": "bullet_list", "items": ["Item 1", "Item 2"]},
        {"type": "numbered_list", "items": ["First", "Second"]},
        {"type": "heading2", "text": "Section 2"}
    ]
}

Preserve the reading order of the page. Do not invent content that is not in the text. Do not wrap the JSON in markdown fences."#;

/// Build the user message wrapping one unit's OCR text.
pub fn extraction_user_message(raw_text: &str) -> String {
    format!("Here is the raw text:\n\n{raw_text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_every_wire_kind() {
        for kind in [
            "heading1",
            "heading2",
            "paragraph",
            "bullet_list",
            "numbered_list",
        ] {
            assert!(
                STRUCTURE_SYSTEM_PROMPT.contains(kind),
                "prompt is missing wire kind {kind}"
            );
        }
    }

    #[test]
    fn user_message_embeds_text() {
        let msg = extraction_user_message("hello page");
        assert!(msg.contains("hello page"));
        assert!(msg.starts_with("Here is the raw text:"));
    }
}
