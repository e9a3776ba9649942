//! Plain-text rendering.
//!
//! Headings become `#`-prefixed lines, list items keep a two-space indent,
//! and every block is followed by one blank line. Every emitted line is
//! newline-terminated, so output for `[heading("Title"), bullets(A, B)]` is
//! exactly `"# Title\n\n  - A\n  - B\n\n"`.

use crate::document::{Document, Element};

/// Render `doc` as UTF-8 plain text.
pub fn render(doc: &Document) -> String {
    let mut out = String::new();

    for element in &doc.elements {
        match element {
            Element::Heading { level, text } => {
                for _ in 0..*level {
                    out.push('#');
                }
                out.push(' ');
                out.push_str(text);
                out.push('\n');
                out.push('\n');
            }
            Element::BulletList { items } => {
                for item in items {
                    out.push_str("  - ");
                    out.push_str(item);
                    out.push('\n');
                }
                out.push('\n');
            }
            Element::NumberedList { items } => {
                for (idx, item) in items.iter().enumerate() {
                    out.push_str(&format!("  {}. {}\n", idx + 1, item));
                }
                out.push('\n');
            }
            Element::Paragraph { text } => {
                out.push_str(text);
                out.push('\n');
                out.push('\n');
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_and_bullets_exact_bytes() {
        let doc = Document::new(vec![
            Element::heading(1, "Title"),
            Element::bullet_list(["A", "B"]),
        ]);
        assert_eq!(render(&doc), "# Title\n\n  - A\n  - B\n\n");
    }

    #[test]
    fn heading_levels() {
        let doc = Document::new(vec![
            Element::heading(1, "One"),
            Element::heading(2, "Two"),
            Element::heading(3, "Three"),
        ]);
        assert_eq!(render(&doc), "# One\n\n## Two\n\n### Three\n\n");
    }

    #[test]
    fn numbered_items_are_one_based() {
        let doc = Document::new(vec![Element::numbered_list(["first", "second", "third"])]);
        assert_eq!(render(&doc), "  1. first\n  2. second\n  3. third\n\n");
    }

    #[test]
    fn paragraph_followed_by_blank_line() {
        let doc = Document::new(vec![Element::paragraph("Some text.")]);
        assert_eq!(render(&doc), "Some text.\n\n");
    }

    #[test]
    fn empty_list_produces_only_the_block_separator() {
        let doc = Document::new(vec![Element::bullet_list(Vec::<String>::new())]);
        assert_eq!(render(&doc), "\n");
    }

    #[test]
    fn empty_document_is_empty_string() {
        assert_eq!(render(&Document::default()), "");
    }
}
