//! Structure-preserving merge of per-unit documents.
//!
//! Merging is concatenation, nothing more: no semantic deduplication, no
//! re-leveling of headings, no cross-page paragraph joining. Layout-aware
//! stitching is explicitly not this crate's job; the element order of the
//! merged [`Document`] equals the flattened input order.

use crate::document::{Document, Element};

/// Concatenate the element sequences of `parts` in input order.
///
/// An empty input yields an empty `Document`. Treating that as a failure is
/// the caller's responsibility (the orchestrator maps it to
/// [`crate::error::Scan2DocError::NoTextDetected`]).
pub fn merge<I>(parts: I) -> Document
where
    I: IntoIterator<Item = Document>,
{
    let elements: Vec<Element> = parts.into_iter().flat_map(|doc| doc.elements).collect();
    Document { elements }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(texts: &[&str]) -> Document {
        texts.iter().map(|t| Element::paragraph(*t)).collect()
    }

    #[test]
    fn preserves_input_order() {
        let merged = merge([doc(&["a", "b"]), doc(&["c"]), doc(&["d", "e"])]);
        let texts: Vec<&str> = merged
            .elements
            .iter()
            .map(|el| match el {
                Element::Paragraph { text } => text.as_str(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(texts, ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn is_associative() {
        let (a, b, c) = (doc(&["a1", "a2"]), doc(&["b1"]), doc(&["c1", "c2"]));
        let nested = merge([merge([a.clone(), b.clone()]), c.clone()]);
        let flat = merge([a, b, c]);
        assert_eq!(nested, flat);
    }

    #[test]
    fn empty_input_yields_empty_document() {
        assert!(merge(std::iter::empty::<Document>()).is_empty());
    }

    #[test]
    fn empty_parts_contribute_nothing() {
        let merged = merge([Document::default(), doc(&["x"]), Document::default()]);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn does_not_deduplicate() {
        let merged = merge([doc(&["same"]), doc(&["same"])]);
        assert_eq!(merged.len(), 2);
    }
}
