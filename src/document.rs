//! The structured-document model shared by every renderer.
//!
//! [`Element`] is the common intermediate representation between OCR/LLM
//! output and the renderers. The union is closed: loosely-typed wire input
//! (optional `type`/`text`/`items` keys) is normalized into it at the
//! structure-extraction boundary ([`crate::pipeline::extract`]), so by the
//! time an `Element` exists it is already well-formed and renderers never
//! see an unknown kind.

use serde::{Deserialize, Serialize};

/// One structural unit of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    /// A heading at `level` 1 through 3.
    Heading { level: u8, text: String },
    /// A body paragraph. Also the fallback for unknown wire kinds.
    Paragraph { text: String },
    /// A flat bulleted list.
    BulletList { items: Vec<String> },
    /// A flat numbered list; items are numbered 1-based at render time.
    NumberedList { items: Vec<String> },
}

impl Element {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Element::Heading {
            level,
            text: text.into(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Element::Paragraph { text: text.into() }
    }

    pub fn bullet_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Element::BulletList {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn numbered_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Element::NumberedList {
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

/// An ordered sequence of [`Element`]s: one merged conversion result.
///
/// Flat by construction. Lists do not nest and headings carry no implicit
/// section hierarchy beyond their level number. Order is significant and
/// preserved end-to-end: file order, then page order within a file, then
/// element order as produced by structure extraction.
///
/// A `Document` lives in memory for the duration of one conversion request
/// and is discarded once the render step has produced output bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub elements: Vec<Element>,
}

impl Document {
    pub fn new(elements: Vec<Element>) -> Self {
        Document { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl From<Vec<Element>> for Document {
    fn from(elements: Vec<Element>) -> Self {
        Document { elements }
    }
}

impl FromIterator<Element> for Document {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        Document {
            elements: iter.into_iter().collect(),
        }
    }
}
