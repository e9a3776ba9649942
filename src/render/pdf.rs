//! PDF rendering via `lopdf`.
//!
//! Pages are A4 portrait and the layout model works in millimetres, fpdf
//! style: a cursor moves down the page, wrapped multi-line cells emit one
//! text run per line, and a new page opens automatically when a line would
//! cross the bottom margin. Text uses the Helvetica / Helvetica-Bold core
//! fonts with WinAnsi encoding, so no font embedding is needed; wrapping
//! measures runs with the standard AFM advance widths.
//!
//! The numeric constants below are the visual contract callers rely on for
//! output-compatibility testing. Do not tune them.

use crate::document::{Document, Element};
use crate::error::Scan2DocError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream, StringFormat};
use std::io::Cursor;

// ── Visual contract (mm unless noted) ────────────────────────────────────

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;

const BODY_SIZE: f32 = 11.0; // pt
const BODY_LINE: f32 = 7.0;
const PARAGRAPH_GAP: f32 = 2.0;

const HEADING_SIZES: [f32; 3] = [22.0, 18.0, 14.0]; // pt, levels 1..=3
const HEADING_LINE: f32 = 10.0;
const HEADING_GAP_BEFORE: f32 = 4.0;
const HEADING_GAP_AFTER: f32 = 2.0;

const LIST_INDENT: f32 = 10.0;

const MM_TO_PT: f32 = 72.0 / 25.4;
const PT_TO_MM: f32 = 25.4 / 72.0;

// A4 in points, for the MediaBox.
const PAGE_WIDTH_PT: f32 = 595.28;
const PAGE_HEIGHT_PT: f32 = 841.89;

/// Render `doc` as a single PDF.
pub fn render(doc: &Document) -> Result<Vec<u8>, Scan2DocError> {
    let mut composer = PageComposer::new();

    for element in &doc.elements {
        match element {
            Element::Heading { level, text } => {
                let size = HEADING_SIZES[(*level).clamp(1, 3) as usize - 1];
                composer.advance(HEADING_GAP_BEFORE);
                composer.multi_cell(0.0, Font::Bold, size, HEADING_LINE, text);
                composer.advance(HEADING_GAP_AFTER);
            }
            Element::BulletList { items } => {
                for item in items {
                    let line = format!("\u{2022}  {item}");
                    composer.multi_cell(LIST_INDENT, Font::Body, BODY_SIZE, BODY_LINE, &line);
                }
            }
            Element::NumberedList { items } => {
                for (idx, item) in items.iter().enumerate() {
                    let line = format!("{}.  {item}", idx + 1);
                    composer.multi_cell(LIST_INDENT, Font::Body, BODY_SIZE, BODY_LINE, &line);
                }
            }
            Element::Paragraph { text } => {
                composer.multi_cell(0.0, Font::Body, BODY_SIZE, BODY_LINE, text);
                composer.advance(PARAGRAPH_GAP);
            }
        }
    }

    build_document(composer.finish())
}

// ── Page composition ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Body,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Body => "F1",
            Font::Bold => "F2",
        }
    }
}

/// Cursor-based page builder. `y` is measured from the top edge in mm;
/// conversion to PDF's bottom-left coordinate space happens when a text run
/// is emitted.
struct PageComposer {
    finished: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f32,
}

impl PageComposer {
    fn new() -> Self {
        PageComposer {
            finished: Vec::new(),
            ops: Vec::new(),
            y: MARGIN,
        }
    }

    /// Move the cursor down without emitting anything. Gaps never trigger a
    /// page break on their own; the next line does.
    fn advance(&mut self, gap: f32) {
        self.y += gap;
    }

    fn break_page(&mut self) {
        self.finished.push(std::mem::take(&mut self.ops));
        self.y = MARGIN;
    }

    /// Emit a wrapped cell at `indent` mm past the left margin. The indent
    /// is preserved across wrapped lines and across automatic page breaks.
    fn multi_cell(&mut self, indent: f32, font: Font, size: f32, line_height: f32, text: &str) {
        let x = MARGIN + indent;
        let max_width = PAGE_WIDTH - MARGIN - x;

        for paragraph_line in text.split('\n') {
            for line in wrap(paragraph_line, font, size, max_width) {
                if self.y + line_height > PAGE_HEIGHT - MARGIN {
                    self.break_page();
                }
                self.text_run(x, font, size, line_height, &line);
                self.y += line_height;
            }
        }
    }

    fn text_run(&mut self, x: f32, font: Font, size: f32, line_height: f32, text: &str) {
        // Baseline sits near the bottom of the line box, fpdf style.
        let baseline_from_top = self.y + line_height / 2.0 + size * PT_TO_MM * 0.3;
        let x_pt = x * MM_TO_PT;
        let y_pt = (PAGE_HEIGHT - baseline_from_top) * MM_TO_PT;

        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Tf",
            vec![font.resource_name().into(), size.into()],
        ));
        self.ops
            .push(Operation::new("Td", vec![x_pt.into(), y_pt.into()]));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::String(
                encode_win_ansi(text),
                StringFormat::Hexadecimal,
            )],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    /// Close the current page and hand back all pages. An empty document
    /// still yields one blank page.
    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.finished.push(self.ops);
        self.finished
    }
}

// ── Line wrapping ────────────────────────────────────────────────────────

/// Greedy wrap at spaces; words wider than the cell are hard-broken.
fn wrap(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;
    let space_width = char_width_mm(' ', font, size);

    for word in text.split(' ') {
        let word_width = text_width_mm(word, font, size);

        let needed = if current.is_empty() {
            word_width
        } else {
            current_width + space_width + word_width
        };

        if needed <= max_width {
            if !current.is_empty() {
                current.push(' ');
                current_width += space_width;
            }
            current.push_str(word);
            current_width += word_width;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }

        if word_width <= max_width {
            current.push_str(word);
            current_width = word_width;
        } else {
            // Hard break inside an over-long word.
            for ch in word.chars() {
                let w = char_width_mm(ch, font, size);
                if current_width + w > max_width && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                current.push(ch);
                current_width += w;
            }
        }
    }

    lines.push(current);
    lines
}

fn text_width_mm(text: &str, font: Font, size: f32) -> f32 {
    text.chars().map(|c| char_width_mm(c, font, size)).sum()
}

fn char_width_mm(c: char, font: Font, size: f32) -> f32 {
    glyph_width(c, font) as f32 / 1000.0 * size * PT_TO_MM
}

// ── WinAnsi encoding and AFM metrics ─────────────────────────────────────

/// Map a char to its WinAnsi byte. ASCII maps through, the bullet glyph
/// lands on 0x95, Latin-1 letters keep their codepoint; anything else
/// degrades to '?'.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2022}' => 0x95,
            c if (c as u32) < 0x80 => c as u8,
            c if (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Helvetica AFM advance widths for the printable ASCII range 0x20..=0x7E,
/// in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20–0x2F
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30–0x3F
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40–0x4F
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50–0x5F
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60–0x6F
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70–0x7E
];

/// Helvetica-Bold AFM advance widths for 0x20..=0x7E.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20–0x2F
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0x30–0x3F
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 0x40–0x4F
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 0x50–0x5F
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 0x60–0x6F
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 0x70–0x7E
];

/// Bullet (WinAnsi 0x95) advance width in both fonts.
const BULLET_WIDTH: u16 = 350;

fn glyph_width(c: char, font: Font) -> u16 {
    if c == '\u{2022}' {
        return BULLET_WIDTH;
    }
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) {
        let idx = (code - 0x20) as usize;
        return match font {
            Font::Body => HELVETICA_WIDTHS[idx],
            Font::Bold => HELVETICA_BOLD_WIDTHS[idx],
        };
    }
    // Non-ASCII: nominal lowercase width keeps wrapping conservative.
    match font {
        Font::Body => 556,
        Font::Bold => 611,
    }
}

// ── Object assembly ──────────────────────────────────────────────────────

fn build_document(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>, Scan2DocError> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_body = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let font_bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_body,
            "F2" => font_bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| Scan2DocError::Internal(format!("content stream encode: {e}")))?;
        let stream_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => stream_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH_PT.into(), PAGE_HEIGHT_PT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut Cursor::new(&mut out))
        .map_err(|e| Scan2DocError::Internal(format!("PDF serialisation failed: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reload(bytes: &[u8]) -> lopdf::Document {
        lopdf::Document::load_mem(bytes).expect("output must reparse as a PDF")
    }

    fn all_content(doc: &lopdf::Document) -> String {
        doc.page_iter()
            .map(|page_id| {
                let bytes = doc.get_page_content(page_id).expect("page content");
                String::from_utf8_lossy(&bytes).into_owned()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn hex(text: &str) -> String {
        text.bytes().map(|b| format!("{b:02X}")).collect()
    }

    #[test]
    fn single_page_for_short_document() {
        let doc = Document::new(vec![
            Element::heading(1, "Title"),
            Element::paragraph("A short paragraph."),
        ]);
        let pdf = reload(&render(&doc).unwrap());
        assert_eq!(pdf.page_iter().count(), 1);
    }

    #[test]
    fn empty_document_still_has_one_page() {
        let pdf = reload(&render(&Document::default()).unwrap());
        assert_eq!(pdf.page_iter().count(), 1);
    }

    #[test]
    fn heading_uses_bold_font_at_contract_size() {
        let doc = Document::new(vec![
            Element::heading(1, "Title"),
            Element::paragraph("body"),
        ]);
        let pdf = reload(&render(&doc).unwrap());
        let content = all_content(&pdf).to_uppercase();
        assert!(content.contains("/F2 22"), "level-1 heading must be F2 @ 22");
        assert!(content.contains("/F1 11"), "body must be F1 @ 11");
        assert!(content.contains(&hex("Title")), "heading text missing");
    }

    #[test]
    fn heading_sizes_follow_levels() {
        let doc = Document::new(vec![
            Element::heading(2, "Two"),
            Element::heading(3, "Three"),
        ]);
        let content = all_content(&reload(&render(&doc).unwrap())).to_uppercase();
        assert!(content.contains("/F2 18"));
        assert!(content.contains("/F2 14"));
    }

    #[test]
    fn numbered_items_carry_their_index() {
        let doc = Document::new(vec![Element::numbered_list(["alpha", "beta"])]);
        let content = all_content(&reload(&render(&doc).unwrap())).to_uppercase();
        assert!(content.contains(&hex("1.  alpha")));
        assert!(content.contains(&hex("2.  beta")));
    }

    #[test]
    fn long_document_breaks_onto_multiple_pages() {
        // 36 paragraphs × (7 + 2) mm comfortably exceeds one 267 mm text column.
        let elements: Vec<Element> = (0..36)
            .map(|i| Element::paragraph(format!("Paragraph number {i}.")))
            .collect();
        let pdf = reload(&render(&Document::new(elements)).unwrap());
        assert!(pdf.page_iter().count() >= 2);
    }

    #[test]
    fn wrap_breaks_at_spaces() {
        let lines = wrap(
            "one two three four five six seven eight nine ten",
            Font::Body,
            11.0,
            40.0,
        );
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, Font::Body, 11.0) <= 40.01);
        }
        assert_eq!(
            lines.join(" "),
            "one two three four five six seven eight nine ten"
        );
    }

    #[test]
    fn wrap_hard_breaks_oversized_words() {
        let word = "x".repeat(400);
        let lines = wrap(&word, Font::Body, 11.0, 40.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn win_ansi_maps_bullet_and_degrades_unknowns() {
        assert_eq!(encode_win_ansi("a\u{2022}b"), vec![b'a', 0x95, b'b']);
        assert_eq!(encode_win_ansi("caf\u{E9}"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("\u{4E2D}"), vec![b'?']);
    }
}
