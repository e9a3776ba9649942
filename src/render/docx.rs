//! DOCX rendering via `docx-rs`.
//!
//! Headings use declared `Heading1..3` paragraph styles and list items
//! reference real numbering definitions (`w:numPr`), never literal bullet
//! characters, so the document behaves like a native Word file: list
//! formatting survives editing and heading navigation works.
//!
//! Each numbered list gets its own numbering instance over the shared
//! decimal definition so its counter restarts at 1.

use crate::document::{Document, Element};
use crate::error::Scan2DocError;
use docx_rs::{
    AbstractNumbering, Docx, IndentLevel, Level, LevelJc, LevelText, NumberFormat, Numbering,
    NumberingId, Paragraph, Run, RunFonts, SpecialIndentType, Start, Style, StyleType,
};
use std::io::Cursor;

/// Document default: Arial 11 pt. docx-rs sizes are half-points.
const BODY_SIZE: usize = 22;

/// Abstract numbering ids for the two list shapes.
const BULLET_ABSTRACT: usize = 1;
const DECIMAL_ABSTRACT: usize = 2;

/// The single bullet numbering instance. Decimal instances are allocated
/// per list starting right after it.
const BULLET_NUM: usize = 1;
const FIRST_DECIMAL_NUM: usize = 2;

/// Render `doc` as an Office Open XML word-processing document.
pub fn render(doc: &Document) -> Result<Vec<u8>, Scan2DocError> {
    let mut docx = base_document(doc);

    // Fresh numbering instance per numbered list; counters restart at 1.
    let mut next_decimal_num = FIRST_DECIMAL_NUM;

    for element in &doc.elements {
        match element {
            Element::Heading { level, text } => {
                let style = heading_style_id(*level);
                docx = docx.add_paragraph(
                    Paragraph::new()
                        .add_run(Run::new().add_text(text.as_str()))
                        .style(style),
                );
            }
            Element::Paragraph { text } => {
                docx = docx
                    .add_paragraph(Paragraph::new().add_run(Run::new().add_text(text.as_str())));
            }
            Element::BulletList { items } => {
                for item in items {
                    docx = docx.add_paragraph(
                        Paragraph::new()
                            .add_run(Run::new().add_text(item.as_str()))
                            .numbering(NumberingId::new(BULLET_NUM), IndentLevel::new(0)),
                    );
                }
            }
            Element::NumberedList { items } => {
                let num = next_decimal_num;
                next_decimal_num += 1;
                docx = docx.add_numbering(Numbering::new(num, DECIMAL_ABSTRACT));
                for item in items {
                    docx = docx.add_paragraph(
                        Paragraph::new()
                            .add_run(Run::new().add_text(item.as_str()))
                            .numbering(NumberingId::new(num), IndentLevel::new(0)),
                    );
                }
            }
        }
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| Scan2DocError::Internal(format!("DOCX packaging failed: {e}")))?;
    Ok(buf.into_inner())
}

/// Document skeleton: default font, heading styles, numbering definitions.
fn base_document(_doc: &Document) -> Docx {
    Docx::new()
        .default_fonts(RunFonts::new().ascii("Arial"))
        .default_size(BODY_SIZE)
        .add_style(heading_style(1, 32))
        .add_style(heading_style(2, 26))
        .add_style(heading_style(3, 24))
        .add_abstract_numbering(
            AbstractNumbering::new(BULLET_ABSTRACT).add_level(
                Level::new(
                    0,
                    Start::new(1),
                    NumberFormat::new("bullet"),
                    LevelText::new("•"),
                    LevelJc::new("left"),
                )
                .indent(Some(720), Some(SpecialIndentType::Hanging(360)), None, None),
            ),
        )
        .add_abstract_numbering(
            AbstractNumbering::new(DECIMAL_ABSTRACT).add_level(
                Level::new(
                    0,
                    Start::new(1),
                    NumberFormat::new("decimal"),
                    LevelText::new("%1."),
                    LevelJc::new("left"),
                )
                .indent(Some(720), Some(SpecialIndentType::Hanging(360)), None, None),
            ),
        )
        .add_numbering(Numbering::new(BULLET_NUM, BULLET_ABSTRACT))
}

fn heading_style_id(level: u8) -> &'static str {
    match level {
        1 => "Heading1",
        2 => "Heading2",
        _ => "Heading3",
    }
}

fn heading_style(level: u8, half_points: usize) -> Style {
    Style::new(heading_style_id(level), StyleType::Paragraph)
        .name(format!("Heading {level}"))
        .size(half_points)
        .bold()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip package");
        let mut file = archive.by_name(name).unwrap_or_else(|_| panic!("missing part {name}"));
        let mut content = String::new();
        file.read_to_string(&mut content).expect("part is utf-8");
        content
    }

    #[test]
    fn package_is_well_formed() {
        let doc = Document::new(vec![Element::paragraph("Hello")]);
        let bytes = render(&doc).unwrap();
        let xml = part(&bytes, "word/document.xml");
        assert!(xml.contains("Hello"));
    }

    #[test]
    fn headings_reference_declared_styles() {
        let doc = Document::new(vec![
            Element::heading(1, "Top"),
            Element::heading(3, "Deep"),
        ]);
        let bytes = render(&doc).unwrap();
        let body = part(&bytes, "word/document.xml");
        assert!(body.contains("Heading1"), "missing Heading1 ref");
        assert!(body.contains("Heading3"), "missing Heading3 ref");
        let styles = part(&bytes, "word/styles.xml");
        assert!(styles.contains("Heading1"));
        assert!(styles.contains("Arial"));
    }

    #[test]
    fn list_items_use_numbering_not_literal_bullets() {
        let doc = Document::new(vec![Element::bullet_list(["alpha", "beta"])]);
        let bytes = render(&doc).unwrap();
        let body = part(&bytes, "word/document.xml");
        assert!(body.contains("numPr"), "items must carry w:numPr");
        assert!(
            !body.contains("• alpha"),
            "bullet glyph must come from numbering, not the run text"
        );
    }

    #[test]
    fn each_numbered_list_gets_its_own_instance() {
        let doc = Document::new(vec![
            Element::numbered_list(["a", "b"]),
            Element::numbered_list(["c"]),
        ]);
        let bytes = render(&doc).unwrap();
        let numbering = part(&bytes, "word/numbering.xml");
        // Bullet instance plus one instance per numbered list.
        assert_eq!(numbering.matches("w:numId=\"").count(), 3);
    }

    #[test]
    fn empty_lists_render_no_items() {
        let doc = Document::new(vec![
            Element::bullet_list(Vec::<String>::new()),
            Element::paragraph("after"),
        ]);
        let bytes = render(&doc).unwrap();
        let body = part(&bytes, "word/document.xml");
        assert!(body.contains("after"));
        assert!(!body.contains("numPr"));
    }
}
