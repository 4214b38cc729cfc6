use crate::layout::{ReportLayout, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use mindscan_core::ExportError;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::fmt::Display;

fn render_failed(e: impl Display) -> ExportError {
    ExportError::RenderFailed {
        reason: e.to_string(),
    }
}

/// Reduce `text` to what the built-in Helvetica encoding can show. Typographic
/// punctuation is mapped to ASCII; anything else outside Latin-1 is dropped.
pub(crate) fn encodable_text(text: &str) -> String {
    let mapped: String = text
        .chars()
        .filter_map(|c| match c {
            '\u{2018}' | '\u{2019}' => Some('\''),
            '\u{201C}' | '\u{201D}' => Some('"'),
            '\u{2013}' | '\u{2014}' => Some('-'),
            '\u{2026}' => Some('.'),
            '\t' => Some(' '),
            c if c.is_control() => None,
            c if (c as u32) <= 0xFF => Some(c),
            _ => None,
        })
        .collect();
    mapped.trim_start().to_string()
}

pub fn render_pdf(layout: &ReportLayout, title: &str) -> Result<Vec<u8>, ExportError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        title,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(render_failed)?;

    for (index, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1")
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for line in &page.lines {
            let text = encodable_text(&line.text);
            if text.is_empty() {
                continue;
            }
            layer.use_text(
                text,
                line.font_size,
                Mm(line.x),
                Mm(PAGE_HEIGHT_MM - line.y),
                &font,
            );
        }
    }

    doc.save_to_bytes().map_err(render_failed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodable_text() {
        assert_eq!(
            encodable_text("🧠 Predicted Sentiment: Anxiety"),
            "Predicted Sentiment: Anxiety"
        );
        assert_eq!(encodable_text("it\u{2019}s “fine”"), "it's \"fine\"");
        assert_eq!(encodable_text("café"), "café");
        assert_eq!(encodable_text("📊"), "");
    }
}
