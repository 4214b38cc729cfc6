//! Page layout for the analysis report.
//!
//! All measurements are millimetres on an A4 page, with `y` growing downwards
//! from the top edge.

use analysis_engine::display_text;
use mindscan_core::{InferenceOutcome, Post};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

pub const TOP_MARGIN: f32 = 20.0;
/// A line whose baseline would fall below this starts a new page.
pub const PAGE_BREAK_Y: f32 = 277.0;

pub const LEFT_MARGIN: f32 = 10.0;
pub const INDENT: f32 = 15.0;

/// 180 mm of content width at 11 pt Helvetica.
pub const WRAP_COLUMNS: usize = 90;

const LINE_ADVANCE: f32 = 7.0;
const BLOCK_GAP: f32 = 4.0;
const SECTION_GAP: f32 = 12.0;

const HEADING_SIZE: f32 = 18.0;
const POST_HEADING_SIZE: f32 = 14.0;
const LABEL_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 11.0;

pub const REPORT_TITLE: &str = "Reddit Analysis Results";

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub pages: Vec<Page>,
}

impl ReportLayout {
    /// Lay out one section per post. `outcomes` is either empty (nothing analyzed
    /// yet) or index-aligned with `posts`.
    pub fn build(posts: &[Post], outcomes: &[InferenceOutcome]) -> Self {
        let mut cursor = Cursor::new();
        cursor.place(REPORT_TITLE, LEFT_MARGIN, HEADING_SIZE, 12.0);

        for (index, post) in posts.iter().enumerate() {
            cursor.place(&format!("Post {}", index + 1), LEFT_MARGIN, POST_HEADING_SIZE, 10.0);

            cursor.place("Title:", LEFT_MARGIN, LABEL_SIZE, LINE_ADVANCE);
            cursor.place_wrapped(or_placeholder(&post.title, "No title"));

            let author = or_placeholder(&post.author, "[unknown]");
            cursor.place(&format!("Author: {}", author), LEFT_MARGIN, LABEL_SIZE, LINE_ADVANCE);
            let flair = post.flair.as_deref().unwrap_or("No Flair");
            cursor.place(&format!("Flair: {}", flair), LEFT_MARGIN, LABEL_SIZE, LINE_ADVANCE);

            cursor.place("Text:", LEFT_MARGIN, LABEL_SIZE, LINE_ADVANCE);
            cursor.place_wrapped(or_placeholder(&post.body_text, "No text"));

            if let Some(outcome) = outcomes.get(index) {
                cursor.place("Analysis:", LEFT_MARGIN, LABEL_SIZE, LINE_ADVANCE);
                cursor.place_wrapped(&display_text(outcome));
            }

            cursor.skip(SECTION_GAP);
        }

        Self {
            pages: cursor.pages,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn lines(&self) -> impl Iterator<Item = &PlacedLine> {
        self.pages.iter().flat_map(|page| page.lines.iter())
    }
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

struct Cursor {
    pages: Vec<Page>,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: TOP_MARGIN,
        }
    }

    fn place(&mut self, text: &str, x: f32, font_size: f32, advance: f32) {
        if self.y > PAGE_BREAK_Y {
            self.pages.push(Page::default());
            self.y = TOP_MARGIN;
        }
        let y = self.y;
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(PlacedLine {
                text: text.to_string(),
                x,
                y,
                font_size,
            });
        }
        self.y += advance;
    }

    fn place_wrapped(&mut self, text: &str) {
        for line in wrap_text(text, WRAP_COLUMNS) {
            self.place(&line, INDENT, BODY_SIZE, LINE_ADVANCE);
        }
        self.skip(BLOCK_GAP);
    }

    fn skip(&mut self, amount: f32) {
        self.y += amount;
    }
}

/// Greedy word wrap to `columns` characters. Embedded newlines start a new
/// line and words longer than a line are split.
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(columns) {
                let len = piece.len();
                if current_len == 0 {
                    current.extend(piece);
                    current_len = len;
                } else if current_len + 1 + len <= columns {
                    current.push(' ');
                    current.extend(piece);
                    current_len += 1 + len;
                } else {
                    lines.push(std::mem::take(&mut current));
                    current.extend(piece);
                    current_len = len;
                }
            }
        }

        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_short_text() {
        assert_eq!(wrap_text("hello world", 20), vec!["hello world"]);
    }

    #[test]
    fn test_wrap_breaks_on_words() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert_eq!(
            lines,
            vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]
        );
        assert!(lines.iter().all(|line| line.chars().count() <= 10));
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap_text("aaaaaaaaaaaa bb", 5);
        assert_eq!(lines, vec!["aaaaa", "aaaaa", "aa bb"]);
    }

    #[test]
    fn test_wrap_keeps_newlines() {
        let lines = wrap_text("first\n\nsecond line", 40);
        assert_eq!(lines, vec!["first", "", "second line"]);
    }

    #[test]
    fn test_wrap_counts_characters_not_bytes() {
        let lines = wrap_text("ééééé ééééé", 5);
        assert_eq!(lines, vec!["ééééé", "ééééé"]);
    }
}
