//! Page model and the cursor-threaded builder used to lay out reports.

/// US Letter, in points.
pub const PAGE_WIDTH: f64 = 612.0;
pub const PAGE_HEIGHT: f64 = 792.0;
pub const MARGIN: f64 = 54.0;
pub const CONTENT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;

/// Rough Helvetica advance width as a fraction of the font size.
const AVERAGE_GLYPH_WIDTH: f64 = 0.5;
const LINE_SPACING: f64 = 1.35;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Font {
    Regular,
    Bold,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Text {
        x: f64,
        y: f64,
        size: f64,
        font: Font,
        text: String,
    },
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        gray: f64,
    },
    Rule {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    /// All text runs in drawing order.
    pub fn text_runs(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(|page| {
            page.ops.iter().filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.text_runs().any(|run| run.contains(needle))
    }
}

/// Position of the next line: page index and the baseline measured from the
/// bottom edge, as PDF does.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cursor {
    pub page: usize,
    pub y: f64,
}

#[derive(Copy, Clone, Debug)]
pub struct TextStyle {
    pub size: f64,
    pub font: Font,
}

impl TextStyle {
    pub const TITLE: TextStyle = TextStyle {
        size: 22.0,
        font: Font::Bold,
    };
    pub const HEADING: TextStyle = TextStyle {
        size: 15.0,
        font: Font::Bold,
    };
    pub const BODY: TextStyle = TextStyle {
        size: 10.5,
        font: Font::Regular,
    };
    pub const STRONG: TextStyle = TextStyle {
        size: 10.5,
        font: Font::Bold,
    };
    pub const SMALL: TextStyle = TextStyle {
        size: 8.5,
        font: Font::Regular,
    };

    pub fn line_height(self) -> f64 {
        self.size * LINE_SPACING
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Column {
    pub header: &'static str,
    pub width: f64,
    pub align_right: bool,
}

/// Collects pages. Every append takes the current [`Cursor`] and returns the
/// cursor for whatever comes next; the builder holds no position itself.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    pages: Vec<Page>,
}

impl DocumentBuilder {
    pub fn new() -> (Self, Cursor) {
        let builder = Self {
            pages: vec![Page::default()],
        };
        (builder, top_of_page(0))
    }

    pub fn finish(self) -> Document {
        Document { pages: self.pages }
    }

    fn push(&mut self, page: usize, op: DrawOp) {
        if let Some(page) = self.pages.get_mut(page) {
            page.ops.push(op);
        }
    }

    pub fn new_page(&mut self) -> Cursor {
        self.pages.push(Page::default());
        top_of_page(self.pages.len() - 1)
    }

    /// Starts a new page when fewer than `needed` points remain.
    pub fn ensure_space(&mut self, cursor: Cursor, needed: f64) -> Cursor {
        if cursor.y - needed < MARGIN {
            self.new_page()
        } else {
            cursor
        }
    }

    pub fn gap(&mut self, cursor: Cursor, points: f64) -> Cursor {
        let next = Cursor {
            y: cursor.y - points,
            ..cursor
        };
        self.ensure_space(next, 0.0)
    }

    pub fn line(&mut self, cursor: Cursor, style: TextStyle, text: &str) -> Cursor {
        self.line_at(cursor, style, MARGIN, text)
    }

    pub fn line_at(&mut self, cursor: Cursor, style: TextStyle, x: f64, text: &str) -> Cursor {
        let cursor = self.ensure_space(cursor, style.line_height());
        let baseline = cursor.y - style.size;
        self.push(
            cursor.page,
            DrawOp::Text {
                x,
                y: baseline,
                size: style.size,
                font: style.font,
                text: text.to_string(),
            },
        );
        Cursor {
            y: cursor.y - style.line_height(),
            ..cursor
        }
    }

    /// Word-wrapped paragraph across the content width.
    pub fn paragraph(&mut self, cursor: Cursor, style: TextStyle, text: &str) -> Cursor {
        wrap(text, max_chars(style, CONTENT_WIDTH))
            .iter()
            .fold(cursor, |cursor, line| self.line(cursor, style, line))
    }

    pub fn rule(&mut self, cursor: Cursor) -> Cursor {
        let cursor = self.ensure_space(cursor, 8.0);
        let y = cursor.y - 4.0;
        self.push(
            cursor.page,
            DrawOp::Rule {
                x1: MARGIN,
                y1: y,
                x2: PAGE_WIDTH - MARGIN,
                y2: y,
            },
        );
        Cursor {
            y: cursor.y - 8.0,
            ..cursor
        }
    }

    /// Draws a shaded header row followed by one row per entry. Rows that
    /// do not fit continue on a new page under a repeated header.
    pub fn table(&mut self, cursor: Cursor, columns: &[Column], rows: &[Vec<String>]) -> Cursor {
        let mut cursor = self.table_header(cursor, columns);
        for row in rows {
            let style = TextStyle::BODY;
            if cursor.y - style.line_height() < MARGIN {
                cursor = self.new_page();
                cursor = self.table_header(cursor, columns);
            }
            cursor = self.table_row(cursor, columns, row, style);
        }
        cursor
    }

    fn table_header(&mut self, cursor: Cursor, columns: &[Column]) -> Cursor {
        let style = TextStyle::STRONG;
        let cursor = self.ensure_space(cursor, style.line_height() * 2.0);
        let height = style.line_height();
        self.push(
            cursor.page,
            DrawOp::FillRect {
                x: MARGIN,
                y: cursor.y - height,
                width: columns.iter().map(|c| c.width).sum(),
                height,
                gray: 0.88,
            },
        );
        let headers: Vec<String> = columns.iter().map(|c| c.header.to_string()).collect();
        self.table_row(cursor, columns, &headers, style)
    }

    fn table_row(
        &mut self,
        cursor: Cursor,
        columns: &[Column],
        cells: &[String],
        style: TextStyle,
    ) -> Cursor {
        let baseline = cursor.y - style.size;
        let mut x = MARGIN;
        for (column, cell) in columns.iter().zip(cells) {
            let limit = max_chars(style, column.width - 8.0);
            let text = truncate(cell, limit);
            let text_x = if column.align_right {
                x + column.width - 4.0 - text_width(style, &text)
            } else {
                x + 4.0
            };
            self.push(
                cursor.page,
                DrawOp::Text {
                    x: text_x,
                    y: baseline,
                    size: style.size,
                    font: style.font,
                    text,
                },
            );
            x += column.width;
        }
        Cursor {
            y: cursor.y - style.line_height(),
            ..cursor
        }
    }

    /// Stamps "Page i of n" at the bottom of every page.
    pub fn number_pages(&mut self) {
        let total = self.pages.len();
        let style = TextStyle::SMALL;
        for (idx, page) in self.pages.iter_mut().enumerate() {
            let text = format!("Page {} of {}", idx + 1, total);
            page.ops.push(DrawOp::Text {
                x: PAGE_WIDTH - MARGIN - text_width(style, &text),
                y: MARGIN / 2.0,
                size: style.size,
                font: style.font,
                text,
            });
        }
    }
}

fn top_of_page(page: usize) -> Cursor {
    Cursor {
        page,
        y: PAGE_HEIGHT - MARGIN,
    }
}

pub fn text_width(style: TextStyle, text: &str) -> f64 {
    text.chars().count() as f64 * style.size * AVERAGE_GLYPH_WIDTH
}

fn max_chars(style: TextStyle, width: f64) -> usize {
    ((width / (style.size * AVERAGE_GLYPH_WIDTH)).floor() as usize).max(1)
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let kept: String = text.chars().take(limit.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Greedy word wrap. Words longer than a line are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_breaks_on_word_boundaries() {
        assert_eq!(
            wrap("owe no man any thing but to love one another", 12),
            vec!["owe no man", "any thing", "but to love", "one another"]
        );
    }

    #[test]
    fn wrap_splits_overlong_words() {
        assert_eq!(wrap("abcdefghij xy", 4), vec!["abcd", "efgh", "ij", "xy"]);
        assert!(wrap("   ", 10).is_empty());
    }

    #[test]
    fn lines_flow_onto_new_pages() {
        let (mut builder, mut cursor) = DocumentBuilder::new();
        for i in 0..120 {
            cursor = builder.line(cursor, TextStyle::BODY, &format!("line {i}"));
        }
        let document = builder.finish();
        assert!(document.pages.len() > 1);
        for page in &document.pages {
            for op in &page.ops {
                if let DrawOp::Text { y, .. } = op {
                    assert!(*y >= MARGIN - TextStyle::BODY.size);
                    assert!(*y <= PAGE_HEIGHT - MARGIN);
                }
            }
        }
        assert!(document.contains_text("line 119"));
    }

    #[test]
    fn appends_do_not_move_a_cursor_they_were_given() {
        let (mut builder, start) = DocumentBuilder::new();
        let after = builder.line(start, TextStyle::HEADING, "Heading");
        assert_eq!(start.y, PAGE_HEIGHT - MARGIN);
        assert!(after.y < start.y);
        let again = builder.line(start, TextStyle::HEADING, "Overlay");
        assert_eq!(after, again);
    }

    #[test]
    fn long_tables_repeat_their_header() {
        let columns = [
            Column {
                header: "Debt",
                width: 300.0,
                align_right: false,
            },
            Column {
                header: "Balance",
                width: 204.0,
                align_right: true,
            },
        ];
        let rows: Vec<Vec<String>> = (0..80)
            .map(|i| vec![format!("Debt {i}"), format!("{i}.00")])
            .collect();
        let (mut builder, cursor) = DocumentBuilder::new();
        builder.table(cursor, &columns, &rows);
        let document = builder.finish();
        assert!(document.pages.len() >= 2);
        let headers = document.text_runs().filter(|t| *t == "Balance").count();
        assert_eq!(headers, document.pages.len());
    }

    #[test]
    fn page_numbers_are_stamped_on_every_page() {
        let (mut builder, cursor) = DocumentBuilder::new();
        builder.line(cursor, TextStyle::BODY, "first");
        let second = builder.new_page();
        builder.line(second, TextStyle::BODY, "second");
        builder.number_pages();
        let document = builder.finish();
        assert!(document.contains_text("Page 1 of 2"));
        assert!(document.contains_text("Page 2 of 2"));
    }
}
