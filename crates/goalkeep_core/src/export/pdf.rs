//! Minimal PDF 1.4 text writer.
//!
//! Produces A4 pages of left-aligned Helvetica lines. Only printable ASCII
//! is emitted; anything else becomes `?`.

use std::fmt::Write as _;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 56.0;
const LINE_SPACING: f32 = 1.4;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// One line of text with its font size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub size: f32,
    pub text: String,
}

/// Accumulates wrapped lines into pages.
#[derive(Debug)]
pub struct PdfWriter {
    pages: Vec<Vec<(f32, TextLine)>>,
    cursor_y: f32,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            cursor_y: PAGE_HEIGHT - MARGIN,
        }
    }

    /// Adds `text` as a paragraph wrapped to the page width.
    ///
    /// Explicit newlines start new lines; blank lines are kept as spacing.
    pub fn paragraph(&mut self, text: &str, size: f32) {
        let max_chars = max_chars_per_line(size);
        for raw_line in text.lines() {
            let wrapped = wrap_line(raw_line, max_chars);
            if wrapped.is_empty() {
                self.advance(size);
                continue;
            }
            for line in wrapped {
                self.push_line(TextLine { size, text: line });
            }
        }
    }

    /// Vertical gap of one line at `size`.
    pub fn spacer(&mut self, size: f32) {
        self.advance(size);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn push_line(&mut self, line: TextLine) {
        let height = line.size * LINE_SPACING;
        if self.cursor_y - height < MARGIN {
            self.pages.push(Vec::new());
            self.cursor_y = PAGE_HEIGHT - MARGIN;
        }
        self.cursor_y -= height;
        let y = self.cursor_y;
        if let Some(page) = self.pages.last_mut() {
            page.push((y, line));
        }
    }

    /// Moves the cursor only; the next `push_line` opens a page if needed.
    fn advance(&mut self, size: f32) {
        self.cursor_y -= size * LINE_SPACING;
    }

    /// Serializes the document.
    pub fn finish(self) -> Vec<u8> {
        let page_count = self.pages.len();
        // Objects: 1 catalog, 2 page tree, 3 font, then (page, content) pairs.
        let page_object = |index: usize| 4 + index * 2;

        let mut objects: Vec<String> = Vec::with_capacity(3 + page_count * 2);
        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        let kids = (0..page_count)
            .map(|index| format!("{} 0 R", page_object(index)))
            .collect::<Vec<_>>()
            .join(" ");
        objects.push(format!(
            "<< /Type /Pages /Kids [{kids}] /Count {page_count} >>"
        ));
        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );

        for (index, lines) in self.pages.iter().enumerate() {
            let content = content_stream(lines);
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                page_object(index) + 1
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ));
        }

        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (index, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            let _ = write!(out, "{} 0 obj\n{body}\nendobj\n", index + 1);
        }

        let xref_offset = out.len();
        let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = write!(out, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        );
        out.into_bytes()
    }
}

fn content_stream(lines: &[(f32, TextLine)]) -> String {
    let mut stream = String::new();
    for (y, line) in lines {
        let _ = writeln!(
            stream,
            "BT /F1 {} Tf {} {} Td ({}) Tj ET",
            line.size,
            MARGIN,
            y,
            escape_text(&line.text)
        );
    }
    stream
}

fn max_chars_per_line(size: f32) -> usize {
    let usable = PAGE_WIDTH - 2.0 * MARGIN;
    ((usable / (size * AVG_GLYPH_WIDTH)) as usize).max(1)
}

/// Greedy word wrap; words longer than a line are split.
pub fn wrap_line(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word = word.chars().collect::<Vec<_>>();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let current_len = current.chars().count();
        let needed = if current.is_empty() {
            word.len()
        } else {
            current_len + 1 + word.len()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Escapes a PDF literal string body.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            ' '..='~' => escaped.push(ch),
            _ => escaped.push('?'),
        }
    }
    escaped
}
