//! Source text with a line table.
//!
//! `SourceText` owns the text of one compilation unit plus the byte offsets
//! of its line starts, so byte offsets can be converted to line/column
//! positions for diagnostics and the parser's line-sensitive rules.

use std::fmt;

use crate::text::{TextPos, TextSpan};

/// Line and column information derived from source text.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LineAndColumn {
    /// 0-based line number.
    pub line: u32,
    /// 0-based column, in bytes from the line start.
    pub column: u32,
}

impl LineAndColumn {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// The text of one compilation unit, with an optional file name and a
/// precomputed line-start table.
#[derive(Debug, Clone)]
pub struct SourceText {
    text: String,
    file_name: Option<String>,
    /// Byte offsets of the start of each line.
    line_starts: Vec<TextPos>,
}

impl SourceText {
    /// Create a source text with no file name (REPL input, tests).
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = compute_line_starts(&text);
        Self {
            text,
            file_name: None,
            line_starts,
        }
    }

    /// Create a source text read from a named file.
    pub fn with_file(text: impl Into<String>, file_name: impl Into<String>) -> Self {
        let mut source = Self::new(text);
        source.file_name = Some(file_name.into());
        source
    }

    /// The full text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The file name, if any.
    #[inline]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Total length in bytes.
    #[inline]
    pub fn len(&self) -> TextPos {
        self.text.len() as TextPos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The text covered by a span. Spans always come from the lexer, so
    /// they fall on character boundaries.
    pub fn slice(&self, span: TextSpan) -> &str {
        &self.text[span.to_range()]
    }

    /// Get the line number (0-based) for a byte offset.
    pub fn line_of(&self, pos: TextPos) -> u32 {
        match self.line_starts.binary_search(&pos) {
            Ok(line) => line as u32,
            Err(line) => (line - 1) as u32,
        }
    }

    /// Get the line and column for a byte offset.
    pub fn line_and_column_of(&self, pos: TextPos) -> LineAndColumn {
        let line = self.line_of(pos);
        let line_start = self.line_starts[line as usize];
        LineAndColumn {
            line,
            column: pos - line_start,
        }
    }

    /// The span of a line (0-based), excluding its line break.
    pub fn line_span(&self, line: u32) -> TextSpan {
        let start = self.line_starts[line as usize];
        let end = match self.line_starts.get(line as usize + 1) {
            Some(&next) => next,
            None => self.len(),
        };
        let mut text_end = end;
        while text_end > start {
            let byte = self.text.as_bytes()[text_end as usize - 1];
            if byte == b'\n' || byte == b'\r' {
                text_end -= 1;
            } else {
                break;
            }
        }
        TextSpan::from_bounds(start, text_end)
    }

    /// The text of a line (0-based), excluding its line break.
    pub fn line_text(&self, line: u32) -> &str {
        self.slice(self.line_span(line))
    }

    /// Get the total number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

impl fmt::Display for SourceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn compute_line_starts(text: &str) -> Vec<TextPos> {
    let mut line_starts = vec![0u32];
    for (i, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            line_starts.push((i + 1) as u32);
        }
    }
    line_starts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_lookup() {
        let source = SourceText::new("line1\nline2\nline3");
        assert_eq!(source.line_count(), 3);
        assert_eq!(source.line_of(0), 0);
        assert_eq!(source.line_of(5), 0); // the newline itself
        assert_eq!(source.line_of(6), 1); // start of line2
        assert_eq!(source.line_of(12), 2);

        let lc = source.line_and_column_of(8);
        assert_eq!(lc.line, 1);
        assert_eq!(lc.column, 2);
    }

    #[test]
    fn test_line_text_strips_line_break() {
        let source = SourceText::new("a\r\nbb\nccc");
        assert_eq!(source.line_text(0), "a");
        assert_eq!(source.line_text(1), "bb");
        assert_eq!(source.line_text(2), "ccc");
    }

    #[test]
    fn test_slice() {
        let source = SourceText::new("x := 42");
        assert_eq!(source.slice(TextSpan::new(5, 2)), "42");
    }

    #[test]
    fn test_file_name() {
        let source = SourceText::with_file("1", "main.sk");
        assert_eq!(source.file_name(), Some("main.sk"));
        assert_eq!(SourceText::new("1").file_name(), None);
    }
}
