//! Source location tracking

use std::fmt;

/// Source position (line, column, and byte offset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Byte offset from start of file
    pub offset: usize,
}

impl Position {
    /// Create a new position
    #[inline]
    pub fn new(
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            line,
            column,
            offset: 0,
        }
    }

    /// Create a new position with offset
    #[inline]
    pub fn with_offset(
        line: usize,
        column: usize,
        offset: usize,
    ) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Create a dummy position
    #[inline]
    pub fn dummy() -> Self {
        Self::default()
    }
}

impl fmt::Display for Position {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source span (start position to end position)
///
/// Spans order by start position, then end position; diagnostics are
/// normalized with this order before output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    /// Create a new span
    #[inline]
    pub fn new(
        start: Position,
        end: Position,
    ) -> Self {
        Self { start, end }
    }

    /// Create a dummy span
    #[inline]
    pub fn dummy() -> Self {
        Self::default()
    }

    /// Check if this is a dummy span
    #[inline]
    pub fn is_dummy(&self) -> bool {
        self.start.line == 0
    }

    /// Get the source text length
    #[inline]
    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    /// Check if span is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Smallest span covering both `self` and `other`
    pub fn merge(
        &self,
        other: &Span,
    ) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "[{} - {}]", self.start, self.end)
    }
}

/// Source file information
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// File name
    pub name: String,
    /// File content
    pub content: String,
    /// Line start offsets for fast line lookup
    line_offsets: Vec<usize>,
}

impl SourceFile {
    /// Create a new source file
    pub fn new(
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let mut line_offsets = vec![0];
        line_offsets.extend(
            content
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );

        Self {
            name: name.into(),
            content,
            line_offsets,
        }
    }

    /// Get position from byte offset
    pub fn position_from_offset(
        &self,
        offset: usize,
    ) -> Position {
        let line = self.line_offsets.partition_point(|&o| o <= offset);
        let column = offset - self.line_offsets[line - 1];
        Position::with_offset(line, column + 1, offset)
    }

    /// Get span from byte range
    pub fn span_from_range(
        &self,
        start: usize,
        end: usize,
    ) -> Span {
        Span {
            start: self.position_from_offset(start),
            end: self.position_from_offset(end),
        }
    }

    /// Span of the `nth` (0-based) occurrence of `needle`
    pub fn find_span(
        &self,
        needle: &str,
        nth: usize,
    ) -> Option<Span> {
        let (start, _) = self.content.match_indices(needle).nth(nth)?;
        Some(self.span_from_range(start, start + needle.len()))
    }

    /// Get source text for a span
    pub fn source_text(
        &self,
        span: Span,
    ) -> Option<&str> {
        self.content.get(span.start.offset..span.end.offset)
    }

    /// Get the text of a 1-indexed line, without its terminator
    pub fn line(
        &self,
        line: usize,
    ) -> Option<&str> {
        let start = *self.line_offsets.get(line.checked_sub(1)?)?;
        let end = self
            .line_offsets
            .get(line)
            .copied()
            .unwrap_or(self.content.len());
        self.content
            .get(start..end)
            .map(|l| l.trim_end_matches(['\n', '\r']))
    }
}

impl fmt::Display for SourceFile {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_from_offset() {
        let file = SourceFile::new("test.lx", "class A\n  val x = 1\n");
        let pos = file.position_from_offset(10);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 3);
        assert_eq!(pos.offset, 10);
    }

    #[test]
    fn test_find_span_and_source_text() {
        let file = SourceFile::new("test.lx", "@get:Ann val a\n@get:Ann val b\n");
        let span = file.find_span("get", 1).unwrap();
        assert_eq!(span.start, Position::with_offset(2, 2, 16));
        assert_eq!(file.source_text(span), Some("get"));
    }

    #[test]
    fn test_line_lookup() {
        let file = SourceFile::new("test.lx", "first\r\nsecond");
        assert_eq!(file.line(1), Some("first"));
        assert_eq!(file.line(2), Some("second"));
        assert_eq!(file.line(3), None);
        assert_eq!(file.line(0), None);
    }

    #[test]
    fn test_span_ordering() {
        let a = Span::new(Position::new(1, 5), Position::new(1, 8));
        let b = Span::new(Position::new(2, 1), Position::new(2, 3));
        assert!(a < b);
        assert_eq!(a.merge(&b), Span::new(a.start, b.end));
    }
}
