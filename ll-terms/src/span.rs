//! Source locations for tokens and diagnostics.
//!
//! Positions are 0-based `(line, column)` pairs where the column counts
//! characters, not bytes. A [`LineIndex`] converts the byte offsets produced
//! by the lexer into positions.

use std::fmt;

/// A 0-based line/column position in source text.
#[derive(Debug, Clone, Default, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    /// Characters, not bytes, since the start of the line.
    pub column: usize,
}

impl Position {
    #[inline]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The half-open range `[start, end)` of a token or term in its input.
#[derive(Debug, Clone, Default, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// An empty span at `pos`, as used for the end-of-input token.
    #[inline]
    pub const fn at(pos: Position) -> Self {
        Self::new(pos, pos)
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(&self, other: &Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Maps byte offsets of one input string to [`Position`]s.
///
/// Queries are answered by scanning forward from the previous answer, so a
/// caller walking the input front to back, as the lexer does, pays for each
/// character once. Earlier offsets restart from the start of their line.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    input: &'a str,
    /// Byte offset of the first character of every line.
    line_starts: Vec<usize>,
    /// The last resolved offset and its position.
    last: (usize, Position),
}

impl<'a> LineIndex<'a> {
    pub fn new(input: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(input.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            input,
            line_starts,
            last: (0, Position::default()),
        }
    }

    /// Position of the byte at `offset`. Offsets past the end clamp to the
    /// end of input; offsets inside a multi-byte character count that
    /// character as already passed.
    pub fn position(&mut self, offset: usize) -> Position {
        let offset = offset.min(self.input.len());
        let (from, mut pos) = if offset >= self.last.0 {
            self.last
        } else {
            let line = match self.line_starts.binary_search(&offset) {
                Ok(line) => line,
                Err(next) => next - 1,
            };
            (self.line_starts[line], Position::new(line, 0))
        };
        for (_, c) in self.input[from..]
            .char_indices()
            .take_while(|(i, _)| from + i < offset)
        {
            if c == '\n' {
                pos.line += 1;
                pos.column = 0;
            } else {
                pos.column += 1;
            }
        }
        if self.input.is_char_boundary(offset) {
            self.last = (offset, pos);
        }
        pos
    }

    /// Span covering the byte range `range`.
    pub fn span(&mut self, range: std::ops::Range<usize>) -> Span {
        let start = self.position(range.start);
        Span::new(start, self.position(range.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn merge_expands_to_cover_both() {
        let a = Span::new(Position::new(0, 5), Position::new(0, 10));
        let b = Span::new(Position::new(0, 2), Position::new(0, 7));
        assert_eq!(
            a.merge(&b),
            Span::new(Position::new(0, 2), Position::new(0, 10))
        );
    }

    #[test]
    fn merge_cross_line() {
        let a = Span::new(Position::new(1, 5), Position::new(2, 3));
        let b = Span::new(Position::new(0, 9), Position::new(3, 1));
        assert_eq!(a.merge(&b), b);
    }

    #[test]
    fn span_display() {
        let s = Span::new(Position::new(0, 4), Position::new(2, 1));
        assert_eq!(s.to_string(), "0:4-2:1");
        assert_eq!(Span::at(Position::new(4, 2)).to_string(), "4:2-4:2");
    }

    #[test]
    fn line_index_single_line() {
        let mut idx = LineIndex::new("foo(X)");
        assert_eq!(idx.position(0), Position::new(0, 0));
        assert_eq!(idx.position(4), Position::new(0, 4));
        assert_eq!(idx.position(6), Position::new(0, 6));
        assert_eq!(idx.position(100), Position::new(0, 6));
    }

    #[test]
    fn line_index_multi_line() {
        let mut idx = LineIndex::new("foo(\n  X,\n  y)");
        assert_eq!(idx.position(5), Position::new(1, 0));
        assert_eq!(idx.position(7), Position::new(1, 2));
        assert_eq!(idx.position(12), Position::new(2, 2));
        assert_eq!(
            idx.span(7..8),
            Span::new(Position::new(1, 2), Position::new(1, 3))
        );
    }

    #[test]
    fn line_index_answers_backward_queries() {
        let mut idx = LineIndex::new("ab\ncd\nef");
        assert_eq!(idx.position(7), Position::new(2, 1));
        assert_eq!(idx.position(4), Position::new(1, 1));
        assert_eq!(idx.position(1), Position::new(0, 1));
        assert_eq!(idx.position(6), Position::new(2, 0));
    }

    #[test]
    fn line_index_counts_chars_not_bytes() {
        let mut idx = LineIndex::new("'héllo' x");
        // `x` sits at byte 9 but character 8.
        assert_eq!(idx.position(9), Position::new(0, 8));
        // Inside `é`: the character counts as passed.
        assert_eq!(idx.position(3), Position::new(0, 3));
        assert_eq!(idx.position(9), Position::new(0, 8));
    }

    #[test]
    fn line_index_is_linear_on_a_long_line() {
        let input = "a,".repeat(200_000);
        let mut idx = LineIndex::new(&input);
        let started = Instant::now();
        for offset in (0..input.len()).step_by(2) {
            assert_eq!(idx.position(offset).column, offset);
        }
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn position_display() {
        assert_eq!(Position::new(3, 7).to_string(), "3:7");
    }
}
