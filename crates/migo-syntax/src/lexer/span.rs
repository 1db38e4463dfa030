//! Source positions for migo tokens and AST nodes

#![allow(clippy::cast_possible_truncation)] // Offsets are u32; sources > 4GB are unsupported

use std::cmp::Ordering;

/// A location in source code
///
/// Ordering and equality are by byte offset; `line` and `column` are derived
/// from it by a [`LineIndex`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Position {
    /// Byte offset from the start of the source
    pub offset: u32,
    /// 1-indexed line number
    pub line: u32,
    /// 1-indexed column, counted in bytes from the start of the line
    pub column: u32,
}

impl Position {
    /// Create a position from its parts
    #[must_use]
    pub const fn new(offset: u32, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
    }
}

impl Eq for Position {}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset.cmp(&other.offset)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The range of source a token or node was built from (`to` is exclusive)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PosRange {
    pub from: Position,
    pub to: Position,
}

impl PosRange {
    #[must_use]
    pub const fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }

    /// An empty range at a single position
    #[must_use]
    pub const fn at(pos: Position) -> Self {
        Self { from: pos, to: pos }
    }

    /// Smallest range containing both `self` and `other`
    #[must_use]
    pub fn cover(self, other: Self) -> Self {
        Self {
            from: self.from.min(other.from),
            to: self.to.max(other.to),
        }
    }

    /// Returns true if `inner` lies entirely within this range
    #[must_use]
    pub fn contains(&self, inner: &Self) -> bool {
        self.from <= inner.from && inner.to <= self.to
    }

    /// Length of the range in bytes
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.to.offset - self.from.offset
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.from.offset == self.to.offset
    }

    /// Byte range for slicing the source
    #[must_use]
    pub const fn as_range(&self) -> std::ops::Range<usize> {
        self.from.offset as usize..self.to.offset as usize
    }
}

impl std::fmt::Display for PosRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// Maps byte offsets to line/column positions
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offsets where each line starts
    line_starts: Vec<u32>,
}

impl LineIndex {
    /// Build a line index from source code
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in source.char_indices() {
            if c == '\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    /// Resolve a byte offset to a full position
    #[must_use]
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset as u32;
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line];
        Position {
            offset,
            line: (line + 1) as u32,
            column: offset - line_start + 1,
        }
    }

    /// Get the number of lines
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_cover() {
        let index = LineIndex::new("abcdefghijklmnop");
        let a = PosRange::new(index.position(5), index.position(10));
        let b = PosRange::new(index.position(8), index.position(15));
        let merged = a.cover(b);
        assert_eq!(merged.from.offset, 5);
        assert_eq!(merged.to.offset, 15);
        assert!(merged.contains(&a));
        assert!(merged.contains(&b));
        assert_eq!(merged.len(), 10);
    }

    #[test]
    fn line_index_single_line() {
        let index = LineIndex::new("hello world");
        assert_eq!(index.line_count(), 1);
        let pos = index.position(6);
        assert_eq!((pos.line, pos.column), (1, 7));
    }

    #[test]
    fn line_index_multiple_lines() {
        let index = LineIndex::new("line1\nline2\nline3");
        assert_eq!(index.line_count(), 3);
        let newline = index.position(5);
        assert_eq!((newline.line, newline.column), (1, 6));
        let line2 = index.position(6);
        assert_eq!((line2.line, line2.column), (2, 1));
        let line3 = index.position(12);
        assert_eq!((line3.line, line3.column), (3, 1));
    }

    #[test]
    fn positions_compare_by_offset() {
        let a = Position::new(3, 1, 4);
        let b = Position::new(3, 9, 9);
        assert_eq!(a, b);
        assert!(Position::new(2, 1, 3) < a);
        assert_eq!(a.to_string(), "1:4");
    }
}
