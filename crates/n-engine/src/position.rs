//! Text position, range, and cursor types.
//!
//! All coordinates are **0-indexed**. Line 0 is the first line, column 0 is the
//! first character. Columns count Unicode scalar values (chars), not bytes or
//! grapheme clusters, matching how `ropey` indexes text.
//!
//! [`CursorPosition`] is the host-facing cursor: `(line, column)` plus the
//! flattened char `offset` into the lines joined with `\n`. The three are only
//! ever derived together, so they cannot drift apart.

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A position in a text buffer: (line, column), both 0-indexed.
///
/// Positions are ordered lexicographically: line first, then column.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    /// Line 0, column 0.
    pub const ZERO: Self = Self { line: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line.cmp(&other.line).then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-indexed for human display, matching Vim's `line:col` status.
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A half-open range in a text buffer: `[start, end)`.
///
/// An `end` of `(line + 1, 0)` covers the line break at the end of `line`.
/// `start <= end` always holds: [`Range::new`] checks it in debug builds and
/// [`Range::ordered`] sorts its arguments.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[inline]
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.line < end.line || (start.line == end.line && start.col <= end.col),
            "Range::new requires start <= end"
        );
        Self { start, end }
    }

    /// Create a range from two arbitrary positions, swapping if needed.
    #[inline]
    #[must_use]
    pub fn ordered(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A zero-width range at the given position (an insertion point).
    #[inline]
    #[must_use]
    pub const fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start.line == self.end.line && self.start.col == self.end.col
    }

    /// True when the given position falls within `[start, end)`.
    #[inline]
    #[must_use]
    pub fn contains(self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }
}

impl fmt::Debug for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Range({}:{} .. {}:{})",
            self.start.line, self.start.col, self.end.line, self.end.col
        )
    }
}

// ---------------------------------------------------------------------------
// CursorPosition
// ---------------------------------------------------------------------------

/// The cursor as the host sees it: line, column, and flattened offset.
///
/// `offset` counts chars in the lines joined by a single `\n`. Construct
/// with [`CursorPosition::locate`] (or `Text::cursor_position`), which clamps
/// the position to the lines and derives the offset from the same table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CursorPosition {
    line: usize,
    column: usize,
    offset: usize,
}

impl CursorPosition {
    /// Resolve `pos` against a line table, clamping out-of-range lines and
    /// columns. `past_end` allows the column one past the last char.
    #[must_use]
    pub fn locate<S: AsRef<str>>(lines: &[S], pos: Position, past_end: bool) -> Self {
        if lines.is_empty() {
            return Self::default();
        }
        let line = pos.line.min(lines.len() - 1);
        let len = lines[line].as_ref().chars().count();
        let max_col = if past_end { len } else { len.saturating_sub(1) };
        let column = pos.col.min(max_col);
        let offset = lines[..line]
            .iter()
            .map(|l| l.as_ref().chars().count() + 1)
            .sum::<usize>()
            + column;
        Self {
            line,
            column,
            offset,
        }
    }

    /// Build from parts already known to be consistent. Only `Text` calls
    /// this, right after computing all three from the rope.
    pub(crate) const fn from_parts(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    #[inline]
    #[must_use]
    pub const fn line(self) -> usize {
        self.line
    }

    #[inline]
    #[must_use]
    pub const fn column(self) -> usize {
        self.column
    }

    #[inline]
    #[must_use]
    pub const fn offset(self) -> usize {
        self.offset
    }

    /// The `(line, column)` part.
    #[inline]
    #[must_use]
    pub const fn position(self) -> Position {
        Position::new(self.line, self.column)
    }
}

impl fmt::Display for CursorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (offset {})", self.position(), self.offset)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Position -----------------------------------------------------------

    #[test]
    fn position_ordering() {
        assert!(Position::new(1, 3) < Position::new(1, 7));
        assert!(Position::new(0, 100) < Position::new(1, 0));
        assert_eq!(Position::new(3, 3), Position::new(3, 3));
    }

    #[test]
    fn position_display_is_1_indexed() {
        assert_eq!(format!("{}", Position::new(9, 14)), "10:15");
        assert_eq!(format!("{:?}", Position::new(2, 5)), "Pos(2:5)");
    }

    // -- Range --------------------------------------------------------------

    #[test]
    fn range_ordered_swaps() {
        let a = Position::new(5, 0);
        let b = Position::new(2, 3);
        let r = Range::ordered(a, b);
        assert_eq!(r.start, b);
        assert_eq!(r.end, a);
    }

    #[test]
    fn range_contains_is_half_open() {
        let r = Range::new(Position::new(1, 0), Position::new(1, 5));
        assert!(r.contains(Position::new(1, 0)));
        assert!(r.contains(Position::new(1, 4)));
        assert!(!r.contains(Position::new(1, 5)));
    }

    #[test]
    fn point_is_empty() {
        assert!(Range::point(Position::new(4, 4)).is_empty());
        assert!(!Range::new(Position::ZERO, Position::new(0, 1)).is_empty());
    }

    // -- CursorPosition -----------------------------------------------------

    #[test]
    fn locate_computes_offset() {
        let lines = ["foo bar", "baz"];
        let c = CursorPosition::locate(&lines, Position::new(1, 2), false);
        assert_eq!(c.line(), 1);
        assert_eq!(c.column(), 2);
        // "foo bar\n" is 8 chars.
        assert_eq!(c.offset(), 10);
    }

    #[test]
    fn locate_clamps_line_and_column() {
        let lines = ["foo", "ab"];
        let c = CursorPosition::locate(&lines, Position::new(9, 9), false);
        assert_eq!(c.position(), Position::new(1, 1));
        assert_eq!(c.offset(), 5);

        let c = CursorPosition::locate(&lines, Position::new(0, 9), true);
        assert_eq!(c.position(), Position::new(0, 3));
    }

    #[test]
    fn locate_counts_chars_not_bytes() {
        let lines = ["café", "x"];
        let c = CursorPosition::locate(&lines, Position::new(1, 0), false);
        assert_eq!(c.offset(), 5);
    }

    #[test]
    fn locate_empty_line_table() {
        let lines: [&str; 0] = [];
        let c = CursorPosition::locate(&lines, Position::new(3, 3), false);
        assert_eq!(c, CursorPosition::default());
    }
}
