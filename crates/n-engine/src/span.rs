//! Spans — the region an operator acts on.
//!
//! Motions, text objects, and visual selections all resolve to a [`Span`].
//! The executor never looks at where a span came from, only at its shape:
//!
//! - [`Span::Chars`]: a half-open char range, may cross lines.
//! - [`Span::Lines`]: whole lines, inclusive on both ends.
//! - [`Span::Block`]: a rectangle, half-open in columns.

use crate::position::{Position, Range};
use crate::register::RegisterKind;
use crate::text::Text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    Chars(Range),
    Lines {
        first: usize,
        last: usize,
    },
    Block {
        top: usize,
        bottom: usize,
        left: usize,
        right: usize,
    },
}

impl Span {
    /// Whole lines between two line numbers, in either order.
    #[must_use]
    pub fn lines(a: usize, b: usize) -> Self {
        Self::Lines {
            first: a.min(b),
            last: a.max(b),
        }
    }

    /// Register kind for text taken from this span.
    #[must_use]
    pub const fn register_kind(&self) -> RegisterKind {
        match self {
            Self::Chars(_) => RegisterKind::Char,
            Self::Lines { .. } => RegisterKind::Line,
            Self::Block { .. } => RegisterKind::Block,
        }
    }

    /// Where the cursor lands after deleting or yanking this span.
    #[must_use]
    pub fn start(&self, text: &Text) -> Position {
        match *self {
            Self::Chars(range) => range.start,
            Self::Lines { first, .. } => Position::new(first, text.first_non_blank(first)),
            Self::Block { top, left, .. } => Position::new(top, left),
        }
    }

    /// True when the span covers no text at all.
    #[must_use]
    pub fn is_empty(&self, text: &Text) -> bool {
        match *self {
            Self::Chars(range) => range.is_empty(),
            Self::Lines { .. } => false,
            Self::Block {
                top,
                bottom,
                left,
                right,
            } => {
                right <= left
                    || (top..=bottom).all(|l| text.line_content_len(l).unwrap_or(0) <= left)
            }
        }
    }

    /// The text this span covers, in register form. Linewise text ends
    /// with `\n`; block text is one row per line.
    #[must_use]
    pub fn extract(&self, text: &Text) -> String {
        match *self {
            Self::Chars(range) => text.slice(range).unwrap_or_default(),
            Self::Lines { first, last } => {
                let mut out = String::new();
                for line in first..=last.min(text.line_count().saturating_sub(1)) {
                    out.push_str(&text.line_string(line));
                    out.push('\n');
                }
                out
            }
            Self::Block { .. } => self
                .block_rows(text)
                .into_iter()
                .map(|range| text.slice(range).unwrap_or_default())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Ranges to delete to remove this span, ordered bottom-up so earlier
    /// deletions never shift later ones.
    ///
    /// Deleting lines eats the line break after the last line, or the one
    /// before the first line when the span runs to the end of the text.
    /// Deleting every line leaves a single empty line.
    #[must_use]
    pub fn delete_ranges(&self, text: &Text) -> Vec<Range> {
        match *self {
            Self::Chars(range) => vec![range],
            Self::Lines { first, last } => {
                let last_line = text.line_count().saturating_sub(1);
                let last = last.min(last_line);
                let end_len = text.line_content_len(last).unwrap_or(0);
                let range = if last < last_line {
                    Range::new(Position::new(first, 0), Position::new(last + 1, 0))
                } else if first > 0 {
                    let prev_len = text.line_content_len(first - 1).unwrap_or(0);
                    Range::new(
                        Position::new(first - 1, prev_len),
                        Position::new(last, end_len),
                    )
                } else {
                    Range::new(Position::ZERO, Position::new(last, end_len))
                };
                vec![range]
            }
            Self::Block { .. } => {
                let mut rows = self.block_rows(text);
                rows.retain(|r| !r.is_empty());
                rows.reverse();
                rows
            }
        }
    }

    /// Per-line ranges of a block, top to bottom, clipped to each line.
    #[must_use]
    pub fn block_rows(&self, text: &Text) -> Vec<Range> {
        let Self::Block {
            top,
            bottom,
            left,
            right,
        } = *self
        else {
            return Vec::new();
        };
        let bottom = bottom.min(text.line_count().saturating_sub(1));
        (top..=bottom)
            .map(|line| {
                let len = text.line_content_len(line).unwrap_or(0);
                let start = left.min(len);
                let end = right.min(len);
                Range::new(Position::new(line, start), Position::new(line, end))
            })
            .collect()
    }

    /// Lines this span touches, inclusive.
    #[must_use]
    pub const fn line_bounds(&self) -> (usize, usize) {
        match *self {
            Self::Chars(range) => (range.start.line, range.end.line),
            Self::Lines { first, last } => (first, last),
            Self::Block { top, bottom, .. } => (top, bottom),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn text() -> Text {
        Text::from_lines(&["alpha", "  beta", "gamma"])
    }

    // -- Extraction ---------------------------------------------------------

    #[test]
    fn extract_chars() {
        let s = Span::Chars(Range::new(p(0, 2), p(1, 3)));
        assert_eq!(s.extract(&text()), "pha\n  b");
        assert_eq!(s.register_kind(), RegisterKind::Char);
    }

    #[test]
    fn extract_lines_has_trailing_break() {
        let s = Span::lines(1, 0);
        assert_eq!(s.extract(&text()), "alpha\n  beta\n");
    }

    #[test]
    fn extract_block_clips_short_lines() {
        let t = Text::from_lines(&["abcdef", "ab", "abcdef"]);
        let s = Span::Block {
            top: 0,
            bottom: 2,
            left: 1,
            right: 4,
        };
        assert_eq!(s.extract(&t), "bcd\nb\nbcd");
    }

    // -- Deletion ranges ----------------------------------------------------

    #[test]
    fn delete_middle_lines_eats_following_break() {
        let s = Span::lines(0, 1);
        assert_eq!(s.delete_ranges(&text()), vec![Range::new(p(0, 0), p(2, 0))]);
    }

    #[test]
    fn delete_last_lines_eats_preceding_break() {
        let s = Span::lines(1, 2);
        assert_eq!(s.delete_ranges(&text()), vec![Range::new(p(0, 5), p(2, 5))]);
    }

    #[test]
    fn delete_all_lines_leaves_one_line() {
        let s = Span::lines(0, 9);
        assert_eq!(s.delete_ranges(&text()), vec![Range::new(p(0, 0), p(2, 5))]);
    }

    #[test]
    fn delete_block_is_bottom_up() {
        let t = Text::from_lines(&["abcdef", "a", "abcdef"]);
        let s = Span::Block {
            top: 0,
            bottom: 2,
            left: 2,
            right: 4,
        };
        assert_eq!(
            s.delete_ranges(&t),
            vec![Range::new(p(2, 2), p(2, 4)), Range::new(p(0, 2), p(0, 4))]
        );
    }

    // -- Misc ---------------------------------------------------------------

    #[test]
    fn line_span_starts_at_first_non_blank() {
        assert_eq!(Span::lines(1, 2).start(&text()), p(1, 2));
    }

    #[test]
    fn empty_spans() {
        let t = text();
        assert!(Span::Chars(Range::point(p(0, 1))).is_empty(&t));
        assert!(!Span::lines(0, 0).is_empty(&t));
        let past_end = Span::Block {
            top: 0,
            bottom: 2,
            left: 10,
            right: 12,
        };
        assert!(past_end.is_empty(&t));
    }
}
