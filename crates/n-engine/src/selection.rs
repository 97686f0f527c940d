//! Visual selection — the anchor/cursor pair behind `v`, `V`, and `Ctrl-v`.
//!
//! `start` is where visual mode began and never moves on its own; `end`
//! follows the cursor. How the two positions turn into a region depends on
//! the granularity:
//!
//! - **Char**: textually first to textually last, both ends inclusive.
//! - **Line**: every line between them, in full.
//! - **Block**: the rectangle of their line range by their column range.

use crate::mode::VisualKind;
use crate::position::{Position, Range};
use crate::span::Span;
use crate::text::Text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualSelection {
    pub start: Position,
    pub end: Position,
    pub granularity: VisualKind,
}

impl VisualSelection {
    /// A collapsed selection at `anchor`.
    #[must_use]
    pub const fn new(anchor: Position, granularity: VisualKind) -> Self {
        Self {
            start: anchor,
            end: anchor,
            granularity,
        }
    }

    /// Move the live end to the cursor.
    pub const fn track(&mut self, cursor: Position) {
        self.end = cursor;
    }

    /// Swap anchor and live end (`o`). Returns the new live end.
    pub fn swap(&mut self) -> Position {
        std::mem::swap(&mut self.start, &mut self.end);
        self.end
    }

    /// The two ends in text order.
    #[must_use]
    pub fn ordered(&self) -> (Position, Position) {
        let r = Range::ordered(self.start, self.end);
        (r.start, r.end)
    }

    /// The region this selection covers.
    #[must_use]
    pub fn span(&self, text: &Text) -> Span {
        let (first, last) = self.ordered();
        match self.granularity {
            VisualKind::Char => {
                let first = text.clamp_position(first, true);
                let last = text.clamp_position(last, true);
                Span::Chars(Range::new(first, text.after(last)))
            }
            VisualKind::Line => Span::lines(first.line, last.line),
            VisualKind::Block => Span::Block {
                top: first.line,
                bottom: last.line,
                left: self.start.col.min(self.end.col),
                right: self.start.col.max(self.end.col) + 1,
            },
        }
    }

    /// [`span`](Self::span) for a selection extended with `$`: a Char
    /// selection running forward also takes the line break after its live
    /// end.
    #[must_use]
    pub fn span_to_line_end(&self, text: &Text) -> Span {
        let mut sel = *self;
        if sel.granularity == VisualKind::Char && sel.end >= sel.start {
            sel.end.col = text.line_content_len(sel.end.line).unwrap_or(0);
        }
        sel.span(text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
