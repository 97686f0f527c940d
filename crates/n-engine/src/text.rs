//! Text snapshot — the read-only view of the host's lines for one keystroke.
//!
//! The engine never caches buffer content between keys. On every command the
//! dispatcher pulls the current lines from the host and builds a [`Text`]:
//! a [`ropey::Rope`] of the lines joined by `\n`, plus the coordinate
//! conversions motions and text objects need.
//!
//! # Design choices
//!
//! - **ropey** gives O(log n) line/char indexing and battle-tested Unicode
//!   handling, so motions can walk char indices without re-splitting lines.
//!
//! - **Columns are char offsets**, not byte offsets. Byte offsets never leak
//!   into the public API.
//!
//! - **No trailing line break.** `["a", "b"]` becomes `"a\nb"`, so the rope's
//!   line count always equals the host's line count. An empty host buffer
//!   is one empty line.
//!
//! - **Only `\n` breaks lines.** ropey is built without its CR and Unicode
//!   line-break features, so a `\r`, form feed, or U+2028 inside a host
//!   line is ordinary content.

use ropey::{Rope, RopeSlice};

use crate::position::{CursorPosition, Position, Range};

/// A snapshot of the host buffer. The engine only reads it;
/// [`replace`](Self::replace) is for in-memory hosts.
#[derive(Debug, Clone)]
pub struct Text {
    rope: Rope,
}

impl Text {
    // -- Construction -------------------------------------------------------

    /// Build from host lines. Lines must not contain line breaks.
    #[must_use]
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut joined = String::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                joined.push('\n');
            }
            joined.push_str(line.as_ref());
        }
        Self {
            rope: Rope::from_str(&joined),
        }
    }

    /// Build from a `\n`-separated string (test and harness convenience).
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    // -- Text access --------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Total number of lines. Never zero.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Total character count (Unicode scalar values).
    #[inline]
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// A line including its trailing `\n` (if any).
    #[inline]
    #[must_use]
    pub fn line(&self, line: usize) -> Option<RopeSlice<'_>> {
        if line < self.rope.len_lines() {
            Some(self.rope.line(line))
        } else {
            None
        }
    }

    /// Number of chars in a line **including** the trailing line break.
    #[inline]
    #[must_use]
    pub fn line_len(&self, line: usize) -> Option<usize> {
        self.line(line).map(|l| l.len_chars())
    }

    /// Number of chars in a line **excluding** the trailing `\n`.
    #[must_use]
    pub fn line_content_len(&self, line: usize) -> Option<usize> {
        self.line(line).map(|rope_line| {
            let total = rope_line.len_chars();
            if total > 0 && rope_line.char(total - 1) == '\n' {
                total - 1
            } else {
                total
            }
        })
    }

    /// A line's content without its line break.
    #[must_use]
    pub fn line_string(&self, line: usize) -> String {
        let Some(slice) = self.line(line) else {
            return String::new();
        };
        let len = self.line_content_len(line).unwrap_or(0);
        slice.slice(..len).to_string()
    }

    /// All lines, the inverse of [`from_lines`](Self::from_lines).
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count()).map(|l| self.line_string(l)).collect()
    }

    /// Column of the first non-blank char of `line` (content length if the
    /// line is all blanks).
    #[must_use]
    pub fn first_non_blank(&self, line: usize) -> usize {
        let Some(slice) = self.line(line) else {
            return 0;
        };
        let len = self.line_content_len(line).unwrap_or(0);
        slice
            .chars()
            .take(len)
            .take_while(|ch| *ch == ' ' || *ch == '\t')
            .count()
    }

    /// The char at a position, `None` if out of bounds.
    #[must_use]
    pub fn char_at(&self, pos: Position) -> Option<char> {
        let idx = self.pos_to_char_idx(pos)?;
        (idx < self.rope.len_chars()).then(|| self.rope.char(idx))
    }

    /// The text in a range, `None` if either endpoint is out of bounds.
    #[must_use]
    pub fn slice(&self, range: Range) -> Option<String> {
        let start = self.pos_to_char_idx(range.start)?;
        let end = self.pos_to_char_idx(range.end)?;
        Some(self.rope.slice(start..end).to_string())
    }

    // -- Coordinate conversion ----------------------------------------------

    /// Convert a `Position` to an absolute char index in the rope.
    ///
    /// A column equal to the line's char count (including its break) is
    /// valid: it is the exclusive end of a range touching the line end.
    #[must_use]
    pub fn pos_to_char_idx(&self, pos: Position) -> Option<usize> {
        if pos.line >= self.rope.len_lines() {
            return None;
        }
        let line_start = self.rope.line_to_char(pos.line);
        let line_len = self.rope.line(pos.line).len_chars();
        if pos.col > line_len {
            return None;
        }
        Some(line_start + pos.col)
    }

    /// Convert an absolute char index to a `Position`. An index equal to
    /// `len_chars()` maps to just past the last char.
    #[must_use]
    pub fn char_idx_to_pos(&self, char_idx: usize) -> Option<Position> {
        if char_idx > self.rope.len_chars() {
            return None;
        }
        let line = self.rope.char_to_line(char_idx);
        let line_start = self.rope.line_to_char(line);
        Some(Position::new(line, char_idx - line_start))
    }

    /// Like [`char_idx_to_pos`](Self::char_idx_to_pos) but saturating at the
    /// end of the text. Used for half-open range endpoints.
    #[must_use]
    pub fn idx_to_pos(&self, idx: usize) -> Position {
        let total = self.rope.len_chars();
        self.char_idx_to_pos(idx.min(total)).unwrap_or(Position::ZERO)
    }

    /// Clamp a position to the nearest valid cursor position.
    ///
    /// `past_end = false` keeps the cursor ON a character (normal/visual),
    /// `past_end = true` allows one past the last char (insert).
    #[must_use]
    pub fn clamp_position(&self, pos: Position, past_end: bool) -> Position {
        let line = pos.line.min(self.line_count().saturating_sub(1));
        let col = pos.col.min(self.max_col(line, past_end));
        Position::new(line, col)
    }

    /// Maximum cursor column on `line` for the given cursor limit.
    #[must_use]
    pub fn max_col(&self, line: usize, past_end: bool) -> usize {
        let content_len = self.line_content_len(line).unwrap_or(0);
        if past_end {
            content_len
        } else {
            content_len.saturating_sub(1)
        }
    }

    /// Resolve a position into a host cursor (clamped, with offset).
    #[must_use]
    pub fn cursor_position(&self, pos: Position, past_end: bool) -> CursorPosition {
        let pos = self.clamp_position(pos, past_end);
        let offset = self.rope.line_to_char(pos.line) + pos.col;
        CursorPosition::from_parts(pos.line, pos.col, offset)
    }

    /// The position one char after `pos`, wrapping onto the next line's
    /// start when `pos` is at or past the line content. Saturates at the end
    /// of the text. Turns an inclusive end into an exclusive one.
    #[must_use]
    pub fn after(&self, pos: Position) -> Position {
        let content_len = self.line_content_len(pos.line).unwrap_or(0);
        if pos.col < content_len {
            Position::new(pos.line, pos.col + 1)
        } else if pos.line + 1 < self.line_count() {
            Position::new(pos.line + 1, 0)
        } else {
            Position::new(pos.line, content_len)
        }
    }

    // -- Editing ------------------------------------------------------------

    /// Replace `range` with `replacement`. Returns `false` (and leaves the
    /// text alone) if the range is out of bounds or backwards.
    pub fn replace(&mut self, range: Range, replacement: &str) -> bool {
        let (Some(start), Some(end)) = (
            self.pos_to_char_idx(range.start),
            self.pos_to_char_idx(range.end),
        ) else {
            return false;
        };
        if start > end || end > self.rope.len_chars() {
            return false;
        }
        self.rope.remove(start..end);
        self.rope.insert(start, replacement);
        true
    }
}

impl Default for Text {
    fn default() -> Self {
        Self::from_text("")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
