//! Cursor — a position plus the sticky column, and the primitive moves.
//!
//! Movement methods take `past_end` instead of a mode:
//!
//! - `past_end = false`: the cursor sits ON a character (Normal, Visual).
//! - `past_end = true`: the cursor may sit after the last char (Insert, and
//!   the far end of exclusive operator ranges).
//!
//! # Sticky column
//!
//! Vertical moves keep the column the cursor had before it passed through
//! shorter lines. Horizontal moves reset it. After `$` it is `usize::MAX`,
//! so `j`/`k` keep hugging line ends.

use crate::command::CharFind;
use crate::position::Position;
use crate::text::Text;
use crate::text_object::{scan_close, scan_open};
use crate::word::{self, WordKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pos: Position,
    sticky_col: usize,
}

impl Cursor {
    /// A cursor at `pos` whose sticky column is its own column.
    #[must_use]
    pub const fn at(pos: Position) -> Self {
        Self {
            pos,
            sticky_col: pos.col,
        }
    }

    /// A cursor at `pos` that remembers an earlier column.
    #[must_use]
    pub const fn with_sticky(pos: Position, sticky_col: usize) -> Self {
        Self { pos, sticky_col }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn sticky_col(&self) -> usize {
        self.sticky_col
    }

    // -- Direct positioning -------------------------------------------------

    /// Jump to `pos` (clamped). Resets the sticky column.
    pub fn set_position(&mut self, pos: Position, text: &Text, past_end: bool) {
        self.pos = text.clamp_position(pos, past_end);
        self.sticky_col = self.pos.col;
    }

    /// Jump to `line` (clamped), keeping the sticky column.
    pub fn goto_line(&mut self, line: usize, text: &Text, past_end: bool) {
        let line = line.min(text.line_count().saturating_sub(1));
        self.pos = Position::new(line, self.sticky_col.min(text.max_col(line, past_end)));
    }

    /// Jump to the first non-blank of `line` (clamped).
    pub fn goto_line_start(&mut self, line: usize, text: &Text, past_end: bool) {
        let line = line.min(text.line_count().saturating_sub(1));
        let col = text.first_non_blank(line).min(text.max_col(line, past_end));
        self.pos = Position::new(line, col);
        self.sticky_col = col;
    }

    // -- Horizontal ---------------------------------------------------------

    /// `h`: no wrapping to the previous line.
    pub fn move_left(&mut self, count: usize, text: &Text, past_end: bool) {
        let col = self.pos.col.min(text.max_col(self.pos.line, past_end));
        self.pos.col = col.saturating_sub(count);
        self.sticky_col = self.pos.col;
    }

    /// `l`: no wrapping to the next line.
    pub fn move_right(&mut self, count: usize, text: &Text, past_end: bool) {
        let max = text.max_col(self.pos.line, past_end);
        self.pos.col = self.pos.col.saturating_add(count).min(max);
        self.sticky_col = self.pos.col;
    }

    /// `0`
    pub const fn move_to_line_start(&mut self) {
        self.pos.col = 0;
        self.sticky_col = 0;
    }

    /// `^`
    pub fn move_to_first_non_blank(&mut self, text: &Text, past_end: bool) {
        self.goto_line_start(self.pos.line, text, past_end);
    }

    /// `$`: `count - 1` lines down, then the last char.
    pub fn move_to_line_end(&mut self, count: usize, text: &Text, past_end: bool) {
        let last = text.line_count().saturating_sub(1);
        self.pos.line = (self.pos.line + count.saturating_sub(1)).min(last);
        self.pos.col = text.max_col(self.pos.line, past_end);
        self.sticky_col = usize::MAX;
    }

    // -- Vertical -----------------------------------------------------------

    pub fn move_up(&mut self, count: usize, text: &Text, past_end: bool) {
        self.goto_line(self.pos.line.saturating_sub(count), text, past_end);
    }

    pub fn move_down(&mut self, count: usize, text: &Text, past_end: bool) {
        self.goto_line(self.pos.line.saturating_add(count), text, past_end);
    }

    // -- Words --------------------------------------------------------------

    /// `w` / `W`
    pub fn word_forward(&mut self, kind: WordKind, count: usize, text: &Text, past_end: bool) {
        self.repeat_word(count, text, past_end, |t, p| word::next_start(t, p, kind));
    }

    /// `b` / `B`
    pub fn word_backward(&mut self, kind: WordKind, count: usize, text: &Text, past_end: bool) {
        self.repeat_word(count, text, past_end, |t, p| word::prev_start(t, p, kind));
    }

    /// `e` / `E`
    pub fn word_end(&mut self, kind: WordKind, count: usize, text: &Text, past_end: bool) {
        self.repeat_word(count, text, past_end, |t, p| word::next_end(t, p, kind));
    }

    fn repeat_word(
        &mut self,
        count: usize,
        text: &Text,
        past_end: bool,
        step: impl Fn(&Text, Position) -> Position,
    ) {
        for _ in 0..count {
            let next = step(text, self.pos);
            if next == self.pos {
                break;
            }
            self.pos = next;
        }
        self.set_position(self.pos, text, past_end);
    }

    // -- Character search ---------------------------------------------------

    /// `f` `F` `t` `T`. Returns `false` (and stays put) when the char is not
    /// found `count` times on the line, or a till search cannot move.
    pub fn find_char(&mut self, find: CharFind, count: usize, text: &Text) -> bool {
        let line = text.line_string(self.pos.line);
        let chars: Vec<char> = line.chars().collect();
        let from = self.pos.col;

        let hit = if find.forward {
            chars
                .iter()
                .enumerate()
                .skip(from + 1)
                .filter(|(_, ch)| **ch == find.ch)
                .nth(count.saturating_sub(1))
                .map(|(i, _)| i)
        } else {
            chars
                .iter()
                .enumerate()
                .take(from)
                .rev()
                .filter(|(_, ch)| **ch == find.ch)
                .nth(count.saturating_sub(1))
                .map(|(i, _)| i)
        };
        let Some(col) = hit else {
            return false;
        };

        let target = match (find.till, find.forward) {
            (false, _) => col,
            (true, true) => col - 1,
            (true, false) => col + 1,
        };
        if find.till && target == from {
            return false;
        }
        self.pos.col = target;
        self.sticky_col = target;
        true
    }

    // -- Paragraphs ---------------------------------------------------------

    /// `}`: next blank line below, or the last line. Starting on a blank
    /// line skips that blank run first.
    pub fn paragraph_forward(&mut self, count: usize, text: &Text) {
        let line_count = text.line_count();
        let blank = |l: usize| text.line_content_len(l).unwrap_or(0) == 0;
        for _ in 0..count {
            let mut i = self.pos.line + 1;
            if blank(self.pos.line) {
                while i < line_count && blank(i) {
                    i += 1;
                }
            }
            while i < line_count && !blank(i) {
                i += 1;
            }
            self.pos.line = i.min(line_count.saturating_sub(1));
        }
        self.pos.col = if blank(self.pos.line) {
            0
        } else {
            text.max_col(self.pos.line, false)
        };
        self.sticky_col = self.pos.col;
    }

    /// `{`: previous blank line above, or the first line.
    pub fn paragraph_backward(&mut self, count: usize, text: &Text) {
        let blank = |l: usize| text.line_content_len(l).unwrap_or(0) == 0;
        for _ in 0..count {
            if self.pos.line == 0 {
                break;
            }
            let mut i = self.pos.line - 1;
            if blank(self.pos.line) {
                while i > 0 && blank(i) {
                    i -= 1;
                }
            }
            while i > 0 && !blank(i) {
                i -= 1;
            }
            self.pos.line = i;
        }
        self.pos.col = 0;
        self.sticky_col = 0;
    }

    // -- Brackets -----------------------------------------------------------

    /// `%`: from the first bracket at or after the cursor on this line, jump
    /// to its partner. Returns `false` if there is no bracket or no partner.
    pub fn match_bracket(&mut self, text: &Text) -> bool {
        const PAIRS: [(char, char); 3] = [('(', ')'), ('[', ']'), ('{', '}')];

        let Some(line_start) = text.pos_to_char_idx(Position::new(self.pos.line, 0)) else {
            return false;
        };
        let content_len = text.line_content_len(self.pos.line).unwrap_or(0);
        let rope = text.rope();

        for col in self.pos.col..content_len {
            let idx = line_start + col;
            let ch = rope.char(idx);
            let partner = PAIRS.iter().find_map(|&(open, close)| {
                if ch == open {
                    scan_close(rope, idx, open, close)
                } else if ch == close {
                    scan_open(rope, idx, open, close)
                } else {
                    None
                }
            });
            if PAIRS.iter().any(|&(o, c)| ch == o || ch == c) {
                let Some(target) = partner else {
                    return false;
                };
                self.pos = text.idx_to_pos(target);
                self.sticky_col = self.pos.col;
                return true;
            }
        }
        false
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

    fn sample() -> Text {
        Text::from_lines(&["hello world", "hi", "", "  indented line"])
    }

    fn find(ch: char, forward: bool, till: bool) -> CharFind {
        CharFind { ch, forward, till }
    }

    // -- Horizontal ---------------------------------------------------------

    #[test]
    fn left_right_clamp_to_line() {
        let t = sample();
        let mut c = Cursor::at(p(0, 3));
        c.move_left(10, &t, false);
        assert_eq!(c.position(), p(0, 0));
        c.move_right(100, &t, false);
        assert_eq!(c.position(), p(0, 10));
        c.move_right(1, &t, true);
        assert_eq!(c.position(), p(0, 11));
    }

    #[test]
    fn first_non_blank_and_line_end() {
        let t = sample();
        let mut c = Cursor::at(p(3, 10));
        c.move_to_first_non_blank(&t, false);
        assert_eq!(c.position(), p(3, 2));
        c.move_to_line_end(1, &t, false);
        assert_eq!(c.position(), p(3, 14));
    }

    #[test]
    fn line_end_with_count_moves_down() {
        let t = sample();
        let mut c = Cursor::at(p(0, 0));
        c.move_to_line_end(2, &t, false);
        assert_eq!(c.position(), p(1, 1));
    }

    // -- Vertical -----------------------------------------------------------

    #[test]
    fn sticky_column_survives_short_lines() {
        let t = sample();
        let mut c = Cursor::at(p(0, 8));
        c.move_down(1, &t, false);
        assert_eq!(c.position(), p(1, 1));
        c.move_down(1, &t, false);
        assert_eq!(c.position(), p(2, 0));
        c.move_down(1, &t, false);
        assert_eq!(c.position(), p(3, 8));
    }

    #[test]
    fn sticky_after_dollar_hugs_line_end() {
        let t = sample();
        let mut c = Cursor::at(p(1, 0));
        c.move_to_line_end(1, &t, false);
        c.move_up(1, &t, false);
        assert_eq!(c.position(), p(0, 10));
    }

    #[test]
    fn vertical_clamps_to_buffer() {
        let t = sample();
        let mut c = Cursor::at(p(1, 0));
        c.move_up(9, &t, false);
        assert_eq!(c.position().line, 0);
        c.move_down(99, &t, false);
        assert_eq!(c.position().line, 3);
    }

    // -- Words --------------------------------------------------------------

    #[test]
    fn word_motion_with_count() {
        let t = Text::from_text("a b c d");
        let mut c = Cursor::at(p(0, 0));
        c.word_forward(WordKind::Small, 3, &t, false);
        assert_eq!(c.position(), p(0, 6));
        c.word_backward(WordKind::Small, 2, &t, false);
        assert_eq!(c.position(), p(0, 2));
        c.word_end(WordKind::Small, 1, &t, false);
        assert_eq!(c.position(), p(0, 4));
    }

    // -- Character search ---------------------------------------------------

    #[test]
    fn find_forward_and_backward() {
        let t = Text::from_text("a,b,c,d");
        let mut c = Cursor::at(p(0, 0));
        assert!(c.find_char(find(',', true, false), 2, &t));
        assert_eq!(c.position(), p(0, 3));
        assert!(c.find_char(find(',', false, false), 1, &t));
        assert_eq!(c.position(), p(0, 1));
    }

    #[test]
    fn till_stops_short() {
        let t = Text::from_text("abc)");
        let mut c = Cursor::at(p(0, 0));
        assert!(c.find_char(find(')', true, true), 1, &t));
        assert_eq!(c.position(), p(0, 2));
        // Already adjacent: cannot move.
        assert!(!c.find_char(find(')', true, true), 1, &t));
        assert!(c.find_char(find('a', false, true), 1, &t));
        assert_eq!(c.position(), p(0, 1));
    }

    #[test]
    fn find_missing_stays() {
        let t = Text::from_text("abc");
        let mut c = Cursor::at(p(0, 1));
        assert!(!c.find_char(find('z', true, false), 1, &t));
        assert!(!c.find_char(find('c', true, false), 2, &t));
        assert_eq!(c.position(), p(0, 1));
    }

    // -- Paragraphs ---------------------------------------------------------

    #[test]
    fn paragraphs() {
        let t = Text::from_lines(&["a", "b", "", "c", "", "", "d"]);
        let mut c = Cursor::at(p(0, 0));
        c.paragraph_forward(1, &t);
        assert_eq!(c.position(), p(2, 0));
        c.paragraph_forward(1, &t);
        assert_eq!(c.position(), p(4, 0));
        c.paragraph_forward(1, &t);
        assert_eq!(c.position(), p(6, 0));
        c.paragraph_backward(1, &t);
        assert_eq!(c.position(), p(5, 0));
        c.paragraph_backward(2, &t);
        assert_eq!(c.position(), p(0, 0));
    }

    // -- Brackets -----------------------------------------------------------

    #[test]
    fn percent_jumps_between_partners() {
        let t = Text::from_lines(&["if (a[0]) {", "}"]);
        let mut c = Cursor::at(p(0, 0));
        assert!(c.match_bracket(&t));
        assert_eq!(c.position(), p(0, 8));
        assert!(c.match_bracket(&t));
        assert_eq!(c.position(), p(0, 3));

        let mut c = Cursor::at(p(0, 9));
        assert!(c.match_bracket(&t));
        assert_eq!(c.position(), p(1, 0));
    }

    #[test]
    fn percent_without_bracket_fails() {
        let t = Text::from_text("plain (");
        let mut c = Cursor::at(p(0, 0));
        assert!(!c.match_bracket(&t));
        assert_eq!(c.position(), p(0, 0));
    }
}
