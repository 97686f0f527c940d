//! Word motions over a [`Text`] snapshot.
//!
//! | Function       | Small (`WordKind::Small`) | Big (`WordKind::Big`) |
//! |----------------|---------------------------|-----------------------|
//! | [`next_start`] | `w`                       | `W`                   |
//! | [`prev_start`] | `b`                       | `B`                   |
//! | [`next_end`]   | `e`                       | `E`                   |
//!
//! A small word is a run of word characters (letters, digits, `_`) or a run
//! of other non-blank characters. A big word is any run of non-blanks.
//! An empty line counts as a word of its own for `w` and `b`.

use crate::position::Position;
use crate::text::Text;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Which word definition a motion or text object uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordKind {
    /// `w` / `b` / `e` / `iw`: punctuation and word chars split.
    Small,
    /// `W` / `B` / `E` / `iW`: only blanks split.
    Big,
}

/// Character class for word boundary detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    Word,
    Punctuation,
    Blank,
    Newline,
}

impl CharClass {
    /// True for the classes that make up a word body.
    pub(crate) const fn is_word_body(self) -> bool {
        matches!(self, Self::Word | Self::Punctuation)
    }
}

impl WordKind {
    pub(crate) fn classify(self, ch: char) -> CharClass {
        if ch == '\n' {
            CharClass::Newline
        } else if ch.is_whitespace() {
            CharClass::Blank
        } else if self == Self::Big || ch.is_alphanumeric() || ch == '_' {
            CharClass::Word
        } else {
            CharClass::Punctuation
        }
    }
}

// ---------------------------------------------------------------------------
// Motions
// ---------------------------------------------------------------------------

/// Start of the next word. Returns `pos` unchanged when there is none.
#[must_use]
pub fn next_start(text: &Text, pos: Position, kind: WordKind) -> Position {
    let rope = text.rope();
    let total = rope.len_chars();
    let Some(mut idx) = text.pos_to_char_idx(pos) else {
        return pos;
    };
    if idx + 1 >= total {
        return pos;
    }

    let class = kind.classify(rope.char(idx));
    if class.is_word_body() {
        while idx < total && kind.classify(rope.char(idx)) == class {
            idx += 1;
        }
    }

    while idx < total {
        match kind.classify(rope.char(idx)) {
            CharClass::Word | CharClass::Punctuation => break,
            CharClass::Blank => idx += 1,
            CharClass::Newline => {
                idx += 1;
                if idx < total && kind.classify(rope.char(idx)) == CharClass::Newline {
                    // Empty line.
                    break;
                }
            }
        }
    }

    if idx >= total {
        return pos;
    }
    text.char_idx_to_pos(idx).unwrap_or(pos)
}

/// Start of the current or previous word. Returns `pos` at the buffer start.
#[must_use]
pub fn prev_start(text: &Text, pos: Position, kind: WordKind) -> Position {
    let rope = text.rope();
    let Some(start) = text.pos_to_char_idx(pos) else {
        return pos;
    };
    if start == 0 {
        return pos;
    }

    let mut idx = start - 1;
    loop {
        match kind.classify(rope.char(idx)) {
            CharClass::Word | CharClass::Punctuation => break,
            CharClass::Newline => {
                let line = rope.char_to_line(idx);
                if text.line_content_len(line) == Some(0) {
                    return Position::new(line, 0);
                }
            }
            CharClass::Blank => {}
        }
        if idx == 0 {
            return Position::ZERO;
        }
        idx -= 1;
    }

    let class = kind.classify(rope.char(idx));
    while idx > 0 && kind.classify(rope.char(idx - 1)) == class {
        idx -= 1;
    }
    text.char_idx_to_pos(idx).unwrap_or(pos)
}

/// Last char of the current or next word. Returns `pos` when there is none.
#[must_use]
pub fn next_end(text: &Text, pos: Position, kind: WordKind) -> Position {
    let rope = text.rope();
    let total = rope.len_chars();
    let Some(start) = text.pos_to_char_idx(pos) else {
        return pos;
    };
    let last = total.saturating_sub(1);
    if start >= last {
        return pos;
    }

    let mut idx = start + 1;
    while idx < total && !kind.classify(rope.char(idx)).is_word_body() {
        idx += 1;
    }
    if idx >= total {
        return pos;
    }

    let class = kind.classify(rope.char(idx));
    while idx < last && kind.classify(rope.char(idx + 1)) == class {
        idx += 1;
    }
    text.char_idx_to_pos(idx).unwrap_or(pos)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use WordKind::{Big, Small};

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn text(s: &str) -> Text {
        Text::from_text(s)
    }

    // -- Classification -----------------------------------------------------

    #[test]
    fn small_splits_punctuation() {
        assert_eq!(Small.classify('a'), CharClass::Word);
        assert_eq!(Small.classify('_'), CharClass::Word);
        assert_eq!(Small.classify('é'), CharClass::Word);
        assert_eq!(Small.classify('.'), CharClass::Punctuation);
        assert_eq!(Small.classify('\t'), CharClass::Blank);
        assert_eq!(Small.classify('\n'), CharClass::Newline);
    }

    #[test]
    fn big_merges_punctuation() {
        assert_eq!(Big.classify('.'), CharClass::Word);
        assert_eq!(Big.classify('a'), CharClass::Word);
        assert_eq!(Big.classify(' '), CharClass::Blank);
    }

    // -- next_start ---------------------------------------------------------

    #[test]
    fn w_basic() {
        let t = text("foo bar baz");
        assert_eq!(next_start(&t, p(0, 0), Small), p(0, 4));
        assert_eq!(next_start(&t, p(0, 5), Small), p(0, 8));
    }

    #[test]
    fn w_stops_at_punctuation() {
        let t = text("foo.bar");
        assert_eq!(next_start(&t, p(0, 0), Small), p(0, 3));
        assert_eq!(next_start(&t, p(0, 3), Small), p(0, 4));
        assert_eq!(next_start(&t, p(0, 0), Big), p(0, 0));
    }

    #[test]
    fn w_crosses_lines() {
        let t = text("foo\n  bar");
        assert_eq!(next_start(&t, p(0, 1), Small), p(1, 2));
    }

    #[test]
    fn w_stops_on_empty_line() {
        let t = text("foo\n\nbar");
        assert_eq!(next_start(&t, p(0, 0), Small), p(1, 0));
        assert_eq!(next_start(&t, p(1, 0), Small), p(2, 0));
    }

    #[test]
    fn w_last_word_stays() {
        let t = text("foo bar");
        assert_eq!(next_start(&t, p(0, 4), Small), p(0, 4));
    }

    #[test]
    fn big_w_skips_punctuation() {
        let t = text("a.b c");
        assert_eq!(next_start(&t, p(0, 0), Big), p(0, 4));
    }

    // -- prev_start ---------------------------------------------------------

    #[test]
    fn b_basic() {
        let t = text("foo bar baz");
        assert_eq!(prev_start(&t, p(0, 8), Small), p(0, 4));
        assert_eq!(prev_start(&t, p(0, 6), Small), p(0, 4));
        assert_eq!(prev_start(&t, p(0, 0), Small), p(0, 0));
    }

    #[test]
    fn b_crosses_lines() {
        let t = text("foo bar\nbaz");
        assert_eq!(prev_start(&t, p(1, 0), Small), p(0, 4));
    }

    #[test]
    fn b_stops_on_empty_line() {
        let t = text("foo\n\nbar");
        assert_eq!(prev_start(&t, p(2, 0), Small), p(1, 0));
        assert_eq!(prev_start(&t, p(1, 0), Small), p(0, 0));
    }

    #[test]
    fn big_b() {
        let t = text("x a.b");
        assert_eq!(prev_start(&t, p(0, 4), Big), p(0, 2));
        assert_eq!(prev_start(&t, p(0, 4), Small), p(0, 3));
    }

    #[test]
    fn b_from_leading_blank() {
        let t = text("   foo");
        assert_eq!(prev_start(&t, p(0, 2), Small), p(0, 0));
    }

    // -- next_end -----------------------------------------------------------

    #[test]
    fn e_basic() {
        let t = text("foo bar");
        assert_eq!(next_end(&t, p(0, 0), Small), p(0, 2));
        assert_eq!(next_end(&t, p(0, 2), Small), p(0, 6));
    }

    #[test]
    fn e_skips_empty_lines() {
        let t = text("a\n\n  bc");
        assert_eq!(next_end(&t, p(0, 0), Small), p(2, 3));
    }

    #[test]
    fn e_at_end_stays() {
        let t = text("foo");
        assert_eq!(next_end(&t, p(0, 2), Small), p(0, 2));
    }

    #[test]
    fn big_e() {
        let t = text("a.b c");
        assert_eq!(next_end(&t, p(0, 0), Big), p(0, 2));
        assert_eq!(next_end(&t, p(0, 0), Small), p(0, 1));
    }
}
