//! Text objects — regions selected by structure instead of by motion.
//!
//! ```text
//! operator + text object = action
//! d        + iw          = delete inner word
//! c        + i"          = change inside quotes
//! y        + a(          = yank around parentheses
//! ```
//!
//! [`select`] resolves an object at a position into a [`Span`], or `None`
//! when the object does not exist there (no enclosing brackets, no quote
//! pair on the line).
//!
//! A count repeats the object: `d3aw` takes three words (stopping at the
//! line end), `2di(` the inside of the second enclosing pair, `2ap` two
//! paragraphs. Quotes ignore the count.
//!
//! | Keys                     | Object                          |
//! |--------------------------|---------------------------------|
//! | `w`                      | word                            |
//! | `W`                      | WORD                            |
//! | `"` `'` `` ` ``          | quoted string (current line)    |
//! | `(` `)` `b`              | parenthesized block             |
//! | `[` `]`                  | square-bracketed block          |
//! | `{` `}` `B`              | curly-braced block              |
//! | `<` `>`                  | angle-bracketed block           |
//! | `p`                      | paragraph (linewise)            |

use ropey::Rope;

use crate::position::{Position, Range};
use crate::span::Span;
use crate::text::Text;
use crate::word::{CharClass, WordKind};

/// A text object, independent of its inner/around selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextObject {
    Word(WordKind),
    Quote(char),
    Bracket { open: char, close: char },
    Paragraph,
}

impl TextObject {
    /// Map the key after `i`/`a` to an object.
    #[must_use]
    pub const fn from_key(key: char) -> Option<Self> {
        let object = match key {
            'w' => Self::Word(WordKind::Small),
            'W' => Self::Word(WordKind::Big),
            '"' | '\'' | '`' => Self::Quote(key),
            '(' | ')' | 'b' => Self::Bracket {
                open: '(',
                close: ')',
            },
            '[' | ']' => Self::Bracket {
                open: '[',
                close: ']',
            },
            '{' | '}' | 'B' => Self::Bracket {
                open: '{',
                close: '}',
            },
            '<' | '>' => Self::Bracket {
                open: '<',
                close: '>',
            },
            'p' => Self::Paragraph,
            _ => return None,
        };
        Some(object)
    }
}

/// Resolve `count` repetitions of `object` around `pos`. `around` selects
/// the `a` variant.
#[must_use]
pub fn select(
    text: &Text,
    pos: Position,
    object: TextObject,
    around: bool,
    count: usize,
) -> Option<Span> {
    let count = count.max(1);
    match object {
        TextObject::Word(kind) => words(text, pos, kind, around, count).map(Span::Chars),
        TextObject::Quote(quote) => {
            let (open, close) = quote_pair(text, pos, quote)?;
            let range = if around {
                Range::new(
                    Position::new(pos.line, open),
                    Position::new(pos.line, close + 1),
                )
            } else {
                Range::new(
                    Position::new(pos.line, open + 1),
                    Position::new(pos.line, close),
                )
            };
            Some(Span::Chars(range))
        }
        TextObject::Bracket { open, close } => {
            let (mut open_idx, mut close_idx) = bracket_pair(text, pos, open, close)?;
            for _ in 1..count {
                let rope = text.rope();
                open_idx = scan_open(rope, open_idx, open, close)?;
                close_idx = scan_close(rope, open_idx, open, close)?;
            }
            let range = if around {
                Range::new(text.idx_to_pos(open_idx), text.idx_to_pos(close_idx + 1))
            } else {
                Range::new(text.idx_to_pos(open_idx + 1), text.idx_to_pos(close_idx))
            };
            Some(Span::Chars(range))
        }
        TextObject::Paragraph => {
            let Span::Lines { first, mut last } = paragraph(text, pos.line, around)? else {
                return None;
            };
            for _ in 1..count {
                if last + 1 >= text.line_count() {
                    break;
                }
                if let Some(Span::Lines { last: next, .. }) = paragraph(text, last + 1, around) {
                    last = next;
                }
            }
            Some(Span::Lines { first, last })
        }
    }
}

// ---------------------------------------------------------------------------
// Words
// ---------------------------------------------------------------------------

/// `count` word objects starting at `pos`, each one picked up where the
/// previous ended. Repetition stops at the end of the line.
fn words(text: &Text, pos: Position, kind: WordKind, around: bool, count: usize) -> Option<Range> {
    let one = |at: Position| {
        if around {
            around_word(text, at, kind)
        } else {
            inner_word(text, at, kind)
        }
    };
    let first = one(pos)?;
    let mut end = first.end;
    for _ in 1..count {
        if end.line != pos.line || end.col >= text.line_content_len(end.line).unwrap_or(0) {
            break;
        }
        match one(end) {
            Some(next) if next.end > end => end = next.end,
            _ => break,
        }
    }
    Some(Range::new(first.start, end))
}

/// The run of same-class chars under the cursor. On a line break, just the
/// break itself.
fn inner_word(text: &Text, pos: Position, kind: WordKind) -> Option<Range> {
    let rope = text.rope();
    let total = rope.len_chars();
    let idx = text.pos_to_char_idx(pos)?;
    if idx >= total {
        return None;
    }

    let class = kind.classify(rope.char(idx));
    if class == CharClass::Newline {
        return Some(Range::new(text.idx_to_pos(idx), text.idx_to_pos(idx + 1)));
    }
    let (start, end) = class_run(rope, idx, |ch| kind.classify(ch) == class);
    Some(Range::new(text.idx_to_pos(start), text.idx_to_pos(end)))
}

/// The word plus trailing blanks, or leading blanks when there are no
/// trailing ones. On blanks, the blanks plus the following word.
fn around_word(text: &Text, pos: Position, kind: WordKind) -> Option<Range> {
    let rope = text.rope();
    let total = rope.len_chars();
    let inner = inner_word(text, pos, kind)?;
    let start = text.pos_to_char_idx(inner.start)?;
    let end = text.pos_to_char_idx(inner.end).unwrap_or(total);
    let is_blank = |i: usize| kind.classify(rope.char(i)) == CharClass::Blank;

    match kind.classify(rope.char(start)) {
        CharClass::Word | CharClass::Punctuation => {
            let mut new_end = end;
            while new_end < total && is_blank(new_end) {
                new_end += 1;
            }
            if new_end > end {
                return Some(Range::new(inner.start, text.idx_to_pos(new_end)));
            }
            let mut new_start = start;
            while new_start > 0 && is_blank(new_start - 1) {
                new_start -= 1;
            }
            Some(Range::new(text.idx_to_pos(new_start), inner.end))
        }
        CharClass::Blank => {
            let mut new_end = end;
            if new_end < total {
                let next = kind.classify(rope.char(new_end));
                if next.is_word_body() {
                    while new_end < total && kind.classify(rope.char(new_end)) == next {
                        new_end += 1;
                    }
                }
            }
            Some(Range::new(inner.start, text.idx_to_pos(new_end)))
        }
        CharClass::Newline => Some(inner),
    }
}

/// Expand from `idx` in both directions while `same` holds. Returns the
/// half-open char index range.
fn class_run(rope: &Rope, idx: usize, same: impl Fn(char) -> bool) -> (usize, usize) {
    let mut start = idx;
    while start > 0 && same(rope.char(start - 1)) {
        start -= 1;
    }
    let mut end = idx + 1;
    while end < rope.len_chars() && same(rope.char(end)) {
        end += 1;
    }
    (start, end)
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

/// Columns of the quote pair containing the cursor, or the next pair to its
/// right. Quotes pair up left to right on the cursor line.
fn quote_pair(text: &Text, pos: Position, quote: char) -> Option<(usize, usize)> {
    let line = text.line_string(pos.line);
    let cols: Vec<usize> = line
        .chars()
        .enumerate()
        .filter_map(|(i, ch)| (ch == quote).then_some(i))
        .collect();

    let pairs = cols.chunks_exact(2).map(|pair| (pair[0], pair[1]));
    let mut next = None;
    for (open, close) in pairs {
        if (open..=close).contains(&pos.col) {
            return Some((open, close));
        }
        if next.is_none() && open > pos.col {
            next = Some((open, close));
        }
    }
    next
}

// ---------------------------------------------------------------------------
// Brackets
// ---------------------------------------------------------------------------

/// Char indices of the innermost `open`/`close` pair around `pos`. Nesting
/// is tracked and the search crosses lines. A cursor on either bracket
/// selects that bracket's pair.
fn bracket_pair(text: &Text, pos: Position, open: char, close: char) -> Option<(usize, usize)> {
    let rope = text.rope();
    let idx = text.pos_to_char_idx(pos)?;
    if idx >= rope.len_chars() {
        return None;
    }

    match rope.char(idx) {
        ch if ch == open => Some((idx, scan_close(rope, idx, open, close)?)),
        ch if ch == close => Some((scan_open(rope, idx, open, close)?, idx)),
        _ => {
            let open_idx = scan_open(rope, idx, open, close)?;
            let close_idx = scan_close(rope, open_idx, open, close)?;
            (idx < close_idx).then_some((open_idx, close_idx))
        }
    }
}

/// Nearest unmatched `open` before `from`.
pub(crate) fn scan_open(rope: &Rope, from: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for i in (0..from).rev() {
        let ch = rope.char(i);
        if ch == close {
            depth += 1;
        } else if ch == open {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
    }
    None
}

/// The `close` matching the `open` at `from`.
pub(crate) fn scan_close(rope: &Rope, from: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for i in (from + 1)..rope.len_chars() {
        let ch = rope.char(i);
        if ch == open {
            depth += 1;
        } else if ch == close {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Paragraphs
// ---------------------------------------------------------------------------

/// `ip`: the run of lines sharing the cursor line's blankness.
/// `ap`: that run plus the blank lines after it (or before it when it ends
/// the text).
fn paragraph(text: &Text, line: usize, around: bool) -> Option<Span> {
    let count = text.line_count();
    if line >= count {
        return None;
    }
    let blank = |l: usize| text.line_content_len(l).unwrap_or(0) == 0;
    let kind = blank(line);

    let mut first = line;
    while first > 0 && blank(first - 1) == kind {
        first -= 1;
    }
    let mut last = line;
    while last + 1 < count && blank(last + 1) == kind {
        last += 1;
    }

    if around {
        if last + 1 < count {
            let other = blank(last + 1);
            last += 1;
            while last + 1 < count && blank(last + 1) == other {
                last += 1;
            }
        } else {
            while first > 0 && blank(first - 1) != kind {
                first -= 1;
            }
        }
    }
    Some(Span::Lines { first, last })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
