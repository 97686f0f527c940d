//! Motion resolution — where a motion lands, and what an operator covers.
//!
//! Every motion has a class that decides how an operator uses it:
//!
//! | Class     | Motions                                  | Operator covers                 |
//! |-----------|------------------------------------------|---------------------------------|
//! | Exclusive | `h l w b W B 0 ^ { }`                    | start up to (not incl.) target  |
//! | Inclusive | `e E $ f t ; , %`                        | start through the target char   |
//! | Linewise  | `j k gg G + - _ Enter`, doubled ops      | every line from start to target |
//!
//! The Vim special cases live here rather than in the executor:
//!
//! - `cw` on a non-blank acts like `ce`.
//! - `dw` whose last word ends a line stops at that line's end instead of
//!   eating the line break.
//! - A char search that lands before the cursor (`F`, `T`, or `;`/`,`
//!   going backward) is exclusive.
//! - `{`/`}` ending in column 0 stop at the end of the line before. If the
//!   start is at or before its line's first non-blank, whole lines are
//!   taken. `}` that runs into the end of the text is inclusive.

use crate::command::{CharFind, Motion, Operator};
use crate::cursor::Cursor;
use crate::executor::ExecError;
use crate::position::{Position, Range};
use crate::span::Span;
use crate::text::Text;
use crate::word::{self, WordKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionClass {
    Exclusive,
    Inclusive,
    Linewise,
}

impl Motion {
    #[must_use]
    pub const fn class(self) -> MotionClass {
        match self {
            Self::Left
            | Self::Right
            | Self::WordForward(_)
            | Self::WordBackward(_)
            | Self::LineStart
            | Self::FirstNonBlank
            | Self::ParagraphForward
            | Self::ParagraphBackward => MotionClass::Exclusive,
            Self::WordEnd(_)
            | Self::LineEnd
            | Self::MatchBracket
            | Self::Find(_)
            | Self::RepeatFind
            | Self::RepeatFindReverse => MotionClass::Inclusive,
            Self::Up
            | Self::Down
            | Self::FirstLine
            | Self::LastLine
            | Self::NextLineStart
            | Self::PrevLineStart
            | Self::CurrentLineStart
            | Self::Lines => MotionClass::Linewise,
        }
    }
}

/// A resolved motion: the moved cursor, plus the char search to remember
/// for `;` and `,` when the motion was a new `f`/`t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landing {
    pub cursor: Cursor,
    pub find: Option<CharFind>,
}

/// Move `cursor` by `motion`.
///
/// # Errors
///
/// [`ExecError::NoMatch`] when the motion has no target: a char search that
/// fails, `%` without a bracket, `;` with no earlier search, or `j`/`k`
/// that cannot move at all.
pub fn resolve(
    text: &Text,
    cursor: Cursor,
    motion: Motion,
    count: Option<usize>,
    last_find: Option<CharFind>,
    past_end: bool,
) -> Result<Landing, ExecError> {
    let n = count.unwrap_or(1).max(1);
    let mut c = cursor;
    let mut find = None;
    let line = cursor.position().line;

    match motion {
        Motion::Left => c.move_left(n, text, past_end),
        Motion::Right => c.move_right(n, text, past_end),
        Motion::Up => {
            if line == 0 {
                return Err(ExecError::NoMatch);
            }
            c.move_up(n, text, past_end);
        }
        Motion::Down => {
            if line + 1 >= text.line_count() {
                return Err(ExecError::NoMatch);
            }
            c.move_down(n, text, past_end);
        }
        Motion::WordForward(kind) => c.word_forward(kind, n, text, past_end),
        Motion::WordBackward(kind) => c.word_backward(kind, n, text, past_end),
        Motion::WordEnd(kind) => c.word_end(kind, n, text, past_end),
        Motion::LineStart => c.move_to_line_start(),
        Motion::FirstNonBlank => c.move_to_first_non_blank(text, past_end),
        Motion::LineEnd => c.move_to_line_end(n, text, past_end),
        Motion::FirstLine => c.goto_line_start(count.map_or(0, |n| n - 1), text, past_end),
        Motion::LastLine => {
            let last = text.line_count().saturating_sub(1);
            c.goto_line_start(count.map_or(last, |n| n.saturating_sub(1)), text, past_end);
        }
        Motion::ParagraphForward => c.paragraph_forward(n, text),
        Motion::ParagraphBackward => c.paragraph_backward(n, text),
        Motion::MatchBracket => {
            if !c.match_bracket(text) {
                return Err(ExecError::NoMatch);
            }
        }
        Motion::Find(f) => {
            if !c.find_char(f, n, text) {
                return Err(ExecError::NoMatch);
            }
            find = Some(f);
        }
        Motion::RepeatFind | Motion::RepeatFindReverse => {
            let last = last_find.ok_or(ExecError::NoMatch)?;
            let f = if motion == Motion::RepeatFind {
                last
            } else {
                last.reversed()
            };
            // A repeated till search next to its char would not move, so it
            // skips to the following occurrence.
            if !c.find_char(f, n, text) && !(f.till && c.find_char(f, n + 1, text)) {
                return Err(ExecError::NoMatch);
            }
        }
        Motion::NextLineStart => {
            if line + 1 >= text.line_count() {
                return Err(ExecError::NoMatch);
            }
            c.goto_line_start(line.saturating_add(n), text, past_end);
        }
        Motion::PrevLineStart => {
            if line == 0 {
                return Err(ExecError::NoMatch);
            }
            c.goto_line_start(line.saturating_sub(n), text, past_end);
        }
        Motion::CurrentLineStart | Motion::Lines => {
            c.goto_line_start(line.saturating_add(n - 1), text, past_end);
        }
    }

    Ok(Landing { cursor: c, find })
}

/// The span `operator` covers when combined with `motion`.
///
/// # Errors
///
/// Whatever [`resolve`] reports for the motion.
pub fn operator_span(
    text: &Text,
    cursor: Cursor,
    operator: Operator,
    motion: Motion,
    count: Option<usize>,
    last_find: Option<CharFind>,
) -> Result<(Span, Option<CharFind>), ExecError> {
    let start = cursor.position();
    let n = count.unwrap_or(1).max(1);

    match motion {
        Motion::Lines => {
            let last = (start.line + n - 1).min(text.line_count().saturating_sub(1));
            return Ok((Span::lines(start.line, last), None));
        }
        Motion::WordForward(kind) if operator == Operator::Change && on_word(text, start) => {
            let end = change_word_end(text, start, kind, n);
            return Ok((Span::Chars(Range::new(start, inclusive_end(text, end))), None));
        }
        Motion::WordForward(kind) => {
            let end = operator_word_end(text, start, kind, n);
            return Ok((Span::Chars(Range::ordered(start, end)), None));
        }
        _ => {}
    }

    // `l` may reach one past the last char so `dl` works at line end.
    let past_end = motion == Motion::Right;
    let landing = resolve(text, cursor, motion, count, last_find, past_end)?;
    let target = landing.cursor.position();

    let is_search = matches!(
        motion,
        Motion::Find(_) | Motion::RepeatFind | Motion::RepeatFindReverse
    );
    let paragraph = matches!(motion, Motion::ParagraphForward | Motion::ParagraphBackward);
    let ran_out =
        motion == Motion::ParagraphForward && text.line_content_len(target.line) != Some(0);
    let class = match motion.class() {
        MotionClass::Inclusive if is_search && target < start => MotionClass::Exclusive,
        MotionClass::Exclusive if ran_out => MotionClass::Inclusive,
        class => class,
    };

    let span = match class {
        MotionClass::Exclusive if paragraph => paragraph_span(text, Range::ordered(start, target)),
        MotionClass::Exclusive => Span::Chars(Range::ordered(start, target)),
        MotionClass::Inclusive => {
            let r = Range::ordered(start, target);
            Span::Chars(Range::new(r.start, inclusive_end(text, r.end)))
        }
        MotionClass::Linewise => Span::lines(start.line, target.line),
    };
    Ok((span, landing.find))
}

/// An exclusive paragraph span ending in column 0 of a later line gives up
/// that line's break, and becomes linewise when nothing before the start
/// is left on its line.
fn paragraph_span(text: &Text, r: Range) -> Span {
    if r.end.col != 0 || r.end.line == r.start.line {
        return Span::Chars(r);
    }
    let last = r.end.line - 1;
    if r.start.col <= text.first_non_blank(r.start.line) {
        return Span::lines(r.start.line, last);
    }
    let end = Position::new(last, text.line_content_len(last).unwrap_or(0));
    Span::Chars(Range::new(r.start, end))
}

/// One past `pos`, but never past the line content.
fn inclusive_end(text: &Text, pos: Position) -> Position {
    let len = text.line_content_len(pos.line).unwrap_or(0);
    Position::new(pos.line, (pos.col + 1).min(len))
}

fn on_word(text: &Text, pos: Position) -> bool {
    text.char_at(pos)
        .is_some_and(|ch| WordKind::Small.classify(ch).is_word_body())
}

/// End of the `n`th word for `cw`: the current word's end counts as the
/// first even when the cursor already sits on it.
fn change_word_end(text: &Text, pos: Position, kind: WordKind, n: usize) -> Position {
    let class = |p: Position| text.char_at(p).map(|ch| kind.classify(ch));
    let next = Position::new(pos.line, pos.col + 1);
    let mut end = if class(next) == class(pos) {
        word::next_end(text, pos, kind)
    } else {
        pos
    };
    for _ in 1..n {
        end = word::next_end(text, end, kind);
    }
    end
}

/// Exclusive end for `dw`: the start of the `n`th next word, except that a
/// last word ending its line stops at the line end, and running out of
/// words stops at the end of the current line.
fn operator_word_end(text: &Text, pos: Position, kind: WordKind, n: usize) -> Position {
    let mut cur = pos;
    for i in 0..n {
        let next = word::next_start(text, cur, kind);
        let line_len = text.line_content_len(cur.line).unwrap_or(0);
        let line_end = Position::new(cur.line, line_len);
        if next == cur {
            return line_end;
        }
        let crosses = next.line > cur.line && cur.col < line_len;
        if crosses && i + 1 == n {
            return line_end;
        }
        cur = next;
    }
    cur
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

    fn chars(sl: usize, sc: usize, el: usize, ec: usize) -> Span {
        Span::Chars(Range::new(p(sl, sc), p(el, ec)))
    }

    fn span(text: &Text, at: Position, op: Operator, motion: Motion, count: usize) -> Span {
        operator_span(text, Cursor::at(at), op, motion, Some(count), None)
            .unwrap()
            .0
    }

    fn goto(text: &Text, at: Position, motion: Motion, count: Option<usize>) -> Position {
        resolve(text, Cursor::at(at), motion, count, None, false)
            .unwrap()
            .cursor
            .position()
    }

    // -- resolve ------------------------------------------------------------

    #[test]
    fn gg_and_g_with_counts() {
        let t = Text::from_lines(&["a", "  b", "c"]);
        assert_eq!(goto(&t, p(2, 0), Motion::FirstLine, None), p(0, 0));
        assert_eq!(goto(&t, p(0, 0), Motion::LastLine, None), p(2, 0));
        assert_eq!(goto(&t, p(0, 0), Motion::LastLine, Some(2)), p(1, 2));
        assert_eq!(goto(&t, p(0, 0), Motion::FirstLine, Some(99)), p(2, 0));
    }

    #[test]
    fn plus_minus_land_on_first_non_blank() {
        let t = Text::from_lines(&["  a", "   b"]);
        assert_eq!(goto(&t, p(0, 0), Motion::NextLineStart, None), p(1, 3));
        assert_eq!(goto(&t, p(1, 0), Motion::PrevLineStart, None), p(0, 2));
    }

    #[test]
    fn blocked_vertical_motion_is_no_match() {
        let t = Text::from_lines(&["a", "b"]);
        let r = resolve(&t, Cursor::at(p(1, 0)), Motion::Down, None, None, false);
        assert_eq!(r, Err(ExecError::NoMatch));
        let r = resolve(&t, Cursor::at(p(0, 0)), Motion::Up, None, None, false);
        assert_eq!(r, Err(ExecError::NoMatch));
    }

    #[test]
    fn find_is_remembered_and_repeated() {
        let t = Text::from_text("a-b-c-d");
        let f = CharFind {
            ch: '-',
            forward: true,
            till: false,
        };
        let landing = resolve(&t, Cursor::at(p(0, 0)), Motion::Find(f), None, None, false).unwrap();
        assert_eq!(landing.cursor.position(), p(0, 1));
        assert_eq!(landing.find, Some(f));

        let again = resolve(&t, landing.cursor, Motion::RepeatFind, None, Some(f), false).unwrap();
        assert_eq!(again.cursor.position(), p(0, 3));
        assert_eq!(again.find, None);

        let back = resolve(&t, again.cursor, Motion::RepeatFindReverse, None, Some(f), false)
            .unwrap();
        assert_eq!(back.cursor.position(), p(0, 1));
    }

    #[test]
    fn repeated_till_skips_adjacent_char() {
        let t = Text::from_text("a.b.c");
        let f = CharFind {
            ch: '.',
            forward: true,
            till: true,
        };
        // `t.` right before the dot cannot move.
        let first = resolve(&t, Cursor::at(p(0, 0)), Motion::Find(f), None, None, false);
        assert_eq!(first, Err(ExecError::NoMatch));
        let again = resolve(&t, Cursor::at(p(0, 0)), Motion::RepeatFind, None, Some(f), false);
        assert_eq!(again.unwrap().cursor.position(), p(0, 2));
    }

    #[test]
    fn repeat_without_find_is_no_match() {
        let t = Text::from_text("abc");
        let r = resolve(&t, Cursor::at(p(0, 0)), Motion::RepeatFind, None, None, false);
        assert_eq!(r, Err(ExecError::NoMatch));
    }

    // -- operator spans -----------------------------------------------------

    #[test]
    fn dw_is_exclusive() {
        let t = Text::from_lines(&["foo bar", "baz"]);
        let s = span(&t, p(0, 0), Operator::Delete, Motion::WordForward(WordKind::Small), 1);
        assert_eq!(s, chars(0, 0, 0, 4));
    }

    #[test]
    fn dw_on_last_word_stops_at_line_end() {
        let t = Text::from_lines(&["foo bar", "baz"]);
        let s = span(&t, p(0, 4), Operator::Delete, Motion::WordForward(WordKind::Small), 1);
        assert_eq!(s, chars(0, 4, 0, 7));
    }

    #[test]
    fn d6w_with_two_words_clamps_to_line_end() {
        let t = Text::from_lines(&["foo bar"]);
        let s = span(&t, p(0, 0), Operator::Delete, Motion::WordForward(WordKind::Small), 6);
        assert_eq!(s, chars(0, 0, 0, 7));
    }

    #[test]
    fn d2w_crosses_lines_before_the_last_word() {
        let t = Text::from_lines(&["a", "b c"]);
        let s = span(&t, p(0, 0), Operator::Delete, Motion::WordForward(WordKind::Small), 2);
        assert_eq!(s, chars(0, 0, 1, 2));
    }

    #[test]
    fn cw_acts_like_ce() {
        let t = Text::from_text("foo bar");
        let s = span(&t, p(0, 0), Operator::Change, Motion::WordForward(WordKind::Small), 1);
        assert_eq!(s, chars(0, 0, 0, 3));
        // On the last char of a word, only that char.
        let s = span(&t, p(0, 2), Operator::Change, Motion::WordForward(WordKind::Small), 1);
        assert_eq!(s, chars(0, 2, 0, 3));
    }

    #[test]
    fn cw_on_blank_is_like_dw() {
        let t = Text::from_text("a  b");
        let s = span(&t, p(0, 1), Operator::Change, Motion::WordForward(WordKind::Small), 1);
        assert_eq!(s, chars(0, 1, 0, 3));
    }

    #[test]
    fn inclusive_motions_take_target_char() {
        let t = Text::from_text("hello world");
        let s = span(&t, p(0, 0), Operator::Delete, Motion::WordEnd(WordKind::Small), 1);
        assert_eq!(s, chars(0, 0, 0, 5));
        let s = span(&t, p(0, 6), Operator::Delete, Motion::LineEnd, 1);
        assert_eq!(s, chars(0, 6, 0, 11));
    }

    #[test]
    fn dollar_on_empty_line_is_empty() {
        let t = Text::from_lines(&["", "x"]);
        let s = span(&t, p(0, 0), Operator::Delete, Motion::LineEnd, 1);
        assert_eq!(s, chars(0, 0, 0, 0));
    }

    #[test]
    fn dl_reaches_last_char() {
        let t = Text::from_text("ab");
        let s = span(&t, p(0, 1), Operator::Delete, Motion::Right, 1);
        assert_eq!(s, chars(0, 1, 0, 2));
    }

    #[test]
    fn backward_motion_orders_span() {
        let t = Text::from_text("foo bar");
        let s = span(&t, p(0, 4), Operator::Delete, Motion::WordBackward(WordKind::Small), 1);
        assert_eq!(s, chars(0, 0, 0, 4));
    }

    #[test]
    fn backward_char_search_is_exclusive() {
        let t = Text::from_text("axbc");
        let back = |till| {
            Motion::Find(CharFind {
                ch: 'x',
                forward: false,
                till,
            })
        };
        assert_eq!(span(&t, p(0, 3), Operator::Delete, back(false), 1), chars(0, 1, 0, 3));
        assert_eq!(span(&t, p(0, 3), Operator::Delete, back(true), 1), chars(0, 2, 0, 3));

        let forward = CharFind {
            ch: 'x',
            forward: true,
            till: false,
        };
        let (s, _) = operator_span(
            &t,
            Cursor::at(p(0, 3)),
            Operator::Delete,
            Motion::RepeatFindReverse,
            None,
            Some(forward),
        )
        .unwrap();
        assert_eq!(s, chars(0, 1, 0, 3));
    }

    #[test]
    fn paragraph_motions_stop_before_the_blank_line() {
        let t = Text::from_lines(&["a", "b", "", "c"]);
        let s = span(&t, p(0, 0), Operator::Delete, Motion::ParagraphForward, 1);
        assert_eq!(s, Span::lines(0, 1));

        let t = Text::from_lines(&["ab", "cd", "", "e"]);
        let s = span(&t, p(0, 1), Operator::Delete, Motion::ParagraphForward, 1);
        assert_eq!(s, chars(0, 1, 1, 2));

        let t = Text::from_lines(&["a", "", "b", "c"]);
        let s = span(&t, p(3, 0), Operator::Delete, Motion::ParagraphBackward, 1);
        assert_eq!(s, Span::lines(1, 2));
    }

    #[test]
    fn paragraph_forward_at_end_of_text_is_inclusive() {
        let t = Text::from_lines(&["a", "bc"]);
        let s = span(&t, p(0, 0), Operator::Delete, Motion::ParagraphForward, 1);
        assert_eq!(s, chars(0, 0, 1, 2));
    }

    #[test]
    fn linewise_motions_and_doubled_operator() {
        let t = Text::from_lines(&["a", "b", "c", "d"]);
        assert_eq!(
            span(&t, p(1, 0), Operator::Delete, Motion::Down, 2),
            Span::Lines { first: 1, last: 3 }
        );
        assert_eq!(
            span(&t, p(2, 0), Operator::Yank, Motion::FirstLine, 1),
            Span::Lines { first: 0, last: 2 }
        );
        assert_eq!(
            span(&t, p(0, 0), Operator::Delete, Motion::Lines, 3),
            Span::Lines { first: 0, last: 2 }
        );
        assert_eq!(
            span(&t, p(2, 0), Operator::Delete, Motion::Lines, 9),
            Span::Lines { first: 2, last: 3 }
        );
    }

    #[test]
    fn failing_motion_propagates() {
        let t = Text::from_text("abc");
        let f = CharFind {
            ch: 'z',
            forward: true,
            till: false,
        };
        let r = operator_span(&t, Cursor::at(p(0, 0)), Operator::Delete, Motion::Find(f), None, None);
        assert_eq!(r, Err(ExecError::NoMatch));
    }
}
