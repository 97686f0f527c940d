//! Command grammar — turns a key sequence into a [`Command`].
//!
//! ```text
//! ["x] [count] operator [count] (motion | i/a object | operator's last key)
//! ["x] [count] motion
//! ["x] [count] action
//! ```
//!
//! [`parse`] is pure: it looks at the whole key buffer every time and never
//! keeps state between calls. The dispatcher appends a key, parses the
//! candidate, and acts on the [`ParseStatus`].
//!
//! The vocabulary lives in the tables at the bottom of this file. Adding a
//! motion or action is one table row; multi-key entries (`gg`, `g~`) and
//! entries that take a char argument (`f{c}`, `r{c}`) need no extra code.
//!
//! Several productions can fit the same prefix (`g` starts both `gg` and
//! `g~`; `d` is an operator that still needs a motion). Each production is
//! tried on its own and the results merged: a production still waiting for
//! keys beats one that is complete, so the longest match wins, and the
//! sequence is invalid only when nothing fits.

use n_input::{KeyCode, KeyToken};

use crate::command::{Action, CharFind, Command, InsertAt, Invocation, Motion, Operator, combine_counts};
use crate::mode::{Mode, VisualKind};
use crate::text_object::TextObject;
use crate::word::WordKind;

/// Counts beyond this are clamped while typing.
pub const MAX_COUNT: usize = 999_999;

/// Result of parsing a key sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// No production fits; the sequence should be dropped.
    Invalid,
    /// A valid prefix; more keys will follow.
    Incomplete,
    /// A valid prefix whose next key is taken as a literal char (`f`, `r`,
    /// `"`, `di`).
    NeedsChar,
    /// A complete command.
    Complete(Invocation),
}

impl ParseStatus {
    /// True while the sequence is a prefix of something valid.
    #[inline]
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Incomplete | Self::NeedsChar)
    }
}

/// Parse the whole key sequence for `mode`.
#[must_use]
pub fn parse(keys: &[KeyToken], mode: Mode) -> ParseStatus {
    let (register, rest) = match register_prefix(keys) {
        Ok(parts) => parts,
        Err(status) => return status,
    };
    let (count, rest) = take_count(rest);
    if rest.is_empty() {
        return ParseStatus::Incomplete;
    }

    let status = match mode {
        Mode::Normal => [
            operator(rest, count),
            motion(rest, count),
            action(NORMAL_ACTIONS, rest, count),
        ]
        .into_iter()
        .fold(ParseStatus::Invalid, merge),
        Mode::Visual(_) => [
            visual_operator(rest),
            motion(rest, count),
            visual_object(rest),
            action(VISUAL_ACTIONS, rest, count),
        ]
        .into_iter()
        .fold(ParseStatus::Invalid, merge),
        Mode::Insert | Mode::Command => ParseStatus::Invalid,
    };

    match status {
        ParseStatus::Complete(invocation) => {
            ParseStatus::Complete(invocation.with_register(register))
        }
        other => other,
    }
}

/// Merge two alternatives. Pending beats complete beats invalid; between
/// two pending ones, `Incomplete` wins since it accepts any key.
const fn merge(a: ParseStatus, b: ParseStatus) -> ParseStatus {
    use ParseStatus::{Complete, Incomplete, Invalid, NeedsChar};
    match (a, b) {
        (Incomplete, _) | (_, Incomplete) => Incomplete,
        (NeedsChar, _) | (_, NeedsChar) => NeedsChar,
        (Complete(c), _) | (_, Complete(c)) => Complete(c),
        (Invalid, Invalid) => Invalid,
    }
}

// ---------------------------------------------------------------------------
// Prefixes
// ---------------------------------------------------------------------------

/// `"x` in front of a command. `""` names the unnamed register.
fn register_prefix(keys: &[KeyToken]) -> Result<(Option<char>, &[KeyToken]), ParseStatus> {
    let Some(first) = keys.first() else {
        return Err(ParseStatus::Incomplete);
    };
    if first.as_char() != Some('"') {
        return Ok((None, keys));
    }
    let Some(name_key) = keys.get(1) else {
        return Err(ParseStatus::NeedsChar);
    };
    match name_key.as_char() {
        Some('"') => Ok((None, &keys[2..])),
        Some(name) if name.is_ascii_alphanumeric() => Ok((Some(name), &keys[2..])),
        _ => Err(ParseStatus::Invalid),
    }
}

/// A digit run not starting with `0`. A lone `0` is left for the motion
/// table.
fn take_count(keys: &[KeyToken]) -> (Option<usize>, &[KeyToken]) {
    let Some(first) = keys.first().and_then(|k| k.digit()).filter(|d| *d != 0) else {
        return (None, keys);
    };
    let mut count = first as usize;
    let mut used = 1;
    while let Some(d) = keys.get(used).and_then(|k| k.digit()) {
        count = count
            .saturating_mul(10)
            .saturating_add(d as usize)
            .min(MAX_COUNT);
        used += 1;
    }
    (Some(count), &keys[used..])
}

// ---------------------------------------------------------------------------
// Productions
// ---------------------------------------------------------------------------

fn operator(keys: &[KeyToken], op_count: Option<usize>) -> ParseStatus {
    let (operator, used) = match lookup(OPERATORS, keys) {
        Lookup::Found(op, used) => (op, used),
        Lookup::Pending(status) => return status,
        Lookup::Miss => return ParseStatus::Invalid,
    };
    let last_key = keys[used - 1];
    let (motion_count, rest) = take_count(&keys[used..]);
    let Some(&next) = rest.first() else {
        return ParseStatus::Incomplete;
    };

    if next == last_key {
        return exhausted(
            rest,
            1,
            Command::OperatorMotion {
                op_count,
                operator,
                motion_count,
                motion: Motion::Lines,
            },
        );
    }
    if let Some(inclusive) = object_selector(next) {
        return text_object(rest, |object| Command::OperatorTextObject {
            count: combine_counts(op_count, motion_count),
            operator,
            object,
            inclusive,
        });
    }
    match lookup(MOTIONS, rest) {
        Lookup::Found(motion, used) => exhausted(
            rest,
            used,
            Command::OperatorMotion {
                op_count,
                operator,
                motion_count,
                motion,
            },
        ),
        Lookup::Pending(status) => status,
        Lookup::Miss => ParseStatus::Invalid,
    }
}

fn motion(keys: &[KeyToken], count: Option<usize>) -> ParseStatus {
    match lookup(MOTIONS, keys) {
        Lookup::Found(motion, used) => exhausted(keys, used, Command::Motion { count, motion }),
        Lookup::Pending(status) => status,
        Lookup::Miss => ParseStatus::Invalid,
    }
}

fn action(table: Table<Action>, keys: &[KeyToken], count: Option<usize>) -> ParseStatus {
    match lookup(table, keys) {
        Lookup::Found(action, used) => exhausted(keys, used, Command::Immediate { count, action }),
        Lookup::Pending(status) => status,
        Lookup::Miss => ParseStatus::Invalid,
    }
}

/// Visual operators apply to the selection; a count in front is ignored.
fn visual_operator(keys: &[KeyToken]) -> ParseStatus {
    match lookup(VISUAL_OPERATORS, keys) {
        Lookup::Found(operator, used) => {
            exhausted(keys, used, Command::VisualOperator { operator })
        }
        Lookup::Pending(status) => status,
        Lookup::Miss => ParseStatus::Invalid,
    }
}

fn visual_object(keys: &[KeyToken]) -> ParseStatus {
    match keys.first().copied().and_then(object_selector) {
        Some(inclusive) => text_object(keys, |object| Command::VisualTextObject {
            object,
            inclusive,
        }),
        None => ParseStatus::Invalid,
    }
}

/// `i` selects inner, `a` selects around.
fn object_selector(key: KeyToken) -> Option<bool> {
    match key.as_char() {
        Some('i') => Some(false),
        Some('a') => Some(true),
        _ => None,
    }
}

/// `keys` starts with the `i`/`a` selector; the object key follows.
fn text_object(keys: &[KeyToken], build: impl FnOnce(TextObject) -> Command) -> ParseStatus {
    let Some(key) = keys.get(1) else {
        return ParseStatus::NeedsChar;
    };
    match key.as_char().and_then(TextObject::from_key) {
        Some(object) => exhausted(keys, 2, build(object)),
        None => ParseStatus::Invalid,
    }
}

/// Complete only if the production used every key.
fn exhausted(keys: &[KeyToken], used: usize, command: Command) -> ParseStatus {
    if used == keys.len() {
        ParseStatus::Complete(Invocation::new(command))
    } else {
        ParseStatus::Invalid
    }
}

// ---------------------------------------------------------------------------
// Table lookup
// ---------------------------------------------------------------------------

/// One key in a table entry.
#[derive(Debug, Clone, Copy)]
enum Pat {
    Ch(char),
    Ctrl(char),
    Key(KeyCode),
}

impl Pat {
    fn matches(self, key: KeyToken) -> bool {
        match self {
            Self::Ch(ch) => key.as_char() == Some(ch),
            Self::Ctrl(ch) => key.is_ctrl(ch),
            Self::Key(code) => key == KeyToken::named(code),
        }
    }
}

/// What an entry yields once its keys match.
#[derive(Clone, Copy)]
enum Yield<T> {
    Value(T),
    /// Takes one more key as a literal char.
    WithChar(fn(char) -> T),
}

type Table<T> = &'static [(&'static [Pat], Yield<T>)];

enum Lookup<T> {
    /// Value and number of keys used.
    Found(T, usize),
    Pending(ParseStatus),
    Miss,
}

/// Match the head of `keys` against a table. An entry that `keys` is a
/// strict prefix of beats an entry that is already satisfied.
fn lookup<T: Copy>(table: Table<T>, keys: &[KeyToken]) -> Lookup<T> {
    let mut pending = ParseStatus::Invalid;
    let mut found = None;

    for &(pats, yields) in table {
        let prefix = pats.len().min(keys.len());
        if !pats.iter().zip(keys).take(prefix).all(|(p, k)| p.matches(*k)) {
            continue;
        }
        if keys.len() < pats.len() {
            pending = merge(pending, ParseStatus::Incomplete);
            continue;
        }
        match yields {
            Yield::Value(value) => {
                found.get_or_insert((value, pats.len()));
            }
            Yield::WithChar(build) => match keys.get(pats.len()) {
                None => pending = merge(pending, ParseStatus::NeedsChar),
                Some(key) => {
                    if let Some(ch) = key.as_char() {
                        found.get_or_insert((build(ch), pats.len() + 1));
                    }
                }
            },
        }
    }

    match (pending.is_pending(), found) {
        (true, _) => Lookup::Pending(pending),
        (false, Some((value, used))) => Lookup::Found(value, used),
        (false, None) => Lookup::Miss,
    }
}

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

const fn find(ch: char, forward: bool, till: bool) -> Motion {
    Motion::Find(CharFind { ch, forward, till })
}

const fn find_forward(ch: char) -> Motion {
    find(ch, true, false)
}

const fn find_backward(ch: char) -> Motion {
    find(ch, false, false)
}

const fn till_forward(ch: char) -> Motion {
    find(ch, true, true)
}

const fn till_backward(ch: char) -> Motion {
    find(ch, false, true)
}

const fn replace_char(ch: char) -> Action {
    Action::ReplaceChar(ch)
}

use Pat::{Ch, Ctrl, Key};
use Yield::{Value, WithChar};

const MOTIONS: Table<Motion> = &[
    (&[Ch('h')], Value(Motion::Left)),
    (&[Key(KeyCode::Left)], Value(Motion::Left)),
    (&[Key(KeyCode::Backspace)], Value(Motion::Left)),
    (&[Ch('l')], Value(Motion::Right)),
    (&[Key(KeyCode::Right)], Value(Motion::Right)),
    (&[Ch(' ')], Value(Motion::Right)),
    (&[Ch('k')], Value(Motion::Up)),
    (&[Key(KeyCode::Up)], Value(Motion::Up)),
    (&[Ch('j')], Value(Motion::Down)),
    (&[Key(KeyCode::Down)], Value(Motion::Down)),
    (&[Ch('w')], Value(Motion::WordForward(WordKind::Small))),
    (&[Ch('W')], Value(Motion::WordForward(WordKind::Big))),
    (&[Ch('b')], Value(Motion::WordBackward(WordKind::Small))),
    (&[Ch('B')], Value(Motion::WordBackward(WordKind::Big))),
    (&[Ch('e')], Value(Motion::WordEnd(WordKind::Small))),
    (&[Ch('E')], Value(Motion::WordEnd(WordKind::Big))),
    (&[Ch('0')], Value(Motion::LineStart)),
    (&[Key(KeyCode::Home)], Value(Motion::LineStart)),
    (&[Ch('^')], Value(Motion::FirstNonBlank)),
    (&[Ch('$')], Value(Motion::LineEnd)),
    (&[Key(KeyCode::End)], Value(Motion::LineEnd)),
    (&[Ch('g'), Ch('g')], Value(Motion::FirstLine)),
    (&[Ch('G')], Value(Motion::LastLine)),
    (&[Ch('}')], Value(Motion::ParagraphForward)),
    (&[Ch('{')], Value(Motion::ParagraphBackward)),
    (&[Ch('%')], Value(Motion::MatchBracket)),
    (&[Ch('f')], WithChar(find_forward)),
    (&[Ch('F')], WithChar(find_backward)),
    (&[Ch('t')], WithChar(till_forward)),
    (&[Ch('T')], WithChar(till_backward)),
    (&[Ch(';')], Value(Motion::RepeatFind)),
    (&[Ch(',')], Value(Motion::RepeatFindReverse)),
    (&[Ch('+')], Value(Motion::NextLineStart)),
    (&[Key(KeyCode::Enter)], Value(Motion::NextLineStart)),
    (&[Ch('-')], Value(Motion::PrevLineStart)),
    (&[Ch('_')], Value(Motion::CurrentLineStart)),
];

const OPERATORS: Table<Operator> = &[
    (&[Ch('d')], Value(Operator::Delete)),
    (&[Ch('c')], Value(Operator::Change)),
    (&[Ch('y')], Value(Operator::Yank)),
    (&[Ch('>')], Value(Operator::Indent)),
    (&[Ch('<')], Value(Operator::Outdent)),
    (&[Ch('g'), Ch('~')], Value(Operator::ToggleCase)),
    (&[Ch('g'), Ch('u')], Value(Operator::Lowercase)),
    (&[Ch('g'), Ch('U')], Value(Operator::Uppercase)),
];

const NORMAL_ACTIONS: Table<Action> = &[
    (&[Ch('x')], Value(Action::DeleteChar)),
    (&[Key(KeyCode::Delete)], Value(Action::DeleteChar)),
    (&[Ch('X')], Value(Action::DeleteCharBefore)),
    (&[Ch('p')], Value(Action::PasteAfter)),
    (&[Ch('P')], Value(Action::PasteBefore)),
    (&[Ch('r')], WithChar(replace_char)),
    (&[Ch('J')], Value(Action::JoinLines)),
    (&[Ch('~')], Value(Action::ToggleCaseChar)),
    (&[Ch('D')], Value(Action::DeleteToLineEnd)),
    (&[Ch('C')], Value(Action::ChangeToLineEnd)),
    (&[Ch('Y')], Value(Action::YankLine)),
    (&[Ch('s')], Value(Action::Substitute)),
    (&[Ch('S')], Value(Action::SubstituteLine)),
    (&[Ch('i')], Value(Action::Insert(InsertAt::Cursor))),
    (&[Key(KeyCode::Insert)], Value(Action::Insert(InsertAt::Cursor))),
    (&[Ch('a')], Value(Action::Insert(InsertAt::AfterCursor))),
    (&[Ch('I')], Value(Action::Insert(InsertAt::LineStart))),
    (&[Ch('A')], Value(Action::Insert(InsertAt::LineEnd))),
    (&[Ch('o')], Value(Action::Insert(InsertAt::LineBelow))),
    (&[Ch('O')], Value(Action::Insert(InsertAt::LineAbove))),
    (&[Ch('v')], Value(Action::Visual(VisualKind::Char))),
    (&[Ch('V')], Value(Action::Visual(VisualKind::Line))),
    (&[Ctrl('v')], Value(Action::Visual(VisualKind::Block))),
    (&[Ch('u')], Value(Action::Undo)),
    (&[Ctrl('r')], Value(Action::Redo)),
];

const VISUAL_OPERATORS: Table<Operator> = &[
    (&[Ch('d')], Value(Operator::Delete)),
    (&[Ch('x')], Value(Operator::Delete)),
    (&[Key(KeyCode::Delete)], Value(Operator::Delete)),
    (&[Ch('c')], Value(Operator::Change)),
    (&[Ch('s')], Value(Operator::Change)),
    (&[Ch('y')], Value(Operator::Yank)),
    (&[Ch('>')], Value(Operator::Indent)),
    (&[Ch('<')], Value(Operator::Outdent)),
    (&[Ch('~')], Value(Operator::ToggleCase)),
    (&[Ch('u')], Value(Operator::Lowercase)),
    (&[Ch('U')], Value(Operator::Uppercase)),
    (&[Ch('J')], Value(Operator::Join)),
];

const VISUAL_ACTIONS: Table<Action> = &[
    (&[Ch('o')], Value(Action::SwapAnchor)),
    (&[Ch('v')], Value(Action::Visual(VisualKind::Char))),
    (&[Ch('V')], Value(Action::Visual(VisualKind::Line))),
    (&[Ctrl('v')], Value(Action::Visual(VisualKind::Block))),
];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
