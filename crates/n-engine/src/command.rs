//! Command AST — what a finished key sequence means.
//!
//! The grammar produces these; the executor consumes them. Every node is
//! complete: nothing in it still waits for a key.
//!
//! | Keys     | Node                                                   |
//! |----------|--------------------------------------------------------|
//! | `3w`     | `Motion { count: 3, motion: WordForward }`             |
//! | `2d3w`   | `OperatorMotion { op_count: 2, motion_count: 3, .. }`  |
//! | `dd`     | `OperatorMotion { motion: Lines, .. }`                 |
//! | `ci"`    | `OperatorTextObject { inclusive: false, .. }`          |
//! | `v..d`   | `VisualOperator { operator: Delete }`                  |
//! | `v..a(`  | `VisualTextObject { inclusive: true, .. }`             |
//! | `x`, `p` | `Immediate { .. }`                                     |

use crate::mode::VisualKind;
use crate::text_object::TextObject;
use crate::word::WordKind;

// ---------------------------------------------------------------------------
// Motions
// ---------------------------------------------------------------------------

/// A single-line character search (`f` `F` `t` `T`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharFind {
    pub ch: char,
    /// `f`/`t` search right, `F`/`T` search left.
    pub forward: bool,
    /// `t`/`T` stop one short of the char.
    pub till: bool,
}

impl CharFind {
    /// The same search in the opposite direction (for `,`).
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            forward: !self.forward,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    /// `h`, Left, Backspace
    Left,
    /// `l`, Right, Space
    Right,
    /// `k`, Up
    Up,
    /// `j`, Down
    Down,
    /// `w` / `W`
    WordForward(WordKind),
    /// `b` / `B`
    WordBackward(WordKind),
    /// `e` / `E`
    WordEnd(WordKind),
    /// `0`, Home
    LineStart,
    /// `^`
    FirstNonBlank,
    /// `$`, End
    LineEnd,
    /// `gg`: first line, or line `count`.
    FirstLine,
    /// `G`: last line, or line `count`.
    LastLine,
    /// `}`
    ParagraphForward,
    /// `{`
    ParagraphBackward,
    /// `%`
    MatchBracket,
    /// `f` `F` `t` `T` + char
    Find(CharFind),
    /// `;`
    RepeatFind,
    /// `,`
    RepeatFindReverse,
    /// `+`, Enter
    NextLineStart,
    /// `-`
    PrevLineStart,
    /// `_`
    CurrentLineStart,
    /// The doubled operator key (`dd`, `>>`, `g~~`): `count` whole lines.
    Lines,
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `d`
    Delete,
    /// `c`
    Change,
    /// `y`
    Yank,
    /// `>`
    Indent,
    /// `<`
    Outdent,
    /// `gu`, visual `u`
    Lowercase,
    /// `gU`, visual `U`
    Uppercase,
    /// `g~`, visual `~`
    ToggleCase,
    /// Visual `J`
    Join,
}

// ---------------------------------------------------------------------------
// Immediate actions
// ---------------------------------------------------------------------------

/// Where an insert-entering action puts the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertAt {
    /// `i`
    Cursor,
    /// `a`
    AfterCursor,
    /// `I`
    LineStart,
    /// `A`
    LineEnd,
    /// `o`
    LineBelow,
    /// `O`
    LineAbove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// `x`
    DeleteChar,
    /// `X`
    DeleteCharBefore,
    /// `p`
    PasteAfter,
    /// `P`
    PasteBefore,
    /// `r` + char
    ReplaceChar(char),
    /// `J`
    JoinLines,
    /// `~`
    ToggleCaseChar,
    /// `D` (`d$`)
    DeleteToLineEnd,
    /// `C` (`c$`)
    ChangeToLineEnd,
    /// `Y` (`yy`)
    YankLine,
    /// `s` (`cl`)
    Substitute,
    /// `S` (`cc`)
    SubstituteLine,
    /// `i` `a` `I` `A` `o` `O`
    Insert(InsertAt),
    /// `v` `V` `Ctrl-v`
    Visual(VisualKind),
    /// Visual `o`
    SwapAnchor,
    /// `u`
    Undo,
    /// `Ctrl-r`
    Redo,
}

impl Action {
    /// The operator command an action is shorthand for, if any.
    #[must_use]
    pub const fn expansion(self) -> Option<(Operator, Motion)> {
        match self {
            Self::DeleteToLineEnd => Some((Operator::Delete, Motion::LineEnd)),
            Self::ChangeToLineEnd => Some((Operator::Change, Motion::LineEnd)),
            Self::YankLine => Some((Operator::Yank, Motion::Lines)),
            Self::Substitute => Some((Operator::Change, Motion::Right)),
            Self::SubstituteLine => Some((Operator::Change, Motion::Lines)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// One complete command. Counts are `None` when not typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Motion {
        count: Option<usize>,
        motion: Motion,
    },
    OperatorMotion {
        op_count: Option<usize>,
        operator: Operator,
        motion_count: Option<usize>,
        motion: Motion,
    },
    OperatorTextObject {
        count: Option<usize>,
        operator: Operator,
        object: TextObject,
        inclusive: bool,
    },
    VisualOperator {
        operator: Operator,
    },
    VisualTextObject {
        object: TextObject,
        inclusive: bool,
    },
    Immediate {
        count: Option<usize>,
        action: Action,
    },
}

/// A command plus the register named before it (`"a`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Invocation {
    pub register: Option<char>,
    pub command: Command,
}

impl Invocation {
    #[must_use]
    pub const fn new(command: Command) -> Self {
        Self {
            register: None,
            command,
        }
    }

    #[must_use]
    pub const fn with_register(self, register: Option<char>) -> Self {
        Self { register, ..self }
    }
}

/// Multiply an operator count by a motion count (`2d3w` = 6). `None` when
/// neither was typed.
#[must_use]
pub fn combine_counts(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(1).saturating_mul(b.unwrap_or(1))),
    }
}
