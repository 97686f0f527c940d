//! Modes and the mode state machine.
//!
//! | Mode      | Cursor limit         | Keys mean                      |
//! |-----------|----------------------|--------------------------------|
//! | Normal    | `0..content_len-1`   | commands                       |
//! | Insert    | `0..content_len`     | text (left to the host)        |
//! | Visual    | `0..content_len-1`   | commands on a selection        |
//! | Command   | (host command line)  | command-line text (host)       |
//!
//! [`ModeMachine`] is the only thing that changes the mode. It also owns the
//! visual selection, since a selection exists exactly while the mode is
//! Visual.

use std::fmt;

use tracing::debug;

use crate::position::Position;
use crate::selection::VisualSelection;

// ---------------------------------------------------------------------------
// VisualKind
// ---------------------------------------------------------------------------

/// Granularity of a visual selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKind {
    /// `v`
    Char,
    /// `V`
    Line,
    /// `Ctrl-v`
    Block,
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
    Visual(VisualKind),
    Command,
}

impl Mode {
    /// Human-readable name for a status line.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Visual(VisualKind::Char) => "VISUAL",
            Self::Visual(VisualKind::Line) => "VISUAL LINE",
            Self::Visual(VisualKind::Block) => "VISUAL BLOCK",
            Self::Command => "COMMAND",
        }
    }

    /// True if the cursor may sit one past the last char.
    #[inline]
    #[must_use]
    pub const fn cursor_past_end(self) -> bool {
        matches!(self, Self::Insert | Self::Command)
    }

    #[inline]
    #[must_use]
    pub const fn is_visual(self) -> bool {
        matches!(self, Self::Visual(_))
    }

    /// The visual granularity, if in Visual mode.
    #[inline]
    #[must_use]
    pub const fn visual_kind(self) -> Option<VisualKind> {
        match self {
            Self::Visual(kind) => Some(kind),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// A request to change mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    EnterNormal,
    EnterInsert,
    EnterVisual(VisualKind),
    EnterCommand,
    ExitCommand,
    Escape,
}

// ---------------------------------------------------------------------------
// ModeMachine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ModeMachine {
    mode: Mode,
    selection: Option<VisualSelection>,
}

impl ModeMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// The selection. `Some` exactly when the mode is Visual.
    #[inline]
    #[must_use]
    pub const fn selection(&self) -> Option<VisualSelection> {
        self.selection
    }

    /// Apply a transition request. `cursor` anchors a new selection.
    /// Returns `false` if the request does not apply in the current mode.
    pub fn apply(&mut self, transition: Transition, cursor: Position) -> bool {
        let from = self.mode;
        let to = match (from, transition) {
            (Mode::Normal, Transition::EnterInsert) => Mode::Insert,
            (Mode::Normal, Transition::EnterCommand) => Mode::Command,
            (Mode::Normal, Transition::EnterVisual(kind)) => {
                self.selection = Some(VisualSelection::new(cursor, kind));
                Mode::Visual(kind)
            }

            (Mode::Visual(current), Transition::EnterVisual(kind)) if current != kind => {
                if let Some(sel) = &mut self.selection {
                    sel.granularity = kind;
                }
                Mode::Visual(kind)
            }
            (
                Mode::Visual(_),
                Transition::EnterVisual(_) | Transition::EnterNormal | Transition::Escape,
            ) => Mode::Normal,
            (Mode::Visual(_), Transition::EnterInsert) => Mode::Insert,
            (Mode::Visual(_), Transition::EnterCommand) => Mode::Command,

            (Mode::Insert, Transition::Escape)
            | (Mode::Command, Transition::ExitCommand | Transition::Escape) => Mode::Normal,

            _ => return false,
        };

        if !to.is_visual() {
            self.selection = None;
        }
        self.mode = to;
        debug!(target: "engine.mode", %from, %to, ?transition, "mode change");
        true
    }

    /// Move the live end of the selection to the cursor.
    pub const fn track_cursor(&mut self, cursor: Position) {
        if let Some(sel) = &mut self.selection {
            sel.track(cursor);
        }
    }

    /// Replace the selection bounds (`o`, visual text objects). Ignored
    /// outside Visual mode.
    pub const fn replace_selection(&mut self, start: Position, end: Position) {
        if let Some(sel) = &mut self.selection {
            sel.start = start;
            sel.end = end;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
