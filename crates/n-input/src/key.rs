// SPDX-License-Identifier: MIT
//
// Key events and key tokens.
//
// A `KeyEvent` is what the host delivers: key identity, modifiers, and
// press/repeat/release state. A `KeyToken` is what the engine buffers: a
// normalized keystroke with the release state dropped and the Shift bit
// folded into printable characters (`Shift+a` and `A` are the same token).

use std::fmt;

use bitflags::bitflags;

// ─── Key identity ───────────────────────────────────────────────────────────

/// Identity of a key.
///
/// Named keys have dedicated variants; printable characters use
/// [`Char`](KeyCode::Char). Function keys use [`F`](KeyCode::F).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A Unicode character (printable).
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Function keys ───────────────────────────────────────────
    /// F1 through F35.
    F(u8),
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// Same bit layout as the Kitty keyboard protocol bitmask, which most
    /// host toolkits can be mapped onto directly.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
        const SUPER = 0b0000_1000;
    }
}

/// Key press / repeat / release distinction.
///
/// Hosts that cannot tell the difference report everything as
/// [`Press`](KeyEventKind::Press).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

/// A keyboard event as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A press event with the given modifiers.
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            code,
            modifiers,
            kind: KeyEventKind::Press,
        }
    }

    /// True for press and auto-repeat, false for release.
    #[inline]
    #[must_use]
    pub const fn is_press(&self) -> bool {
        !matches!(self.kind, KeyEventKind::Release)
    }
}

// ─── KeyToken ───────────────────────────────────────────────────────────────

/// One normalized keystroke, the unit the engine's key buffer holds.
///
/// Normalization rules:
///
/// - `Shift` is dropped for [`KeyCode::Char`]; the character already carries
///   its case (`Shift+a` arrives as `'A'` from every sane host, and a host
///   that sends `'a'` + Shift gets it upper-cased here).
/// - `Ctrl+<letter>` is stored lower-case so `<C-V>` and `<C-v>` match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyToken {
    code: KeyCode,
    modifiers: Modifiers,
}

impl KeyToken {
    /// The Escape key, the universal cancel.
    pub const ESCAPE: Self = Self::named(KeyCode::Escape);

    /// Build a normalized token.
    #[must_use]
    pub fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        match code {
            KeyCode::Char(ch) if modifiers.contains(Modifiers::CTRL) => Self {
                code: KeyCode::Char(ch.to_ascii_lowercase()),
                modifiers: modifiers.difference(Modifiers::SHIFT),
            },
            KeyCode::Char(ch) if modifiers.contains(Modifiers::SHIFT) => Self {
                code: KeyCode::Char(ch.to_uppercase().next().unwrap_or(ch)),
                modifiers: modifiers.difference(Modifiers::SHIFT),
            },
            _ => Self { code, modifiers },
        }
    }

    /// A plain printable character.
    #[must_use]
    pub const fn char(ch: char) -> Self {
        Self {
            code: KeyCode::Char(ch),
            modifiers: Modifiers::empty(),
        }
    }

    /// `Ctrl` + a character (`<C-v>`).
    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self {
            code: KeyCode::Char(ch.to_ascii_lowercase()),
            modifiers: Modifiers::CTRL,
        }
    }

    /// A named key without modifiers.
    #[must_use]
    pub const fn named(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn code(self) -> KeyCode {
        self.code
    }

    #[inline]
    #[must_use]
    pub const fn modifiers(self) -> Modifiers {
        self.modifiers
    }

    /// The printable character, if this is an unmodified character key.
    ///
    /// Alt/Ctrl/Super chords return `None`: they are commands, not text.
    #[must_use]
    pub const fn as_char(self) -> Option<char> {
        match self.code {
            KeyCode::Char(ch) if self.modifiers.is_empty() => Some(ch),
            _ => None,
        }
    }

    /// True for `Ctrl` + `ch` (case-insensitive).
    #[must_use]
    pub fn is_ctrl(self, ch: char) -> bool {
        self.modifiers == Modifiers::CTRL && self.code == KeyCode::Char(ch.to_ascii_lowercase())
    }

    /// Escape, or its terminal alias `Ctrl-[`.
    #[must_use]
    pub fn is_escape(self) -> bool {
        (self.code == KeyCode::Escape && self.modifiers.is_empty()) || self.is_ctrl('[')
    }

    /// True for an unmodified decimal digit.
    #[must_use]
    pub const fn digit(self) -> Option<u32> {
        match self.as_char() {
            Some(ch) => ch.to_digit(10),
            None => None,
        }
    }
}

impl From<KeyEvent> for KeyToken {
    fn from(event: KeyEvent) -> Self {
        Self::new(event.code, event.modifiers)
    }
}

impl From<char> for KeyToken {
    fn from(ch: char) -> Self {
        Self::char(ch)
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::notation::format_token(*self))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
