//! Registers — where deleted and yanked text goes.
//!
//! The engine talks to registers through [`RegisterStore`], so a host can
//! bridge them to a system clipboard. [`RegisterFile`] is the in-memory
//! store: one unnamed register plus the 26 named ones.
//!
//! - No name: the unnamed register only.
//! - `a`–`z`: overwrite the named register, copy to unnamed.
//! - `A`–`Z`: append to the named register, copy the result to unnamed.
//! - Anything else writes the unnamed register only.
//!
//! Reads of `A`–`Z` are the same as `a`–`z`. Unknown names read unnamed.

use std::fmt;

/// How the text was taken, which decides how it pastes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum RegisterKind {
    /// Pastes inline at the cursor.
    #[default]
    Char,
    /// Pastes as whole lines above or below the cursor line.
    Line,
    /// Pastes as a column, one row per line, starting at the cursor.
    Block,
}

impl fmt::Display for RegisterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Char => "char",
            Self::Line => "line",
            Self::Block => "block",
        })
    }
}

/// One register's content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Register {
    text: String,
    kind: RegisterKind,
}

impl Register {
    #[must_use]
    pub const fn new(text: String, kind: RegisterKind) -> Self {
        Self { text, kind }
    }

    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> RegisterKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Append more text. Mixing in linewise text makes the whole register
    /// linewise, with a line break between the parts.
    fn append(&mut self, text: &str, kind: RegisterKind) {
        if kind == RegisterKind::Line || self.kind == RegisterKind::Line {
            if !self.text.is_empty() && !self.text.ends_with('\n') {
                self.text.push('\n');
            }
            self.kind = RegisterKind::Line;
        }
        self.text.push_str(text);
    }
}

// ---------------------------------------------------------------------------
// RegisterStore
// ---------------------------------------------------------------------------

/// Register access the engine needs from its host.
pub trait RegisterStore {
    /// Store text under `name` (`None` = unnamed).
    fn set_register(&mut self, name: Option<char>, text: String, kind: RegisterKind);

    /// Read a register. `None` or an empty register means nothing to paste.
    fn register(&self, name: Option<char>) -> Option<Register>;
}

// ---------------------------------------------------------------------------
// RegisterFile
// ---------------------------------------------------------------------------

/// In-memory register store.
#[derive(Debug, Clone)]
pub struct RegisterFile {
    unnamed: Register,
    named: [Register; 26],
}

impl RegisterFile {
    #[must_use]
    pub fn new() -> Self {
        Self {
            unnamed: Register::default(),
            named: std::array::from_fn(|_| Register::default()),
        }
    }

    /// Slot index for a named register, either case.
    const fn slot(name: char) -> Option<usize> {
        if name.is_ascii_lowercase() {
            Some((name as u8 - b'a') as usize)
        } else if name.is_ascii_uppercase() {
            Some((name as u8 - b'A') as usize)
        } else {
            None
        }
    }

    /// Borrow a register without cloning.
    #[must_use]
    pub fn get(&self, name: Option<char>) -> &Register {
        match name.and_then(Self::slot) {
            Some(idx) => &self.named[idx],
            None => &self.unnamed,
        }
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterStore for RegisterFile {
    fn set_register(&mut self, name: Option<char>, text: String, kind: RegisterKind) {
        let Some(name) = name else {
            self.unnamed = Register::new(text, kind);
            return;
        };
        match Self::slot(name) {
            Some(idx) if name.is_ascii_uppercase() => {
                self.named[idx].append(&text, kind);
                self.unnamed = self.named[idx].clone();
            }
            Some(idx) => {
                self.named[idx] = Register::new(text.clone(), kind);
                self.unnamed = Register::new(text, kind);
            }
            None => self.unnamed = Register::new(text, kind),
        }
    }

    fn register(&self, name: Option<char>) -> Option<Register> {
        let reg = self.get(name);
        (!reg.is_empty()).then(|| reg.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
