//! In-memory host — a complete [`Host`](crate::adapter::Host) over a
//! [`Text`], for tests and the replay harness.
//!
//! UI triggers are recorded as [`HostEvent`]s instead of opening anything.
//! [`MemoryHost::type_key`] plays the part of a host's own key handling for
//! keys the engine passes on (text typed in Insert mode).

use n_input::{KeyCode, KeyToken};

use crate::adapter::{BufferView, EditError, SearchDirection, UiTriggers};
use crate::position::{CursorPosition, Position, Range};
use crate::register::{Register, RegisterFile, RegisterKind, RegisterStore};
use crate::selection::VisualSelection;
use crate::text::Text;

/// A UI trigger the engine fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    CommandMode,
    Search(SearchDirection),
    FindNext,
    FindPrevious,
    Undo(usize),
    Redo(usize),
}

#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    text: Text,
    cursor: CursorPosition,
    selection: Option<VisualSelection>,
    registers: RegisterFile,
    events: Vec<HostEvent>,
    read_only: bool,
}

impl MemoryHost {
    #[must_use]
    pub fn new<S: AsRef<str>>(lines: &[S]) -> Self {
        Self {
            text: Text::from_lines(lines),
            ..Self::default()
        }
    }

    /// Build from `\n`-separated text.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            text: Text::from_text(text),
            ..Self::default()
        }
    }

    /// Place the cursor, clamped to the text.
    #[must_use]
    pub fn with_cursor(mut self, pos: Position) -> Self {
        self.cursor = self.text.cursor_position(pos, false);
        self
    }

    #[inline]
    #[must_use]
    pub const fn text(&self) -> &Text {
        &self.text
    }

    #[inline]
    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    #[inline]
    #[must_use]
    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    /// Refuse every edit from now on.
    pub const fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Default handling for a key the engine did not consume: printable
    /// chars, Enter, and Backspace edit at the cursor. Returns `false` for
    /// anything else.
    pub fn type_key(&mut self, key: KeyToken) -> bool {
        let pos = self.cursor.position();
        let inserted = match (key.code(), key.as_char()) {
            (_, Some(ch)) => ch.to_string(),
            (KeyCode::Enter, _) => "\n".to_string(),
            (KeyCode::Tab, _) => "\t".to_string(),
            (KeyCode::Backspace, _) => {
                if pos == Position::ZERO {
                    return true;
                }
                let Some(idx) = self.text.pos_to_char_idx(pos) else {
                    return false;
                };
                let before = self.text.idx_to_pos(idx - 1);
                self.text.replace(Range::new(before, pos), "");
                self.cursor = self.text.cursor_position(before, true);
                return true;
            }
            _ => return false,
        };
        if !self.text.replace(Range::point(pos), &inserted) {
            return false;
        }
        let idx = self.cursor.offset() + inserted.chars().count();
        let after = self.text.idx_to_pos(idx);
        self.cursor = self.text.cursor_position(after, true);
        true
    }
}

impl BufferView for MemoryHost {
    fn lines(&self) -> Vec<String> {
        self.text.lines()
    }

    fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    fn set_cursor(&mut self, cursor: CursorPosition) {
        self.cursor = cursor;
    }

    fn apply_edit(&mut self, range: Range, replacement: &str) -> Result<(), EditError> {
        if self.read_only {
            return Err(EditError::ReadOnly);
        }
        if self.text.replace(range, replacement) {
            Ok(())
        } else {
            Err(EditError::OutOfBounds(range))
        }
    }

    fn selection(&self) -> Option<VisualSelection> {
        self.selection
    }

    fn set_selection(&mut self, selection: Option<VisualSelection>) {
        self.selection = selection;
    }
}

impl UiTriggers for MemoryHost {
    fn enter_command_mode(&mut self) {
        self.events.push(HostEvent::CommandMode);
    }

    fn start_search(&mut self, direction: SearchDirection) {
        self.events.push(HostEvent::Search(direction));
    }

    fn find_next(&mut self) {
        self.events.push(HostEvent::FindNext);
    }

    fn find_previous(&mut self) {
        self.events.push(HostEvent::FindPrevious);
    }

    fn undo(&mut self, count: usize) {
        self.events.push(HostEvent::Undo(count));
    }

    fn redo(&mut self, count: usize) {
        self.events.push(HostEvent::Redo(count));
    }
}

impl RegisterStore for MemoryHost {
    fn set_register(&mut self, name: Option<char>, text: String, kind: RegisterKind) {
        self.registers.set_register(name, text, kind);
    }

    fn register(&self, name: Option<char>) -> Option<Register> {
        self.registers.register(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn edits_apply_and_reject() {
        let mut host = MemoryHost::new(&["abc"]);
        let range = Range::new(Position::new(0, 1), Position::new(0, 2));
        assert_eq!(host.apply_edit(range, "XY"), Ok(()));
        assert_eq!(host.lines(), vec!["aXYc"]);

        let bad = Range::point(Position::new(9, 0));
        assert_eq!(host.apply_edit(bad, "z"), Err(EditError::OutOfBounds(bad)));

        host.set_read_only(true);
        assert_eq!(host.apply_edit(range, ""), Err(EditError::ReadOnly));
    }

    #[test]
    fn typing_inserts_at_cursor() {
        let mut host = MemoryHost::new(&["ac"]).with_cursor(Position::new(0, 1));
        assert!(host.type_key(KeyToken::char('b')));
        assert!(host.type_key(KeyToken::named(KeyCode::Enter)));
        assert_eq!(host.lines(), vec!["ab", "c"]);
        assert_eq!(host.cursor().position(), Position::new(1, 0));

        assert!(host.type_key(KeyToken::named(KeyCode::Backspace)));
        assert_eq!(host.lines(), vec!["abc"]);
        assert_eq!(host.cursor().position(), Position::new(0, 2));

        assert!(!host.type_key(KeyToken::named(KeyCode::F(1))));
    }

    #[test]
    fn triggers_are_recorded() {
        let mut host = MemoryHost::default();
        host.start_search(SearchDirection::Backward);
        host.undo(2);
        assert_eq!(
            host.events(),
            &[HostEvent::Search(SearchDirection::Backward), HostEvent::Undo(2)]
        );
    }
}
