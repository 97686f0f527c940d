//! Host adapter — what the engine needs from the editor it is embedded in.
//!
//! The engine owns no text. A host implements three traits:
//!
//! - [`BufferView`]: the lines, the cursor, edit application, and a place to
//!   mirror the visual selection for rendering.
//! - [`UiTriggers`]: hooks for the parts of modal editing that live in host
//!   UI (command line, search bar, undo history). All default to no-ops.
//! - [`RegisterStore`]: where yanked and deleted text goes.
//!
//! [`Host`] is all three together, implemented for every type that has
//! them.

use thiserror::Error;

use crate::position::{CursorPosition, Range};
use crate::register::RegisterStore;
use crate::selection::VisualSelection;

/// Why the host refused an edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("edit range {0:?} is outside the buffer")]
    OutOfBounds(Range),
    #[error("buffer is read-only")]
    ReadOnly,
}

/// The host's text buffer as the engine sees it.
pub trait BufferView {
    /// Current lines, without line breaks. Never empty: an empty buffer is
    /// one empty line.
    fn lines(&self) -> Vec<String>;

    fn cursor(&self) -> CursorPosition;

    fn set_cursor(&mut self, cursor: CursorPosition);

    /// Replace `range` with `replacement`, which may contain `\n`.
    ///
    /// # Errors
    ///
    /// An [`EditError`] if the host cannot apply the edit. The engine
    /// then skips the remaining edits of the command.
    fn apply_edit(&mut self, range: Range, replacement: &str) -> Result<(), EditError>;

    /// The selection last mirrored to the host.
    fn selection(&self) -> Option<VisualSelection>;

    /// Mirror the engine's selection (`None` when Visual mode ends).
    fn set_selection(&mut self, selection: Option<VisualSelection>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchDirection {
    /// `/`
    Forward,
    /// `?`
    Backward,
}

/// Host UI the engine hands off to.
pub trait UiTriggers {
    /// `:` was pressed. The engine is now in Command mode; the host calls
    /// [`Engine::exit_command_mode`](crate::dispatcher::Engine::exit_command_mode)
    /// when its command line closes.
    fn enter_command_mode(&mut self) {}

    /// `/` or `?` was pressed.
    fn start_search(&mut self, _direction: SearchDirection) {}

    /// `n`
    fn find_next(&mut self) {}

    /// `N`
    fn find_previous(&mut self) {}

    fn undo(&mut self, _count: usize) {}

    fn redo(&mut self, _count: usize) {}
}

/// Everything the engine needs from its host.
pub trait Host: BufferView + UiTriggers + RegisterStore {}

impl<T: BufferView + UiTriggers + RegisterStore> Host for T {}
