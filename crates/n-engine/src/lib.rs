//! # n-engine — Modal command engine for n-modal
//!
//! Vim-style modal editing for any host that can hand over its lines and a
//! cursor. The engine turns a stream of keys into edits, cursor moves, and
//! mode changes; the host keeps the text, draws it, and owns undo.
//!
//! - **[`dispatcher`]** — `Engine`, the per-key entry point
//! - **[`grammar`]** — key sequences to commands, longest match first
//! - **[`command`]** — the command AST
//! - **[`executor`]** — commands to edits, pure
//! - **[`mode`]** — modes and the mode state machine
//! - **[`adapter`]** — the traits a host implements
//! - **[`memory`]** — an in-memory host for tests and the replay harness
//!
//! Building blocks underneath:
//!
//! - **[`text`]** — rope snapshot of the host lines
//! - **[`position`]** — `Position`, `Range`, `CursorPosition`
//! - **[`cursor`]**, **[`motion`]**, **[`word`]** — where motions land
//! - **[`text_object`]**, **[`span`]**, **[`selection`]** — what operators cover
//! - **[`register`]**, **[`options`]**, **[`keybuf`]**

pub mod adapter;
pub mod command;
pub mod cursor;
pub mod dispatcher;
pub mod executor;
pub mod grammar;
pub mod keybuf;
pub mod memory;
pub mod mode;
pub mod motion;
pub mod options;
pub mod position;
pub mod register;
pub mod selection;
pub mod span;
pub mod text;
pub mod text_object;
pub mod word;

pub use adapter::{BufferView, EditError, Host, SearchDirection, UiTriggers};
pub use dispatcher::{Engine, StateSnapshot};
pub use memory::{HostEvent, MemoryHost};
pub use mode::{Mode, VisualKind};
pub use options::{OptionError, Options};
pub use position::{CursorPosition, Position, Range};
pub use register::{Register, RegisterFile, RegisterKind, RegisterStore};
