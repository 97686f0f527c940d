// SPDX-License-Identifier: MIT
//
// n-input — key model for n-modal.
//
// The engine never sees raw bytes or a terminal. Hosts translate whatever
// their toolkit hands them into a `KeyEvent`, and the engine normalizes
// that into a `KeyToken`, the unit its key buffer and grammar work on.
//
// Key notation (`d2w<Esc><C-v>`) is the human-facing spelling of a token
// sequence. Tests, the replay harness, and status lines all use it, so it
// lives here next to the tokens it describes.

pub mod key;
pub mod notation;

pub use key::{KeyCode, KeyEvent, KeyEventKind, KeyToken, Modifiers};
pub use notation::{NotationError, format_keys, parse_keys};
