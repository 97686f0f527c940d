//! Dispatcher — the per-keystroke entry point.
//!
//! ```text
//! key ─► mode handler ─► UI trigger? ─► parse(buffer + key)
//!                                          │
//!            Incomplete / NeedsChar ◄──────┼──► Invalid: clear, not consumed
//!              (append, consumed)          │
//!                                          ▼
//!                             Complete: clear, execute, apply
//! ```
//!
//! [`Engine`] owns its host, the mode machine, and the key buffer. Nothing
//! about the buffer is cached between keys: every command re-reads the
//! lines. The only state that survives is the sticky column, and it is
//! dropped as soon as the host cursor is found somewhere the engine did not
//! put it.

use n_input::{KeyEvent, KeyToken, format_keys};
use tracing::{debug, trace, warn};

use crate::adapter::{Host, SearchDirection};
use crate::command::{CharFind, Invocation};
use crate::cursor::Cursor;
use crate::executor::{self, ExecContext, HostRequest, Outcome};
use crate::grammar::{self, ParseStatus};
use crate::keybuf::KeyBuffer;
use crate::mode::{Mode, ModeMachine, Transition, VisualKind};
use crate::options::{OptionError, Options};
use crate::position::Position;
use crate::text::Text;

/// Read-only view of the engine state for status lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    pub mode: Mode,
    pub visual_granularity: Option<VisualKind>,
    pub pending_keys: Vec<KeyToken>,
}

pub struct Engine<H: Host> {
    host: H,
    modes: ModeMachine,
    keys: KeyBuffer,
    options: Options,
    /// Where the engine last left the cursor, and the sticky column there.
    sticky: Option<(Position, usize)>,
    last_find: Option<CharFind>,
}

impl<H: Host> Engine<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            modes: ModeMachine::new(),
            keys: KeyBuffer::new(),
            options: Options::default(),
            sticky: None,
            last_find: None,
        }
    }

    #[inline]
    pub const fn host(&self) -> &H {
        &self.host
    }

    #[inline]
    pub const fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    #[inline]
    pub const fn mode(&self) -> Mode {
        self.modes.mode()
    }

    #[inline]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let mode = self.modes.mode();
        StateSnapshot {
            mode,
            visual_granularity: mode.visual_kind(),
            pending_keys: self.keys.snapshot().to_vec(),
        }
    }

    /// Apply a `:set`-style argument string. Returns the replies to queries.
    ///
    /// # Errors
    ///
    /// An [`OptionError`] for unknown options or bad values; directives
    /// before the bad one stay applied.
    pub fn set_option(&mut self, args: &str) -> Result<Vec<String>, OptionError> {
        let replies = self.options.set(args)?;
        debug!(target: "engine.dispatch", args, "options set");
        Ok(replies)
    }

    /// Called by the host when its command line closes.
    pub fn exit_command_mode(&mut self) -> bool {
        let at = self.host.cursor().position();
        if !self.modes.apply(Transition::ExitCommand, at) {
            return false;
        }
        self.keys.clear();
        self.clamp_cursor();
        true
    }

    // -- Key entry ----------------------------------------------------------

    /// Handle a raw host key event. Releases are never consumed.
    pub fn handle_key_event(&mut self, event: KeyEvent) -> bool {
        if !event.is_press() {
            return false;
        }
        self.handle_key(KeyToken::from(event))
    }

    /// Handle one key. Returns `false` when the host should apply its own
    /// default behaviour (text typed in Insert mode, keys that fit no
    /// command).
    pub fn handle_key(&mut self, key: KeyToken) -> bool {
        let mode = self.modes.mode();
        trace!(target: "engine.dispatch", key = %format_keys(&[key]), %mode, "key");
        match mode {
            Mode::Insert => self.insert_key(key),
            Mode::Command => self.command_key(key),
            Mode::Normal | Mode::Visual(_) => self.command_mode_key(key),
        }
    }

    /// Insert mode: only Escape is ours. Leaving Insert steps the cursor
    /// back onto the char it was after.
    fn insert_key(&mut self, key: KeyToken) -> bool {
        if !key.is_escape() {
            return false;
        }
        let at = self.host.cursor().position();
        self.modes.apply(Transition::Escape, at);
        let back = Position::new(at.line, at.col.saturating_sub(1));
        self.place_cursor(Cursor::at(back));
        true
    }

    /// Command mode: the host's command line owns the keys; Escape cancels.
    fn command_key(&mut self, key: KeyToken) -> bool {
        if !key.is_escape() {
            return false;
        }
        let at = self.host.cursor().position();
        self.modes.apply(Transition::Escape, at);
        self.clamp_cursor();
        true
    }

    /// Normal and Visual: keys go through the grammar.
    fn command_mode_key(&mut self, key: KeyToken) -> bool {
        if key.is_escape() {
            self.cancel();
            return true;
        }
        if self.keys.is_empty() && self.ui_trigger(key) {
            return true;
        }

        let candidate = self.keys.with(key);
        match grammar::parse(&candidate, self.modes.mode()) {
            ParseStatus::Incomplete | ParseStatus::NeedsChar => {
                self.keys.append(key);
                trace!(target: "engine.dispatch", pending = %self.keys.notation(), "pending");
                true
            }
            ParseStatus::Invalid => {
                self.keys.clear();
                debug!(target: "engine.dispatch", keys = %format_keys(&candidate), "invalid");
                false
            }
            ParseStatus::Complete(invocation) => {
                self.keys.clear();
                self.run(&invocation);
                true
            }
        }
    }

    /// Escape in Normal or Visual: drop pending keys and the selection.
    fn cancel(&mut self) {
        if !self.keys.is_empty() {
            debug!(target: "engine.dispatch", keys = %self.keys.notation(), "cancelled");
        }
        self.keys.clear();
        if self.modes.mode().is_visual() {
            let at = self.host.cursor().position();
            self.modes.apply(Transition::Escape, at);
            self.host.set_selection(None);
        }
    }

    /// Keys handed to host UI. Only checked with an empty key buffer, so
    /// `fn` or `rn` still reach the grammar.
    fn ui_trigger(&mut self, key: KeyToken) -> bool {
        match key.as_char() {
            Some(':') => {
                let at = self.host.cursor().position();
                self.modes.apply(Transition::EnterCommand, at);
                self.host.set_selection(None);
                self.host.enter_command_mode();
            }
            Some('/') => self.host.start_search(SearchDirection::Forward),
            Some('?') => self.host.start_search(SearchDirection::Backward),
            Some('n') => self.host.find_next(),
            Some('N') => self.host.find_previous(),
            _ => return false,
        }
        debug!(target: "engine.dispatch", key = %format_keys(&[key]), "ui trigger");
        true
    }

    // -- Execution ----------------------------------------------------------

    fn run(&mut self, invocation: &Invocation) {
        let text = Text::from_lines(&self.host.lines());
        let cursor = self.current_cursor(&text);
        let result = {
            let ctx = ExecContext {
                text: &text,
                cursor,
                mode: self.modes.mode(),
                selection: self.modes.selection(),
                last_find: self.last_find,
                registers: &self.host,
                options: &self.options,
            };
            executor::execute(invocation, &ctx)
        };
        match result {
            Ok(outcome) => self.apply(outcome, cursor.position()),
            Err(error) => {
                debug!(target: "engine.exec", %error, command = ?invocation.command, "no-op");
            }
        }
    }

    /// The host cursor, clamped, with the sticky column if the cursor is
    /// still where the engine left it.
    fn current_cursor(&self, text: &Text) -> Cursor {
        let past_end = self.modes.mode().cursor_past_end();
        let at = text.clamp_position(self.host.cursor().position(), past_end);
        match self.sticky {
            Some((left_at, col)) if left_at == at => Cursor::with_sticky(at, col),
            _ => Cursor::at(at),
        }
    }

    /// The single place a command's effects reach the host.
    fn apply(&mut self, outcome: Outcome, before: Position) {
        let Outcome {
            cursor,
            edits,
            register,
            transition,
            selection,
            last_find,
            host,
        } = outcome;

        for (i, edit) in edits.iter().enumerate() {
            if let Err(error) = self.host.apply_edit(edit.range, &edit.replacement) {
                warn!(
                    target: "engine.exec",
                    %error,
                    skipped = edits.len() - i - 1,
                    "edit rejected"
                );
                break;
            }
        }
        if let Some(write) = register {
            self.host.set_register(write.name, write.text, write.kind);
        }
        if last_find.is_some() {
            self.last_find = last_find;
        }
        if let Some(transition) = transition {
            self.modes.apply(transition, before);
        }
        if let Some((start, end)) = selection {
            self.modes.replace_selection(start, end);
        }
        match host {
            Some(HostRequest::Undo(count)) => self.host.undo(count),
            Some(HostRequest::Redo(count)) => self.host.redo(count),
            None => {}
        }

        match cursor {
            Some(cursor) => self.place_cursor(cursor),
            None => self.clamp_cursor(),
        }
    }

    /// Put the cursor on the host, clamped for the current mode, and
    /// refresh the selection.
    fn place_cursor(&mut self, cursor: Cursor) {
        let text = Text::from_lines(&self.host.lines());
        let past_end = self.modes.mode().cursor_past_end();
        let resolved = text.cursor_position(cursor.position(), past_end);
        self.host.set_cursor(resolved);
        self.sticky = Some((resolved.position(), cursor.sticky_col()));
        self.sync_selection(resolved.position());
    }

    /// Re-clamp the host cursor without moving it otherwise. Keeps the
    /// sticky column when the cursor did not move.
    fn clamp_cursor(&mut self) {
        let text = Text::from_lines(&self.host.lines());
        let cursor = self.current_cursor(&text);
        self.place_cursor(cursor);
    }

    fn sync_selection(&mut self, cursor: Position) {
        if self.modes.mode().is_visual() {
            self.modes.track_cursor(cursor);
        }
        self.host.set_selection(self.modes.selection());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::BufferView;
    use crate::memory::{HostEvent, MemoryHost};
    use crate::register::{RegisterKind, RegisterStore};
    use crate::selection::VisualSelection;
    use n_input::{KeyCode, KeyEventKind, Modifiers, parse_keys};
    use pretty_assertions::assert_eq;

    fn engine(lines: &[&str], at: Position) -> Engine<MemoryHost> {
        Engine::new(MemoryHost::new(lines).with_cursor(at))
    }

    /// Feed keys the way a host would: keys the engine passes on in Insert
    /// mode are typed into the buffer.
    fn feed(engine: &mut Engine<MemoryHost>, keys: &str) -> Vec<bool> {
        parse_keys(keys)
            .unwrap()
            .into_iter()
            .map(|key| {
                let consumed = engine.handle_key(key);
                if !consumed && engine.mode() == Mode::Insert {
                    engine.host_mut().type_key(key);
                }
                consumed
            })
            .collect()
    }

    fn lines(engine: &Engine<MemoryHost>) -> Vec<String> {
        engine.host().lines()
    }

    fn cursor(engine: &Engine<MemoryHost>) -> Position {
        engine.host().cursor().position()
    }

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    // -- Scenarios ----------------------------------------------------------

    #[test]
    fn dw_deletes_first_word() {
        let mut e = engine(&["foo bar", "baz"], p(0, 0));
        feed(&mut e, "dw");
        assert_eq!(lines(&e), vec!["bar", "baz"]);
        assert_eq!(cursor(&e), p(0, 0));
        assert_eq!(
            e.host().register(None).map(|r| r.text().to_string()),
            Some("foo ".to_string())
        );
    }

    #[test]
    fn three_dd_on_two_lines() {
        let mut e = engine(&["one", "two"], p(0, 0));
        feed(&mut e, "3dd");
        assert_eq!(lines(&e), vec![""]);
        assert_eq!(cursor(&e), p(0, 0));
    }

    #[test]
    fn control_chars_stay_inside_their_line() {
        let mut e = engine(&["a\u{0C}b", "c"], p(0, 0));
        feed(&mut e, "dd");
        assert_eq!(lines(&e), vec!["c"]);

        let mut e = engine(&["x\ry", "z"], p(0, 0));
        feed(&mut e, "j");
        assert_eq!(lines(&e), vec!["x\ry", "z"]);
        assert_eq!(cursor(&e), p(1, 0));
        assert_eq!(e.host().cursor().offset(), 4);

        let host = MemoryHost::new(&["p\u{2028}q", "r"]);
        assert_eq!(host.lines(), vec!["p\u{2028}q", "r"]);
    }

    #[test]
    fn counts_multiply() {
        let mut e = engine(&["a b c d e f g h"], p(0, 0));
        feed(&mut e, "2d3w");
        assert_eq!(lines(&e), vec!["g h"]);
    }

    #[test]
    fn yank_then_paste_round_trip() {
        let mut e = engine(&["alpha beta"], p(0, 0));
        feed(&mut e, "yw$p");
        assert_eq!(lines(&e), vec!["alpha betaalpha "]);
        assert_eq!(cursor(&e), p(0, 15));
    }

    #[test]
    fn named_registers_append() {
        let mut e = engine(&["one", "two"], p(0, 0));
        feed(&mut e, "\"ayyj\"Ayy");
        assert_eq!(e.host().registers().get(Some('a')).text(), "one\ntwo\n");
        feed(&mut e, "G\"ap");
        assert_eq!(lines(&e), vec!["one", "two", "one", "two"]);
    }

    #[test]
    fn change_word_and_type() {
        let mut e = engine(&["foo bar"], p(0, 0));
        feed(&mut e, "cwbaz<Esc>");
        assert_eq!(lines(&e), vec!["baz bar"]);
        assert_eq!(e.mode(), Mode::Normal);
        assert_eq!(cursor(&e), p(0, 2));
    }

    #[test]
    fn insert_escape_steps_back() {
        let mut e = engine(&["abc"], p(0, 0));
        feed(&mut e, "A");
        assert_eq!(cursor(&e), p(0, 3));
        feed(&mut e, "<Esc>");
        assert_eq!(cursor(&e), p(0, 2));
        feed(&mut e, "i<Esc>");
        assert_eq!(cursor(&e), p(0, 1));
        feed(&mut e, "0i<Esc>");
        assert_eq!(cursor(&e), p(0, 0));
    }

    #[test]
    fn open_line_below_and_type() {
        let mut e = engine(&["a", "c"], p(0, 0));
        feed(&mut e, "ob<Esc>");
        assert_eq!(lines(&e), vec!["a", "b", "c"]);
        assert_eq!(cursor(&e), p(1, 0));
    }

    // -- Sticky column ------------------------------------------------------

    #[test]
    fn vertical_moves_keep_column() {
        let mut e = engine(&["abcdef", "ab", "abcdef"], p(0, 4));
        feed(&mut e, "j");
        assert_eq!(cursor(&e), p(1, 1));
        feed(&mut e, "j");
        assert_eq!(cursor(&e), p(2, 4));
    }

    #[test]
    fn host_cursor_move_drops_sticky_column() {
        let mut e = engine(&["abcdef", "ab", "abcdef"], p(0, 4));
        feed(&mut e, "j");
        let moved = e.host().text().cursor_position(p(1, 0), false);
        e.host_mut().set_cursor(moved);
        feed(&mut e, "j");
        assert_eq!(cursor(&e), p(2, 0));
    }

    #[test]
    fn dollar_sticks_to_line_end() {
        let mut e = engine(&["abc", "abcdefg", "a"], p(0, 0));
        feed(&mut e, "$j");
        assert_eq!(cursor(&e), p(1, 6));
        feed(&mut e, "j");
        assert_eq!(cursor(&e), p(2, 0));
    }

    #[test]
    fn find_repeats_across_commands() {
        let mut e = engine(&["a,b,c,d"], p(0, 0));
        feed(&mut e, "f,;");
        assert_eq!(cursor(&e), p(0, 3));
        feed(&mut e, "d;");
        assert_eq!(lines(&e), vec!["a,bd"]);
        feed(&mut e, ",");
        assert_eq!(cursor(&e), p(0, 1));
    }

    // -- Visual -------------------------------------------------------------

    #[test]
    fn visual_line_selects_full_lines() {
        let mut e = engine(&["1", "2", "3", "4", "5"], p(1, 0));
        feed(&mut e, "V2j");
        assert_eq!(e.mode(), Mode::Visual(VisualKind::Line));
        let sel = e.host().selection().unwrap();
        assert_eq!(sel.start, p(1, 0));
        assert_eq!(sel.end, p(3, 0));
        feed(&mut e, "d");
        assert_eq!(lines(&e), vec!["1", "5"]);
        assert_eq!(e.mode(), Mode::Normal);
        assert_eq!(e.host().selection(), None);
        assert_eq!(
            e.host().register(None).map(|r| r.kind()),
            Some(RegisterKind::Line)
        );
    }

    #[test]
    fn visual_dollar_takes_the_line_break() {
        let mut e = engine(&["ab", "cd"], p(0, 0));
        feed(&mut e, "v$d");
        assert_eq!(lines(&e), vec!["cd"]);
        assert_eq!(e.host().registers().get(None).text(), "ab\n");

        let mut e = engine(&["ab", "cd"], p(0, 0));
        feed(&mut e, "vld");
        assert_eq!(lines(&e), vec!["", "cd"]);
    }

    #[test]
    fn visual_enter_and_escape_changes_nothing() {
        for key in ["v", "V", "<C-v>"] {
            let mut e = engine(&["hello", "world"], p(1, 2));
            feed(&mut e, key);
            assert!(e.mode().is_visual());
            feed(&mut e, "<Esc>");
            assert_eq!(e.mode(), Mode::Normal);
            assert_eq!(cursor(&e), p(1, 2));
            assert_eq!(lines(&e), vec!["hello", "world"]);
            assert_eq!(e.host().selection(), None);
        }
    }

    #[test]
    fn visual_selection_tracks_cursor() {
        let mut e = engine(&["hello world"], p(0, 0));
        feed(&mut e, "vee");
        assert_eq!(
            e.host().selection(),
            Some(VisualSelection {
                start: p(0, 0),
                end: p(0, 10),
                granularity: VisualKind::Char,
            })
        );
        feed(&mut e, "o");
        assert_eq!(cursor(&e), p(0, 0));
        feed(&mut e, "y");
        assert_eq!(
            e.host().register(None).map(|r| r.text().to_string()),
            Some("hello world".to_string())
        );
    }

    #[test]
    fn visual_text_object_then_change() {
        let mut e = engine(&["f(a, b)"], p(0, 3));
        feed(&mut e, "vi(cx<Esc>");
        assert_eq!(lines(&e), vec!["f(x)"]);
    }

    #[test]
    fn visual_switch_granularity_keeps_anchor() {
        let mut e = engine(&["abc", "def"], p(0, 1));
        feed(&mut e, "vj<C-v>");
        assert_eq!(e.mode(), Mode::Visual(VisualKind::Block));
        let sel = e.host().selection().unwrap();
        assert_eq!(sel.start, p(0, 1));
        feed(&mut e, "<C-v>");
        assert_eq!(e.mode(), Mode::Normal);
    }

    // -- Escape and invalid keys --------------------------------------------

    #[test]
    fn escape_clears_pending_keys() {
        let mut e = engine(&["abc"], p(0, 1));
        feed(&mut e, "2d");
        assert_eq!(e.snapshot().pending_keys.len(), 2);
        assert_eq!(feed(&mut e, "<Esc>"), vec![true]);
        assert_eq!(
            e.snapshot(),
            StateSnapshot {
                mode: Mode::Normal,
                visual_granularity: None,
                pending_keys: Vec::new(),
            }
        );
        assert_eq!(lines(&e), vec!["abc"]);
        assert_eq!(cursor(&e), p(0, 1));
    }

    #[test]
    fn invalid_sequence_is_not_consumed() {
        let mut e = engine(&["abc"], p(0, 0));
        assert_eq!(feed(&mut e, "dq"), vec![true, false]);
        assert!(e.snapshot().pending_keys.is_empty());
        assert_eq!(feed(&mut e, "Q"), vec![false]);
        assert_eq!(lines(&e), vec!["abc"]);
    }

    #[test]
    fn failed_command_is_a_no_op() {
        let mut e = engine(&["abc"], p(0, 0));
        assert_eq!(feed(&mut e, "fz"), vec![true, true]);
        assert_eq!(cursor(&e), p(0, 0));
        assert!(e.snapshot().pending_keys.is_empty());
        feed(&mut e, "p");
        assert_eq!(lines(&e), vec!["abc"]);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut e = engine(&["abc"], p(0, 0));
        let mut release = KeyEvent::new(KeyCode::Char('l'), Modifiers::empty());
        release.kind = KeyEventKind::Release;
        assert!(!e.handle_key_event(release));
        assert!(e.handle_key_event(KeyEvent::new(KeyCode::Char('l'), Modifiers::empty())));
        assert_eq!(cursor(&e), p(0, 1));
    }

    #[test]
    fn rejected_edit_leaves_text() {
        let mut e = engine(&["abc"], p(0, 0));
        e.host_mut().set_read_only(true);
        feed(&mut e, "x");
        assert_eq!(lines(&e), vec!["abc"]);
    }

    // -- UI triggers --------------------------------------------------------

    #[test]
    fn ui_triggers_need_empty_buffer() {
        let mut e = engine(&["a"], p(0, 0));
        feed(&mut e, "/n?N");
        assert_eq!(
            e.host().events(),
            &[
                HostEvent::Search(SearchDirection::Forward),
                HostEvent::FindNext,
                HostEvent::Search(SearchDirection::Backward),
                HostEvent::FindPrevious,
            ]
        );
        assert_eq!(feed(&mut e, "dn"), vec![true, false]);
        assert_eq!(e.host().events().len(), 4);
    }

    #[test]
    fn command_mode_round_trip() {
        let mut e = engine(&["a"], p(0, 0));
        feed(&mut e, ":");
        assert_eq!(e.mode(), Mode::Command);
        assert_eq!(e.host().events(), &[HostEvent::CommandMode]);
        assert_eq!(feed(&mut e, "w"), vec![false]);
        assert!(e.exit_command_mode());
        assert_eq!(e.mode(), Mode::Normal);
        assert!(!e.exit_command_mode());

        feed(&mut e, ":<Esc>");
        assert_eq!(e.mode(), Mode::Normal);
    }

    #[test]
    fn undo_delegates_to_host() {
        let mut e = engine(&["a"], p(0, 0));
        feed(&mut e, "2u<C-r>");
        assert_eq!(e.host().events(), &[HostEvent::Undo(2), HostEvent::Redo(1)]);
    }

    // -- Options ------------------------------------------------------------

    #[test]
    fn shiftwidth_option_drives_indent() {
        let mut e = engine(&["x"], p(0, 0));
        assert_eq!(e.set_option("sw=2 sw?"), Ok(vec!["shiftwidth=2".to_string()]));
        feed(&mut e, ">>");
        assert_eq!(lines(&e), vec!["  x"]);
        assert!(e.set_option("bogus").is_err());
    }

    #[test]
    fn register_store_is_the_host() {
        let mut e = engine(&["abc"], p(0, 0));
        e.host_mut()
            .set_register(Some('q'), "Z".to_string(), RegisterKind::Char);
        feed(&mut e, "\"qP");
        assert_eq!(lines(&e), vec!["Zabc"]);
    }
}
