//! Executor — applies one command to a text snapshot.
//!
//! [`execute`] is pure. It reads the snapshot, cursor, selection, and
//! registers in an [`ExecContext`] and describes what should change in an
//! [`Outcome`]: edits, the new cursor, a register write, a mode transition.
//! The dispatcher applies the outcome to the host in one place.
//!
//! Edits are applied in order, each range relative to the text left by the
//! edits before it. Deletions are emitted bottom-up so every range can be
//! computed on the original snapshot. The outcome cursor is a position in
//! the text after all edits.

use thiserror::Error;
use tracing::trace;

use crate::command::{Action, CharFind, Command, InsertAt, Invocation, Operator, combine_counts};
use crate::cursor::Cursor;
use crate::mode::{Mode, Transition, VisualKind};
use crate::motion;
use crate::options::Options;
use crate::position::{Position, Range};
use crate::register::{RegisterKind, RegisterStore};
use crate::selection::VisualSelection;
use crate::span::Span;
use crate::text::Text;
use crate::text_object::{self, TextObject};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a command did nothing. Never fatal: the dispatcher logs it and
/// drops the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecError {
    /// The motion or text object has no target here.
    #[error("no match")]
    NoMatch,
    /// Paste from a register that holds nothing.
    #[error("register is empty")]
    EmptyRegister,
    /// The operator covers no text.
    #[error("nothing to operate on")]
    EmptySpan,
    /// A visual command arrived without a selection.
    #[error("no visual selection")]
    NoSelection,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// One text replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range,
    pub replacement: String,
}

impl Edit {
    #[must_use]
    pub const fn new(range: Range, replacement: String) -> Self {
        Self { range, replacement }
    }

    #[must_use]
    pub const fn insert(at: Position, text: String) -> Self {
        Self::new(Range::point(at), text)
    }

    #[must_use]
    pub const fn delete(range: Range) -> Self {
        Self::new(range, String::new())
    }
}

/// Text bound for a register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterWrite {
    pub name: Option<char>,
    pub text: String,
    pub kind: RegisterKind,
}

/// Work the host does on the engine's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    Undo(usize),
    Redo(usize),
}

/// Everything one command changes. Empty fields change nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub cursor: Option<Cursor>,
    pub edits: Vec<Edit>,
    pub register: Option<RegisterWrite>,
    pub transition: Option<Transition>,
    /// New selection bounds (anchor, live end).
    pub selection: Option<(Position, Position)>,
    /// A new char search to remember for `;` and `,`.
    pub last_find: Option<CharFind>,
    pub host: Option<HostRequest>,
}

impl Outcome {
    fn at(pos: Position) -> Self {
        Self {
            cursor: Some(Cursor::at(pos)),
            ..Self::default()
        }
    }

    fn with_edits(mut self, edits: Vec<Edit>) -> Self {
        self.edits = edits;
        self
    }

    fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = Some(transition);
        self
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// What a command may read.
pub struct ExecContext<'a> {
    pub text: &'a Text,
    /// Cursor plus sticky column.
    pub cursor: Cursor,
    pub mode: Mode,
    pub selection: Option<VisualSelection>,
    pub last_find: Option<CharFind>,
    pub registers: &'a dyn RegisterStore,
    pub options: &'a Options,
}

impl ExecContext<'_> {
    const fn pos(&self) -> Position {
        self.cursor.position()
    }

    fn content_len(&self, line: usize) -> usize {
        self.text.line_content_len(line).unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Interpret one command.
///
/// # Errors
///
/// Returns an [`ExecError`] when the command cannot act here. The caller
/// treats that as a no-op.
pub fn execute(invocation: &Invocation, ctx: &ExecContext<'_>) -> Result<Outcome, ExecError> {
    let register = invocation.register;
    let result = match invocation.command {
        Command::Motion { count, motion } => {
            let landing = motion::resolve(
                ctx.text,
                ctx.cursor,
                motion,
                count,
                ctx.last_find,
                ctx.mode.cursor_past_end(),
            )?;
            Ok(Outcome {
                cursor: Some(landing.cursor),
                last_find: landing.find,
                ..Outcome::default()
            })
        }
        Command::OperatorMotion {
            op_count,
            operator,
            motion_count,
            motion,
        } => {
            let count = combine_counts(op_count, motion_count);
            let (span, find) = motion::operator_span(
                ctx.text,
                ctx.cursor,
                operator,
                motion,
                count,
                ctx.last_find,
            )?;
            let mut outcome = apply_operator(ctx, operator, span, register)?;
            outcome.last_find = find;
            Ok(outcome)
        }
        Command::OperatorTextObject {
            count,
            operator,
            object,
            inclusive,
        } => {
            let span = text_object::select(
                ctx.text,
                ctx.pos(),
                object,
                inclusive,
                count.unwrap_or(1),
            )
            .ok_or(ExecError::NoMatch)?;
            apply_operator(ctx, operator, span, register)
        }
        Command::VisualOperator { operator } => {
            let selection = ctx.selection.ok_or(ExecError::NoSelection)?;
            // After `$` the selection reaches past the last char.
            let span = if ctx.cursor.sticky_col() == usize::MAX {
                selection.span_to_line_end(ctx.text)
            } else {
                selection.span(ctx.text)
            };
            let mut outcome = apply_operator(ctx, operator, span, register)?;
            outcome.transition.get_or_insert(Transition::EnterNormal);
            Ok(outcome)
        }
        Command::VisualTextObject { object, inclusive } => select_object(ctx, object, inclusive),
        Command::Immediate { count, action } => immediate(ctx, action, count, register),
    };

    if let Ok(outcome) = &result {
        trace!(
            target: "engine.exec",
            command = ?invocation.command,
            edits = outcome.edits.len(),
            "executed"
        );
    }
    result
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

fn apply_operator(
    ctx: &ExecContext<'_>,
    operator: Operator,
    span: Span,
    register: Option<char>,
) -> Result<Outcome, ExecError> {
    match operator {
        Operator::Delete => delete(ctx.text, span, register),
        Operator::Change => change(ctx, span, register),
        Operator::Yank => {
            if span.is_empty(ctx.text) {
                return Err(ExecError::EmptySpan);
            }
            Ok(Outcome {
                register: Some(take(ctx.text, span, register)),
                ..Outcome::default()
            })
        }
        Operator::Indent => shift(ctx, span, true),
        Operator::Outdent => shift(ctx, span, false),
        Operator::Lowercase => recase(ctx.text, span, Case::Lower),
        Operator::Uppercase => recase(ctx.text, span, Case::Upper),
        Operator::ToggleCase => recase(ctx.text, span, Case::Toggle),
        Operator::Join => {
            let (first, last) = covered_lines(ctx.text, span);
            join_lines(ctx.text, first, (last - first + 1).max(2))
        }
    }
}

fn take(text: &Text, span: Span, name: Option<char>) -> RegisterWrite {
    RegisterWrite {
        name,
        text: span.extract(text),
        kind: span.register_kind(),
    }
}

fn delete(text: &Text, span: Span, register: Option<char>) -> Result<Outcome, ExecError> {
    if span.is_empty(text) {
        return Err(ExecError::EmptySpan);
    }
    let edits = span
        .delete_ranges(text)
        .into_iter()
        .map(Edit::delete)
        .collect();
    let cursor = match span {
        Span::Lines { first, last } => after_line_delete(text, first, last),
        _ => span.start(text),
    };
    let mut outcome = Outcome::at(cursor).with_edits(edits);
    outcome.register = Some(take(text, span, register));
    Ok(outcome)
}

/// Where the cursor lands once `first..=last` are gone: the first
/// non-blank of the line that moves up into `first`, or of the new last
/// line when the deletion ran to the end.
fn after_line_delete(text: &Text, first: usize, last: usize) -> Position {
    let last_line = text.line_count().saturating_sub(1);
    if last < last_line {
        Position::new(first, text.first_non_blank(last + 1))
    } else if first > 0 {
        Position::new(first - 1, text.first_non_blank(first - 1))
    } else {
        Position::ZERO
    }
}

/// Like delete, but an empty span is fine (`cl` on an empty line still
/// enters Insert) and changing whole lines leaves one empty line behind.
fn change(ctx: &ExecContext<'_>, span: Span, register: Option<char>) -> Result<Outcome, ExecError> {
    let text = ctx.text;
    let (edits, cursor) = match span {
        Span::Lines { first, last } => {
            let last = last.min(text.line_count().saturating_sub(1));
            let end = Position::new(last, ctx.content_len(last));
            let start = Position::new(first, 0);
            (vec![Edit::delete(Range::new(start, end))], start)
        }
        _ => (
            span.delete_ranges(text)
                .into_iter()
                .filter(|r| !r.is_empty())
                .map(Edit::delete)
                .collect(),
            span.start(text),
        ),
    };
    let mut outcome = Outcome::at(cursor)
        .with_edits(edits)
        .with_transition(Transition::EnterInsert);
    if !span.is_empty(text) {
        outcome.register = Some(take(text, span, register));
    }
    Ok(outcome)
}

/// Lines an operator touches. A char span ending at the start of a line
/// does not touch that line.
fn covered_lines(text: &Text, span: Span) -> (usize, usize) {
    let (first, last) = match span {
        Span::Chars(r) if r.end.line > r.start.line && r.end.col == 0 => {
            (r.start.line, r.end.line - 1)
        }
        _ => span.line_bounds(),
    };
    (first, last.min(text.line_count().saturating_sub(1)))
}

/// `>` and `<`. Blank lines are left alone.
fn shift(ctx: &ExecContext<'_>, span: Span, indent: bool) -> Result<Outcome, ExecError> {
    let text = ctx.text;
    let (first, last) = covered_lines(text, span);
    let unit = ctx.options.indent_unit();
    let unit_len = unit.chars().count();
    let mut edits = Vec::new();
    let mut col = text.first_non_blank(first);

    for line in (first..=last).rev() {
        let content = text.line_string(line);
        if content.is_empty() {
            continue;
        }
        if indent {
            edits.push(Edit::insert(Position::new(line, 0), unit.clone()));
            if line == first {
                col += unit_len;
            }
        } else {
            let n = outdent_width(&content, ctx.options);
            if n > 0 {
                edits.push(Edit::delete(Range::new(
                    Position::new(line, 0),
                    Position::new(line, n),
                )));
            }
            if line == first {
                col -= n;
            }
        }
    }

    Ok(Outcome::at(Position::new(first, col)).with_edits(edits))
}

/// Leading blank chars that make up one `shiftwidth` of indentation.
fn outdent_width(line: &str, options: &Options) -> usize {
    let mut width = 0;
    let mut chars = 0;
    for ch in line.chars() {
        if width >= options.shiftwidth {
            break;
        }
        match ch {
            ' ' => width += 1,
            '\t' => width += options.tabstop,
            _ => break,
        }
        chars += 1;
    }
    chars
}

#[derive(Debug, Clone, Copy)]
enum Case {
    Lower,
    Upper,
    Toggle,
}

impl Case {
    fn convert(self, s: &str) -> String {
        match self {
            Self::Lower => s.to_lowercase(),
            Self::Upper => s.to_uppercase(),
            Self::Toggle => s
                .chars()
                .flat_map(|ch| {
                    let flipped: Vec<char> = if ch.is_lowercase() {
                        ch.to_uppercase().collect()
                    } else {
                        ch.to_lowercase().collect()
                    };
                    flipped
                })
                .collect(),
        }
    }
}

fn recase(text: &Text, span: Span, case: Case) -> Result<Outcome, ExecError> {
    if span.is_empty(text) {
        return Err(ExecError::EmptySpan);
    }
    let ranges = match span {
        Span::Chars(range) => vec![range],
        Span::Lines { .. } => {
            let (first, last) = covered_lines(text, span);
            let end = Position::new(last, text.line_content_len(last).unwrap_or(0));
            vec![Range::new(Position::new(first, 0), end)]
        }
        Span::Block { .. } => {
            let mut rows = span.block_rows(text);
            rows.reverse();
            rows
        }
    };
    let edits = ranges
        .into_iter()
        .filter_map(|range| {
            let before = text.slice(range)?;
            let after = case.convert(&before);
            (after != before).then(|| Edit::new(range, after))
        })
        .collect();
    Ok(Outcome::at(span.start(text)).with_edits(edits))
}

/// Join `count` lines starting at `line` into one. Leading blanks of each
/// joined line go; one space goes between unless the line so far already
/// ends in a blank, the joined line is empty, or it starts with `)`.
fn join_lines(text: &Text, line: usize, count: usize) -> Result<Outcome, ExecError> {
    let last_line = text.line_count().saturating_sub(1);
    if line >= last_line {
        return Err(ExecError::NoMatch);
    }
    let last = line.saturating_add(count - 1).min(last_line);

    let mut joined = text.line_string(line);
    let mut col = 0;
    for l in line + 1..=last {
        let next = text.line_string(l);
        let next = next.trim_start_matches([' ', '\t']);
        col = joined.chars().count();
        if !next.is_empty()
            && !joined.is_empty()
            && !joined.ends_with([' ', '\t'])
            && !next.starts_with(')')
        {
            joined.push(' ');
        }
        joined.push_str(next);
    }

    let end = Position::new(last, text.line_content_len(last).unwrap_or(0));
    let edit = Edit::new(Range::new(Position::new(line, 0), end), joined);
    Ok(Outcome::at(Position::new(line, col)).with_edits(vec![edit]))
}

// ---------------------------------------------------------------------------
// Visual text objects
// ---------------------------------------------------------------------------

/// Replace the selection with a text object. Linewise objects switch to
/// Visual Line, char objects to Visual Char.
fn select_object(
    ctx: &ExecContext<'_>,
    object: TextObject,
    inclusive: bool,
) -> Result<Outcome, ExecError> {
    let text = ctx.text;
    let span =
        text_object::select(text, ctx.pos(), object, inclusive, 1).ok_or(ExecError::NoMatch)?;
    let (start, end, kind) = match span {
        Span::Chars(range) => {
            let end_idx = text
                .pos_to_char_idx(range.end)
                .filter(|_| !range.is_empty())
                .ok_or(ExecError::NoMatch)?;
            (range.start, text.idx_to_pos(end_idx - 1), VisualKind::Char)
        }
        Span::Lines { first, last } => (
            Position::new(first, 0),
            Position::new(last, text.max_col(last, false)),
            VisualKind::Line,
        ),
        Span::Block {
            top,
            bottom,
            left,
            right,
        } => (
            Position::new(top, left),
            Position::new(bottom, right.saturating_sub(1)),
            VisualKind::Block,
        ),
    };

    let mut outcome = Outcome::at(end);
    outcome.selection = Some((start, end));
    if ctx.mode.visual_kind() != Some(kind) {
        outcome.transition = Some(Transition::EnterVisual(kind));
    }
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Immediate actions
// ---------------------------------------------------------------------------

fn immediate(
    ctx: &ExecContext<'_>,
    action: Action,
    count: Option<usize>,
    register: Option<char>,
) -> Result<Outcome, ExecError> {
    let text = ctx.text;
    let n = count.unwrap_or(1).max(1);
    let pos = ctx.pos();
    let len = ctx.content_len(pos.line);

    match action {
        Action::DeleteChar => {
            let start = pos.col.min(len);
            let end = start.saturating_add(n).min(len);
            let range = Range::new(Position::new(pos.line, start), Position::new(pos.line, end));
            delete(text, Span::Chars(range), register)
        }
        Action::DeleteCharBefore => {
            let end = pos.col.min(len);
            let range = Range::new(
                Position::new(pos.line, end.saturating_sub(n)),
                Position::new(pos.line, end),
            );
            delete(text, Span::Chars(range), register)
        }
        Action::PasteAfter => paste(ctx, register, n, true),
        Action::PasteBefore => paste(ctx, register, n, false),
        Action::ReplaceChar(ch) => {
            let end = pos.col.saturating_add(n);
            if end > len {
                return Err(ExecError::NoMatch);
            }
            let range = Range::new(pos, Position::new(pos.line, end));
            let edit = Edit::new(range, std::iter::repeat_n(ch, n).collect());
            Ok(Outcome::at(Position::new(pos.line, end - 1)).with_edits(vec![edit]))
        }
        Action::JoinLines => join_lines(text, pos.line, n.max(2)),
        Action::ToggleCaseChar => {
            if pos.col >= len {
                return Err(ExecError::EmptySpan);
            }
            let end = Position::new(pos.line, pos.col.saturating_add(n).min(len));
            let range = Range::new(pos, end);
            let mut outcome = recase(text, Span::Chars(range), Case::Toggle)?;
            outcome.cursor = Some(Cursor::at(end));
            Ok(outcome)
        }
        Action::Insert(at) => Ok(insert(ctx, at)),
        Action::Visual(kind) => Ok(Outcome::default().with_transition(Transition::EnterVisual(kind))),
        Action::SwapAnchor => {
            let mut selection = ctx.selection.ok_or(ExecError::NoSelection)?;
            let end = selection.swap();
            let mut outcome = Outcome::at(end);
            outcome.selection = Some((selection.start, selection.end));
            Ok(outcome)
        }
        Action::Undo => Ok(Outcome {
            host: Some(HostRequest::Undo(n)),
            ..Outcome::default()
        }),
        Action::Redo => Ok(Outcome {
            host: Some(HostRequest::Redo(n)),
            ..Outcome::default()
        }),
        Action::DeleteToLineEnd
        | Action::ChangeToLineEnd
        | Action::YankLine
        | Action::Substitute
        | Action::SubstituteLine => {
            let (operator, motion) = action.expansion().ok_or(ExecError::NoMatch)?;
            let (span, _) =
                motion::operator_span(text, ctx.cursor, operator, motion, count, ctx.last_find)?;
            apply_operator(ctx, operator, span, register)
        }
    }
}

fn insert(ctx: &ExecContext<'_>, at: InsertAt) -> Outcome {
    let pos = ctx.pos();
    let len = ctx.content_len(pos.line);
    let outcome = match at {
        InsertAt::Cursor => Outcome::at(pos),
        InsertAt::AfterCursor => Outcome::at(Position::new(pos.line, (pos.col + 1).min(len))),
        InsertAt::LineStart => Outcome::at(Position::new(pos.line, ctx.text.first_non_blank(pos.line))),
        InsertAt::LineEnd => Outcome::at(Position::new(pos.line, len)),
        InsertAt::LineBelow => Outcome::at(Position::new(pos.line + 1, 0)).with_edits(vec![
            Edit::insert(Position::new(pos.line, len), "\n".to_string()),
        ]),
        InsertAt::LineAbove => Outcome::at(Position::new(pos.line, 0)).with_edits(vec![
            Edit::insert(Position::new(pos.line, 0), "\n".to_string()),
        ]),
    };
    outcome.with_transition(Transition::EnterInsert)
}

// ---------------------------------------------------------------------------
// Paste
// ---------------------------------------------------------------------------

fn paste(
    ctx: &ExecContext<'_>,
    register: Option<char>,
    count: usize,
    after: bool,
) -> Result<Outcome, ExecError> {
    let reg = ctx
        .registers
        .register(register)
        .filter(|r| !r.is_empty())
        .ok_or(ExecError::EmptyRegister)?;
    Ok(match reg.kind() {
        RegisterKind::Char => paste_chars(ctx, reg.text(), count, after),
        RegisterKind::Line => paste_lines(ctx, reg.text(), count, after),
        RegisterKind::Block => paste_block(ctx, reg.text(), count, after),
    })
}

/// Column a char or block paste goes in: after the cursor char for `p`,
/// at the cursor for `P`.
fn paste_col(ctx: &ExecContext<'_>, after: bool) -> usize {
    let pos = ctx.pos();
    let len = ctx.content_len(pos.line);
    if after && len > 0 {
        (pos.col + 1).min(len)
    } else {
        pos.col.min(len)
    }
}

/// Inline. The cursor ends on the last pasted char, or at the start of the
/// paste when it spans lines.
fn paste_chars(ctx: &ExecContext<'_>, content: &str, count: usize, after: bool) -> Outcome {
    let line = ctx.pos().line;
    let at = Position::new(line, paste_col(ctx, after));
    let body = content.repeat(count);
    let cursor = if body.contains('\n') {
        at
    } else {
        Position::new(line, at.col + body.chars().count().saturating_sub(1))
    };
    Outcome::at(cursor).with_edits(vec![Edit::insert(at, body)])
}

/// On new lines below (`p`) or above (`P`). The cursor ends on the first
/// non-blank of the first pasted line.
fn paste_lines(ctx: &ExecContext<'_>, content: &str, count: usize, after: bool) -> Outcome {
    let text = ctx.text;
    let line = ctx.pos().line;
    let mut unit = content.to_string();
    if !unit.ends_with('\n') {
        unit.push('\n');
    }
    let body = unit.repeat(count);
    let indent = body.chars().take_while(|ch| *ch == ' ' || *ch == '\t').count();

    let target = if after { line + 1 } else { line };
    let edit = if target < text.line_count() {
        Edit::insert(Position::new(target, 0), body)
    } else {
        // Below the last line: there is no line break to insert after.
        let last = text.line_count() - 1;
        let mut appended = String::from("\n");
        appended.push_str(body.strip_suffix('\n').unwrap_or(&body));
        Edit::insert(Position::new(last, ctx.content_len(last)), appended)
    };
    Outcome::at(Position::new(target, indent)).with_edits(vec![edit])
}

/// One register row per line, starting at the cursor line and padding
/// short lines with spaces. Rows past the end of the text become new
/// lines. Edits run top-down since none of them shifts a later row.
fn paste_block(ctx: &ExecContext<'_>, content: &str, count: usize, after: bool) -> Outcome {
    let text = ctx.text;
    let top = ctx.pos().line;
    let col = paste_col(ctx, after);
    let rows: Vec<&str> = content.split('\n').collect();
    let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);

    let mut edits = Vec::with_capacity(rows.len());
    let mut prev_len = 0;
    for (i, row) in rows.iter().enumerate() {
        let line = top + i;
        let mut piece = String::new();
        for _ in 0..count {
            piece.push_str(row);
            piece.extend(std::iter::repeat_n(' ', width - row.chars().count()));
        }

        // `prev_len` tracks the length of the line above after its edit,
        // which is where an appended row attaches.
        if line < text.line_count() {
            let len = ctx.content_len(line);
            if col >= len {
                let piece = piece.trim_end_matches(' ');
                let mut fill: String = std::iter::repeat_n(' ', col - len).collect();
                fill.push_str(piece);
                prev_len = len + fill.chars().count();
                edits.push(Edit::insert(Position::new(line, len), fill));
            } else {
                prev_len = len + piece.chars().count();
                edits.push(Edit::insert(Position::new(line, col), piece));
            }
        } else {
            let piece = piece.trim_end_matches(' ');
            let mut new_line = String::from("\n");
            new_line.extend(std::iter::repeat_n(' ', col));
            new_line.push_str(piece);
            edits.push(Edit::insert(Position::new(line - 1, prev_len), new_line));
            prev_len = col + piece.chars().count();
        }
    }
    Outcome::at(Position::new(top, col)).with_edits(edits)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
