// SPDX-License-Identifier: MIT
//
// Key notation — the `<Esc>`/`<C-v>` spelling of key sequences.
//
// Plain characters stand for themselves. Angle brackets name a key and
// may carry modifier prefixes:
//
//   d2w        → d, 2, w
//   <Esc>      → Escape
//   <C-v>      → Ctrl+v
//   <S-Left>   → Shift+Left
//   <lt>       → a literal '<'
//   <Space>    → ' '
//
// Names are case-insensitive. A '<' that does not start a valid `<...>`
// group is an error rather than a silent literal, so typos in test
// fixtures surface immediately.

use thiserror::Error;

use crate::key::{KeyCode, KeyToken, Modifiers};

/// Why a notation string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    /// `<` without a closing `>`.
    #[error("unterminated key name starting at byte {0}")]
    Unterminated(usize),
    /// `<Foo>` where `Foo` is not a known key.
    #[error("unknown key name <{0}>")]
    UnknownKey(String),
    /// A modifier prefix that is not `C-`, `S-`, `A-`/`M-`, or `D-`.
    #[error("unknown modifier in <{0}>")]
    UnknownModifier(String),
}

/// Result of parsing one unit at the head of the input.
enum Parsed {
    /// A token and the number of bytes it consumed.
    Token(KeyToken, usize),
    /// The input is exhausted.
    End,
}

/// Parse a notation string into tokens.
///
/// # Errors
///
/// Returns a [`NotationError`] for unterminated or unknown `<...>` groups.
pub fn parse_keys(input: &str) -> Result<Vec<KeyToken>, NotationError> {
    let mut tokens = Vec::with_capacity(input.len());
    let mut pos = 0;
    loop {
        match parse_one(input, pos)? {
            Parsed::Token(token, consumed) => {
                tokens.push(token);
                pos += consumed;
            }
            Parsed::End => return Ok(tokens),
        }
    }
}

/// Format tokens back into notation. `parse_keys(format_keys(t)) == t`.
#[must_use]
pub fn format_keys(tokens: &[KeyToken]) -> String {
    tokens.iter().map(|t| format_token(*t)).collect()
}

fn parse_one(input: &str, pos: usize) -> Result<Parsed, NotationError> {
    let rest = &input[pos..];
    let Some(ch) = rest.chars().next() else {
        return Ok(Parsed::End);
    };
    if ch != '<' {
        return Ok(Parsed::Token(KeyToken::char(ch), ch.len_utf8()));
    }

    let close = rest.find('>').ok_or(NotationError::Unterminated(pos))?;
    // `<>` is not a group; `<>>` would be, but nobody writes that.
    if close == 1 {
        return Err(NotationError::UnknownKey(String::new()));
    }
    let inner = &rest[1..close];
    let token = parse_group(inner)?;
    Ok(Parsed::Token(token, close + 1))
}

/// Parse the inside of a `<...>` group: modifier prefixes, then a key name.
fn parse_group(inner: &str) -> Result<KeyToken, NotationError> {
    let mut modifiers = Modifiers::empty();
    let mut name = inner;

    // Modifier prefixes are single letters followed by '-'. The key name
    // itself may be a lone '-' (`<C-->`), so stop when only one char is left.
    while name.len() > 2 && name.as_bytes()[1] == b'-' {
        let flag = match name.as_bytes()[0].to_ascii_lowercase() {
            b'c' => Modifiers::CTRL,
            b's' => Modifiers::SHIFT,
            b'a' | b'm' => Modifiers::ALT,
            b'd' => Modifiers::SUPER,
            _ => return Err(NotationError::UnknownModifier(inner.to_string())),
        };
        modifiers |= flag;
        name = &name[2..];
    }

    let code = key_by_name(name).ok_or_else(|| NotationError::UnknownKey(inner.to_string()))?;
    Ok(KeyToken::new(code, modifiers))
}

fn key_by_name(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(ch));
    }

    let lower = name.to_ascii_lowercase();
    let code = match lower.as_str() {
        "esc" | "escape" => KeyCode::Escape,
        "cr" | "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "bs" | "backspace" => KeyCode::Backspace,
        "del" | "delete" => KeyCode::Delete,
        "insert" | "ins" => KeyCode::Insert,
        "space" => KeyCode::Char(' '),
        "lt" => KeyCode::Char('<'),
        "gt" => KeyCode::Char('>'),
        "bar" => KeyCode::Char('|'),
        "bslash" => KeyCode::Char('\\'),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        _ => {
            let n = lower.strip_prefix('f')?.parse::<u8>().ok()?;
            if (1..=35).contains(&n) {
                KeyCode::F(n)
            } else {
                return None;
            }
        }
    };
    Some(code)
}

/// Format a single token.
pub(crate) fn format_token(token: KeyToken) -> String {
    let name = match token.code() {
        KeyCode::Char('<') => "lt".to_string(),
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(ch) => ch.to_string(),
        KeyCode::Enter => "CR".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "BS".to_string(),
        KeyCode::Escape => "Esc".to_string(),
        KeyCode::Delete => "Del".to_string(),
        KeyCode::Insert => "Insert".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::F(n) => format!("F{n}"),
    };

    let mods = token.modifiers();
    let plain_char = matches!(token.code(), KeyCode::Char(c) if c != '<' && c != ' ');
    if mods.is_empty() && plain_char {
        return name;
    }

    let mut out = String::from("<");
    if mods.contains(Modifiers::CTRL) {
        out.push_str("C-");
    }
    if mods.contains(Modifiers::SHIFT) {
        out.push_str("S-");
    }
    if mods.contains(Modifiers::ALT) {
        out.push_str("A-");
    }
    if mods.contains(Modifiers::SUPER) {
        out.push_str("D-");
    }
    out.push_str(&name);
    out.push('>');
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn c(ch: char) -> KeyToken {
        KeyToken::char(ch)
    }

    // -- Plain characters ---------------------------------------------------

    #[test]
    fn plain_chars() {
        assert_eq!(parse_keys("d2w").unwrap(), vec![c('d'), c('2'), c('w')]);
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse_keys("").unwrap(), Vec::<KeyToken>::new());
    }

    #[test]
    fn unicode_chars() {
        assert_eq!(parse_keys("fé").unwrap(), vec![c('f'), c('é')]);
    }

    // -- Named keys ---------------------------------------------------------

    #[test]
    fn escape_and_enter() {
        assert_eq!(
            parse_keys("i<Esc><CR>").unwrap(),
            vec![c('i'), KeyToken::ESCAPE, KeyToken::named(KeyCode::Enter)]
        );
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(parse_keys("<esc>").unwrap(), vec![KeyToken::ESCAPE]);
        assert_eq!(parse_keys("<ESCAPE>").unwrap(), vec![KeyToken::ESCAPE]);
    }

    #[test]
    fn literal_specials() {
        assert_eq!(
            parse_keys("<lt><Space><gt>").unwrap(),
            vec![c('<'), c(' '), c('>')]
        );
    }

    #[test]
    fn function_keys() {
        assert_eq!(
            parse_keys("<F1><f12>").unwrap(),
            vec![
                KeyToken::named(KeyCode::F(1)),
                KeyToken::named(KeyCode::F(12))
            ]
        );
        assert!(parse_keys("<F99>").is_err());
    }

    // -- Modifiers ----------------------------------------------------------

    #[test]
    fn ctrl_chord() {
        assert_eq!(parse_keys("<C-v>").unwrap(), vec![KeyToken::ctrl('v')]);
        assert_eq!(parse_keys("<c-V>").unwrap(), vec![KeyToken::ctrl('v')]);
    }

    #[test]
    fn shift_char_folds() {
        assert_eq!(parse_keys("<S-a>").unwrap(), vec![c('A')]);
    }

    #[test]
    fn ctrl_dash() {
        assert_eq!(parse_keys("<C-->").unwrap(), vec![KeyToken::ctrl('-')]);
    }

    #[test]
    fn stacked_modifiers_on_named_key() {
        let tokens = parse_keys("<C-S-Left>").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].code(), KeyCode::Left);
        assert_eq!(tokens[0].modifiers(), Modifiers::CTRL | Modifiers::SHIFT);
    }

    // -- Errors -------------------------------------------------------------

    #[test]
    fn unterminated_group() {
        assert_eq!(parse_keys("ab<Esc"), Err(NotationError::Unterminated(2)));
    }

    #[test]
    fn unknown_name() {
        assert_eq!(
            parse_keys("<Nope>"),
            Err(NotationError::UnknownKey("Nope".into()))
        );
    }

    #[test]
    fn unknown_modifier() {
        assert_eq!(
            parse_keys("<X-a>"),
            Err(NotationError::UnknownModifier("X-a".into()))
        );
    }

    #[test]
    fn empty_group() {
        assert!(parse_keys("<>").is_err());
    }

    // -- Formatting ---------------------------------------------------------

    #[test]
    fn format_round_trips() {
        for src in ["d2w", "i<Esc>", "<C-v>jd", "<lt>x<Space>", "<S-Left>"] {
            let tokens = parse_keys(src).unwrap();
            assert_eq!(parse_keys(&format_keys(&tokens)).unwrap(), tokens);
        }
    }

    #[test]
    fn format_spelling() {
        let tokens = parse_keys("<esc><c-R><space>").unwrap();
        assert_eq!(format_keys(&tokens), "<Esc><C-r><Space>");
    }
}
