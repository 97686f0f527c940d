//! Engine options and `:set`-style parsing.
//!
//! | Full name    | Abbrev | Type    | Default |
//! |--------------|--------|---------|---------|
//! | `shiftwidth` | `sw`   | integer | 4       |
//! | `tabstop`    | `ts`   | integer | 4       |
//! | `expandtab`  | `et`   | bool    | true    |
//!
//! | Syntax          | Effect                        |
//! |-----------------|-------------------------------|
//! | `option`        | Enable boolean / show numeric |
//! | `nooption`      | Disable boolean               |
//! | `option!`       | Toggle boolean                |
//! | `option?`       | Query current value           |
//! | `option=N`      | Assign numeric value          |

use thiserror::Error;

/// Why a `:set` argument could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("unknown option: {0}")]
    Unknown(String),
    #[error("invalid argument: {name}={value}")]
    InvalidValue { name: String, value: String },
    #[error("option {0} is not a boolean")]
    NotBoolean(String),
}

/// A parsed `:set` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    On(String),
    Off(String),
    Toggle(String),
    Query(String),
    Assign(String, String),
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Options that change what operators do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Columns per indent level for `>` and `<`.
    pub shiftwidth: usize,
    /// Display width of a tab, used when outdenting tab-indented lines.
    pub tabstop: usize,
    /// Indent with spaces instead of a tab.
    pub expandtab: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            shiftwidth: 4,
            tabstop: 4,
            expandtab: true,
        }
    }
}

impl Options {
    /// The text one `>` adds in front of a line.
    #[must_use]
    pub fn indent_unit(&self) -> String {
        if self.expandtab {
            " ".repeat(self.shiftwidth)
        } else {
            "\t".to_string()
        }
    }

    /// Apply a whole `:set` argument string. Returns the responses to
    /// queries, in order.
    ///
    /// Arguments are applied left to right; the first bad one stops the
    /// rest and reports its error.
    ///
    /// # Errors
    ///
    /// Returns an [`OptionError`] for unknown names or bad values.
    pub fn set(&mut self, args: &str) -> Result<Vec<String>, OptionError> {
        let mut replies = Vec::new();
        for directive in parse_set(args) {
            if let Some(reply) = self.apply(&directive)? {
                replies.push(reply);
            }
        }
        Ok(replies)
    }

    fn apply(&mut self, directive: &SetDirective) -> Result<Option<String>, OptionError> {
        match directive {
            SetDirective::On(name) => self.set_bool(name, |_| true).map(|()| None),
            SetDirective::Off(name) => self.set_bool(name, |_| false).map(|()| None),
            SetDirective::Toggle(name) => self.set_bool(name, |v| !v).map(|()| None),
            SetDirective::Query(name) => self.query(name).map(Some),
            SetDirective::Assign(name, value) => {
                let invalid = || OptionError::InvalidValue {
                    name: name.clone(),
                    value: value.clone(),
                };
                let n = value
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(invalid)?;
                match canonical(name) {
                    Some("shiftwidth") => self.shiftwidth = n,
                    Some("tabstop") => self.tabstop = n,
                    Some(_) => return Err(invalid()),
                    None => return Err(OptionError::Unknown(name.clone())),
                }
                Ok(None)
            }
        }
    }

    fn set_bool(&mut self, name: &str, f: impl FnOnce(bool) -> bool) -> Result<(), OptionError> {
        match canonical(name) {
            Some("expandtab") => {
                self.expandtab = f(self.expandtab);
                Ok(())
            }
            Some(_) => Err(OptionError::NotBoolean(name.to_string())),
            None => Err(OptionError::Unknown(name.to_string())),
        }
    }

    fn query(&self, name: &str) -> Result<String, OptionError> {
        match canonical(name) {
            Some("shiftwidth") => Ok(format!("shiftwidth={}", self.shiftwidth)),
            Some("tabstop") => Ok(format!("tabstop={}", self.tabstop)),
            Some("expandtab") if self.expandtab => Ok("expandtab".to_string()),
            Some("expandtab") => Ok("noexpandtab".to_string()),
            _ => Err(OptionError::Unknown(name.to_string())),
        }
    }
}

/// Full option name for a full name or abbreviation.
fn canonical(name: &str) -> Option<&'static str> {
    match name {
        "shiftwidth" | "sw" => Some("shiftwidth"),
        "tabstop" | "ts" => Some("tabstop"),
        "expandtab" | "et" => Some("expandtab"),
        _ => None,
    }
}

fn is_bool_option(name: &str) -> bool {
    canonical(name) == Some("expandtab")
}

fn is_numeric_option(name: &str) -> bool {
    matches!(canonical(name), Some("shiftwidth" | "tabstop"))
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Split `:set` arguments into directives.
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    args.split_whitespace().map(parse_set_arg).collect()
}

/// Parse one `:set` argument.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }
    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }
    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }
    // `no` only negates a real boolean name, so `notanoption` stays unknown
    // instead of becoming Off("tanoption").
    if let Some(name) = arg.strip_prefix("no").filter(|n| is_bool_option(n)) {
        return SetDirective::Off(name.to_string());
    }
    if is_numeric_option(arg) {
        return SetDirective::Query(arg.to_string());
    }
    SetDirective::On(arg.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
