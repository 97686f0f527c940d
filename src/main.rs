// SPDX-License-Identifier: MIT
//
// n-modal — replay harness for the modal command engine.
//
// Loads text into an in-memory host, feeds it a key sequence written in key
// notation, and prints what the engine left behind:
//
//   n-modal --text 'foo bar\nbaz' --keys 'dw'
//   n-modal --file notes.txt --cursor 4:1 --set 'sw=2 et' --keys '>ip'
//
// Keys the engine passes on while in Insert mode are typed into the buffer,
// the way a host editor would. Set N_MODAL_LOG (e.g. `engine.dispatch=trace`)
// to watch the engine on stderr.
//
// Output:
//
//      1 | first line          ← buffer, 1-based line numbers
//   cursor   1:4 (offset 3)    ← 1-based, like --cursor
//   mode     NORMAL
//   pending  2d                ← only with an unfinished command
//   select   1:2 .. 1:5        ← only in Visual mode
//   reg "    char "bar"        ← non-empty registers
//   event    Undo(1)           ← UI triggers the engine fired

use std::env;
use std::fs;
use std::process;

use n_engine::{BufferView, Engine, MemoryHost, Mode, Position};
use n_input::{format_keys, parse_keys};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: n-modal (--file PATH | --text TEXT) --keys KEYS \
                     [--cursor LINE:COL] [--set OPTIONS]...";

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    File(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    source: Source,
    keys: String,
    cursor: Position,
    set: Vec<String>,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut source = None;
    let mut keys = None;
    let mut cursor = Position::ZERO;
    let mut set = Vec::new();

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let mut value = || {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{flag} needs a value"))
        };
        match flag.as_str() {
            "--file" => source = Some(Source::File(value()?)),
            // `\n` in a shell argument means a line break.
            "--text" => source = Some(Source::Text(value()?.replace("\\n", "\n"))),
            "--keys" => keys = Some(value()?),
            "--cursor" => cursor = parse_cursor(&value()?)?,
            "--set" => set.push(value()?),
            other => return Err(format!("unknown argument {other:?}")),
        }
    }

    Ok(Args {
        source: source.ok_or("one of --file or --text is required")?,
        keys: keys.ok_or("--keys is required")?,
        cursor,
        set,
    })
}

/// `LINE:COL`, both 1-based.
fn parse_cursor(arg: &str) -> Result<Position, String> {
    let bad = || format!("--cursor expects LINE:COL counting from 1, got {arg:?}");
    let (line, col) = arg.split_once(':').ok_or_else(bad)?;
    let one_based = |s: &str| {
        s.trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .ok_or_else(bad)
    };
    Ok(Position::new(one_based(line)?, one_based(col)?))
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

fn replay(args: &Args, text: &str) -> Result<Engine<MemoryHost>, String> {
    let host = MemoryHost::from_text(text).with_cursor(args.cursor);
    let mut engine = Engine::new(host);

    for set in &args.set {
        let replies = engine.set_option(set).map_err(|e| format!("--set {set}: {e}"))?;
        for reply in replies {
            println!("{reply}");
        }
    }

    let keys = parse_keys(&args.keys).map_err(|e| format!("--keys: {e}"))?;
    tracing::info!(target: "n_modal", keys = keys.len(), "replaying");
    for key in keys {
        if !engine.handle_key(key) && engine.mode() == Mode::Insert {
            engine.host_mut().type_key(key);
        }
    }
    Ok(engine)
}

fn report(engine: &Engine<MemoryHost>) -> String {
    use std::fmt::Write;

    let host = engine.host();
    let snapshot = engine.snapshot();
    let mut out = String::new();

    for (i, line) in host.lines().iter().enumerate() {
        let _ = writeln!(out, "{:>6} | {line}", i + 1);
    }
    let _ = writeln!(out, "cursor   {}", host.cursor());
    let _ = writeln!(out, "mode     {}", snapshot.mode);
    if !snapshot.pending_keys.is_empty() {
        let _ = writeln!(out, "pending  {}", format_keys(&snapshot.pending_keys));
    }
    if let Some(sel) = host.selection() {
        let _ = writeln!(out, "select   {} .. {}", sel.start, sel.end);
    }

    let registers = host.registers();
    for name in std::iter::once(None).chain(('a'..='z').map(Some)) {
        let reg = registers.get(name);
        if reg.is_empty() {
            continue;
        }
        let label = name.unwrap_or('"');
        let _ = writeln!(out, "reg {label}    {} {:?}", reg.kind(), reg.text());
    }
    for event in host.events() {
        let _ = writeln!(out, "event    {event:?}");
    }
    out
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("N_MODAL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_logging();

    let argv: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("n-modal: {e}\n{USAGE}");
            process::exit(1);
        }
    };

    let text = match &args.source {
        Source::Text(text) => text.clone(),
        Source::File(path) => match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("n-modal: {path}: {e}");
                process::exit(1);
            }
        },
    };

    match replay(&args, &text) {
        Ok(engine) => print!("{}", report(&engine)),
        Err(e) => {
            eprintln!("n-modal: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use n_engine::HostEvent;
    use pretty_assertions::assert_eq;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    fn args(text: &str, keys: &str) -> Args {
        Args {
            source: Source::Text(text.to_string()),
            keys: keys.to_string(),
            cursor: Position::ZERO,
            set: Vec::new(),
        }
    }

    // -- parse_args ---------------------------------------------------------

    #[test]
    fn parses_all_flags() {
        let parsed = parse_args(&argv(&[
            "--text", "a\\nb", "--keys", "dd", "--cursor", "2:1", "--set", "sw=2", "--set", "et",
        ]))
        .unwrap();
        assert_eq!(
            parsed,
            Args {
                source: Source::Text("a\nb".to_string()),
                keys: "dd".to_string(),
                cursor: Position::new(1, 0),
                set: vec!["sw=2".to_string(), "et".to_string()],
            }
        );
    }

    #[test]
    fn missing_and_unknown_flags_are_errors() {
        assert!(parse_args(&argv(&["--keys", "x"])).is_err());
        assert!(parse_args(&argv(&["--text", "x"])).is_err());
        assert!(parse_args(&argv(&["--text"])).is_err());
        assert!(parse_args(&argv(&["--text", "x", "--keys", "x", "--bogus"])).is_err());
        assert!(parse_cursor("3").is_err());
        assert!(parse_cursor("a:1").is_err());
        assert!(parse_cursor("0:1").is_err());
        assert_eq!(parse_cursor("2:5"), Ok(Position::new(1, 4)));
    }

    // -- replay -------------------------------------------------------------

    #[test]
    fn replays_normal_commands() {
        let engine = replay(&args("foo bar baz", "dw"), "foo bar baz").unwrap();
        assert_eq!(engine.host().lines(), vec!["bar baz"]);
        assert_eq!(engine.mode(), Mode::Normal);
    }

    #[test]
    fn typed_text_lands_in_insert_mode() {
        let engine = replay(&args("world", "ihello <Esc>"), "world").unwrap();
        assert_eq!(engine.host().lines(), vec!["hello world"]);
        assert_eq!(engine.mode(), Mode::Normal);
    }

    #[test]
    fn report_shows_pending_and_registers() {
        let engine = replay(&args("one two", "yw2d"), "one two").unwrap();
        let out = report(&engine);
        assert!(out.contains("     1 | one two\n"));
        assert!(out.contains("pending  2d\n"));
        assert!(out.contains("reg \"    char \"one \"\n"));
    }

    #[test]
    fn ui_triggers_are_reported() {
        let engine = replay(&args("x", "u"), "x").unwrap();
        assert_eq!(engine.host().events(), &[HostEvent::Undo(1)]);
        assert!(report(&engine).contains("event    Undo(1)\n"));
    }

    #[test]
    fn bad_keys_and_options_fail() {
        assert!(replay(&args("x", "<Nope"), "x").is_err());
        let mut bad = args("x", "x");
        bad.set.push("nosuchoption".to_string());
        assert!(replay(&bad, "x").is_err());
    }
}
