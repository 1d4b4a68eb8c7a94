//! ox-resolve: drive the command dispatcher from key scripts or a terminal.
//!
//! Script mode feeds angle-bracket key notation (`"a2dw`, `ihi<Esc>`) from the
//! command line or stdin and prints how every key resolved plus the scratch
//! buffer after each command. Interactive mode reads raw terminal keys.

mod demo;
mod input;

use anyhow::{Context, Result};
use clap::Parser;
use core_actions::{Dispatcher, DispatcherSettings, FeedResult, KeyEvent, Mode, ModeTransition};
use core_config::load_from;
use core_events::{KeyCode, KeyModifiers, parse_keys};
use crossterm::event::{Event, read};
use demo::Editor;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;

const DEFAULT_TEXT: &str = "one two three\nfour five six\nseven eight nine";

#[derive(Parser, Debug)]
#[command(name = "ox-resolve", version, about = "Modal command resolution playground")]
struct Args {
    /// Key script in angle-bracket notation; read from stdin when omitted.
    keys: Vec<String>,
    /// Configuration file path (overrides discovery of `oxidized.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
    /// Directory for `ox-resolve.log`.
    #[arg(long = "log-dir", default_value = ".")]
    log_dir: PathBuf,
    /// Initial scratch buffer contents.
    #[arg(long = "text")]
    text: Option<String>,
    /// Read keys from the terminal until CTRL-C.
    #[arg(long = "interactive", short = 'i')]
    interactive: bool,
}

fn configure_logging(log_dir: &Path) -> Option<WorkerGuard> {
    let file_appender = tracing_appender::rolling::never(log_dir, "ox-resolve.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
        .ok()
        .map(|_| guard)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging(&args.log_dir);

    let config = load_from(args.config.clone())?;
    let settings = DispatcherSettings::from_config(&config)?;
    info!(
        target: "runtime.startup",
        cancel_key = %settings.cancel_key,
        max_count = settings.max_count,
        history_limit = settings.history_limit,
        "settings_loaded"
    );

    let editor = Editor::new(args.text.as_deref().unwrap_or(DEFAULT_TEXT));
    let dispatcher = demo::build(settings, &editor)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.interactive {
        interactive(&editor, &dispatcher, &mut out)
    } else if args.keys.is_empty() {
        for line in io::stdin().lock().lines() {
            script(&editor, &dispatcher, &line?, &mut out)?;
        }
        Ok(())
    } else {
        script(&editor, &dispatcher, &args.keys.join(""), &mut out)
    }
}

fn script(
    editor: &Editor,
    dispatcher: &Dispatcher,
    notation: &str,
    out: &mut impl Write,
) -> Result<()> {
    let keys = parse_keys(notation).with_context(|| format!("invalid key script {notation:?}"))?;
    for key in keys {
        let result = dispatcher.feed(key);
        report(editor, dispatcher, &key, &result, out, "\n")?;
    }
    Ok(())
}

fn interactive(editor: &Editor, dispatcher: &Dispatcher, out: &mut impl Write) -> Result<()> {
    let _raw = input::RawModeGuard::enter()?;
    write!(out, "CTRL-C quits\r\n")?;
    print_buffer(editor, out, "\r\n")?;
    loop {
        let Event::Key(event) = read()? else {
            continue;
        };
        let Some(key) = input::map_key_event(&event) else {
            continue;
        };
        if key == KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CTRL) {
            debug!(target: "runtime", "interactive_quit");
            return Ok(());
        }
        let result = dispatcher.feed(key);
        report(editor, dispatcher, &key, &result, out, "\r\n")?;
    }
}

/// Print one line for `key`, apply the outcome to the editor, and show the
/// buffer once a command finished.
fn report(
    editor: &Editor,
    dispatcher: &Dispatcher,
    key: &KeyEvent,
    result: &FeedResult,
    out: &mut impl Write,
    eol: &str,
) -> Result<()> {
    match result {
        FeedResult::CommandRan { record, transition } => {
            if let ModeTransition::Enter(mode) = transition {
                editor.set_mode(*mode);
            }
            write!(
                out,
                "{key:<8} ran {} count={:?} {}{eol}",
                record.command.name(),
                record.count,
                record.register
            )?;
        }
        FeedResult::CommandErrored { record, message } => {
            write!(out, "{key:<8} {} failed: {message}{eol}", record.command.name())?;
        }
        FeedResult::CommandCancelled => {
            editor.set_mode(Mode::Normal);
            write!(out, "{key:<8} cancelled{eol}")?;
        }
        FeedResult::NeedMoreInput => {
            let phase = dispatcher.current_phase();
            write!(out, "{key:<8} pending ({}){eol}", phase.label())?;
            return Ok(());
        }
        other => write!(out, "{key:<8} {}{eol}", other.label())?,
    }
    if let Some(message) = editor.take_error() {
        write!(out, "         error: {message}{eol}")?;
    }
    if result.is_terminal() {
        print_buffer(editor, out, eol)?;
    }
    Ok(())
}

fn print_buffer(editor: &Editor, out: &mut impl Write, eol: &str) -> Result<()> {
    write!(out, "  [{:?} at {:?}]{eol}", editor.mode(), editor.cursor())?;
    for line in editor.render() {
        write!(out, "  {line}{eol}")?;
    }
    out.flush()?;
    Ok(())
}
