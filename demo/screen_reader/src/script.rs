//! Line-driven stand-in for the platform accessibility and keyboard hooks.
//!
//! Each stdin line is one notification:
//! - `focus <control type>[|<name>]`
//! - `key <identifier>` (e.g. `key a`, `key caps lock`)
//! - `stale` (a focus target that vanished before it could be read)
//!
//! Blank lines and lines starting with `#` are ignored.

use narrator_core::{
    AccessibleElement, FocusEvent, KeyEvent, LocalEventSource, NarratorError, Result,
};
use std::io::BufRead;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    Focus(FocusEvent),
    Key(KeyEvent),
    Stale,
}

struct VanishedElement;

impl AccessibleElement for VanishedElement {
    fn control_type(&self) -> Result<String> {
        Err(NarratorError::TransientAttribute(
            "focus target no longer exists".into(),
        ))
    }

    fn name(&self) -> Result<Option<String>> {
        Err(NarratorError::TransientAttribute(
            "focus target no longer exists".into(),
        ))
    }
}

pub fn parse_line(line: &str) -> Option<ScriptCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let (cmd, rest) = match trimmed.split_once(' ') {
        Some((c, r)) => (c, r.trim()),
        None => (trimmed, ""),
    };
    match cmd {
        "focus" => {
            let (control_type, name) = match rest.split_once('|') {
                Some((t, n)) => (t.trim(), n.trim()),
                None => (rest, ""),
            };
            Some(ScriptCommand::Focus(FocusEvent::new(control_type, name)))
        }
        "key" if !rest.is_empty() => Some(ScriptCommand::Key(KeyEvent::new(rest))),
        "stale" => Some(ScriptCommand::Stale),
        _ => {
            warn!(target: "screen_reader", line = %trimmed, "Unrecognized input line");
            None
        }
    }
}

/// Read stdin on a dedicated thread and feed the source.
///
/// The thread is detached; a blocking stdin read must not hold up shutdown.
pub fn spawn_stdin_reader(source: Arc<LocalEventSource>) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin-events".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(l) => l,
                    Err(e) => {
                        warn!(target: "screen_reader", error = %e, "stdin read failed");
                        break;
                    }
                };
                match parse_line(&line) {
                    Some(ScriptCommand::Focus(ev)) => {
                        source.emit_focus(Arc::new(ev));
                    }
                    Some(ScriptCommand::Key(ev)) => {
                        source.emit_key(ev);
                    }
                    Some(ScriptCommand::Stale) => {
                        source.emit_focus(Arc::new(VanishedElement));
                    }
                    None => debug!(target: "screen_reader", "Skipped input line"),
                }
            }
            info!(target: "screen_reader", "Input closed; waiting for Ctrl+C");
        })
}
