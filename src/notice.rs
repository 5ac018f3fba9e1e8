//! Terminal implementations of the user-interaction seams.
//!
//! Alerts go to **stderr** so stdout stays parseable for scripts: one plain
//! line per notice in human mode, one JSON object per line in JSON mode.
//! Confirmation reads a `y`/`n` answer from stdin.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use docqa_core::notify::{AutoConfirm, Confirm, Notice, Notifier};

/// Human-friendly alerts on stderr: `"Error uploading b.pdf: unsupported encoding"`.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, notice: Notice) {
        let line = format!("{}\n", notice.message());
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable alerts: one JSON object per line on stderr.
pub struct JsonNotifier;

impl Notifier for JsonNotifier {
    fn alert(&self, notice: Notice) {
        let mut obj = match serde_json::to_value(&notice) {
            Ok(v) => v,
            Err(_) => return,
        };
        if let Some(map) = obj.as_object_mut() {
            map.insert("message".to_string(), notice.message().into());
        }
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// Blocking `[y/N]` prompt on stdin. Anything but `y`/`yes` declines,
/// including end of input.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        match prompt_line(&format!("{} [y/N] ", prompt)) {
            Ok(Some(answer)) => is_yes(&answer),
            Ok(None) | Err(_) => false,
        }
    }
}

/// Write `prompt` to stderr and read one line from stdin. `None` at end of
/// input. The read runs in `block_in_place` so a runtime worker can hand
/// its other tasks off while it waits.
pub fn prompt_line(prompt: &str) -> io::Result<Option<String>> {
    tokio::task::block_in_place(|| {
        {
            let mut err = io::stderr().lock();
            let _ = write!(err, "{}", prompt);
            let _ = err.flush();
        }
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    })
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Output mode for the CLI: human text or JSON.
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn notifier(&self) -> Arc<dyn Notifier> {
        match self {
            OutputFormat::Text => Arc::new(StderrNotifier),
            OutputFormat::Json => Arc::new(JsonNotifier),
        }
    }
}

/// Pick the confirmation source: `--yes` answers every prompt, otherwise
/// ask on stdin when it is a terminal and decline when it is not.
pub fn confirmer(assume_yes: bool) -> Arc<dyn Confirm> {
    if assume_yes {
        Arc::new(AutoConfirm(true))
    } else if atty::is(atty::Stream::Stdin) {
        Arc::new(StdinConfirm)
    } else {
        Arc::new(AutoConfirm(false))
    }
}
