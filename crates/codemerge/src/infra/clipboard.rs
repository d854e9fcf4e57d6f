//! Clipboard integration for merged output.

use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};

/// Which mechanism ended up holding the copied text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardBackend {
    /// The native clipboard via arboard.
    Native,
    /// A platform helper program such as `pbcopy` or `wl-copy`.
    Command(&'static str),
}

impl fmt::Display for ClipboardBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardBackend::Native => f.write_str("system clipboard"),
            ClipboardBackend::Command(program) => write!(f, "{program}"),
        }
    }
}

/// System clipboard with shell fallbacks for headless sessions.
pub struct Clipboard {
    native: Option<arboard::Clipboard>,
}

impl Clipboard {
    /// Connect to the native clipboard lazily; failure only means fallbacks are used.
    pub fn new() -> Self {
        Self {
            native: arboard::Clipboard::new().ok(),
        }
    }

    /// Place `text` on the clipboard, returning the backend that accepted it.
    pub fn copy(&mut self, text: &str) -> Result<ClipboardBackend> {
        if let Some(native) = self.native.as_mut() {
            match native.set_text(text.to_owned()) {
                Ok(()) => return Ok(ClipboardBackend::Native),
                Err(err) => {
                    tracing::debug!(error = %err, "native clipboard rejected text");
                    self.native = None;
                }
            }
        }

        for command in fallback_commands() {
            match pipe_to_command(command, text) {
                Ok(()) => return Ok(ClipboardBackend::Command(command[0])),
                Err(err) => tracing::debug!(program = command[0], error = %err, "clipboard helper failed"),
            }
        }

        Err(anyhow!("no clipboard backend accepted the merged text"))
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

fn pipe_to_command(command: &[&str], text: &str) -> Result<()> {
    let (program, args) = command
        .split_first()
        .context("clipboard command missing program")?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn clipboard command: {program}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .context("failed to write clipboard contents")?;
    }

    let status = child
        .wait()
        .with_context(|| format!("clipboard command did not exit cleanly: {program}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("clipboard command exited with status {status}"))
    }
}

#[cfg(target_os = "macos")]
fn fallback_commands() -> &'static [&'static [&'static str]] {
    &[&["pbcopy"]]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn fallback_commands() -> &'static [&'static [&'static str]] {
    &[&["wl-copy"], &["xclip", "-selection", "clipboard"], &["xsel", "--clipboard", "--input"]]
}

#[cfg(target_os = "windows")]
fn fallback_commands() -> &'static [&'static [&'static str]] {
    &[&["clip.exe"]]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn fallback_commands() -> &'static [&'static [&'static str]] {
    &[]
}
