//! Clipboard utilities for vortex.
//!
//! Copies text with whichever system tool is present: pbcopy (macOS),
//! wl-copy (Wayland) or xclip (X11).

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

/// Clipboard tools in the order they are tried.
fn clipboard_tools() -> Vec<(&'static str, &'static [&'static str])> {
    let mut tools: Vec<(&'static str, &'static [&'static str])> = Vec::new();
    if cfg!(target_os = "macos") {
        tools.push(("pbcopy", &[]));
    }
    tools.push(("wl-copy", &["--type", "text/plain", "--trim-newline"]));
    tools.push(("xclip", &["-selection", "clipboard", "-in", "-quiet"]));
    tools
}

fn pipe_to(tool: &str, args: &[&str], text: &str) -> std::io::Result<()> {
    let mut child = Command::new(tool).args(args).stdin(Stdio::piped()).spawn()?;
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| std::io::Error::other("stdin not captured"))?;
    write!(stdin, "{text}")?;
    drop(stdin);
    // give the tool a moment to take ownership of the selection
    thread::sleep(Duration::from_millis(100));
    Ok(())
}

/// Copies text to the system clipboard.
///
/// Returns `false` when no clipboard tool is available so callers can tell
/// the user instead of failing.
pub fn copy_to_clipboard(text: &str) -> bool {
    for (tool, args) in clipboard_tools() {
        match pipe_to(tool, args, text) {
            Ok(()) => {
                tracing::debug!("Copied {} characters via {}", text.len(), tool);
                return true;
            }
            Err(e) => tracing::debug!("{} unavailable: {}", tool, e),
        }
    }

    tracing::warn!("No clipboard tool available");
    false
}
