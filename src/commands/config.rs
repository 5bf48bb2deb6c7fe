//! Configuration file editor command.
//!
//! Opens `vortex.toml` in the user's preferred editor, creating it from the
//! default template first if needed.

use std::process::Command;

use crate::config::{paths, VortexConfig};
use crate::setup;

/// Opens the vortex configuration file in the user's preferred editor.
///
/// The edited file is parsed afterwards so mistakes are reported right away.
///
/// # Errors
/// - If no editor can be found or executed
/// - If the edited file is not valid configuration
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = paths::config_path()?;
    setup::ensure_config(&config_path)?;

    tracing::info!("Opening config file: {}", config_path.display());

    let editor = find_editor()?;
    tracing::debug!("Using editor: {}", editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to open editor '{editor}': {e}. Make sure the editor is installed and accessible."
            )
        })?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    VortexConfig::load_from(&config_path)?;
    tracing::info!("Config file edited successfully");
    Ok(())
}

/// Finds the editor to use: $VISUAL, then $EDITOR, then nano, then vi.
fn find_editor() -> anyhow::Result<String> {
    let from_env = ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|editor| !editor.trim().is_empty());
    if let Some(editor) = from_env {
        return Ok(editor);
    }

    ["nano", "vi"]
        .iter()
        .find(|editor| is_editor_available(editor))
        .map(|editor| editor.to_string())
        .ok_or_else(|| anyhow::anyhow!("No editor found. Please set the $EDITOR environment variable."))
}

/// Checks if an editor is available in the system PATH.
fn is_editor_available(editor: &str) -> bool {
    Command::new("which")
        .arg(editor)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
