//! Well-known locations used by vortex.
//!
//! Follows the XDG layout that most terminal tools use:
//! - config: `~/.config/vortex/vortex.toml`
//! - data:   `~/.local/share/vortex/` (history database, session)
//! - logs:   `$XDG_STATE_HOME/vortex` or `~/.local/state/vortex`

use anyhow::anyhow;
use std::path::PathBuf;

const APP_DIR: &str = "vortex";

fn home_dir() -> anyhow::Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))
}

/// Directory holding `vortex.toml`.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    Ok(home_dir()?.join(".config").join(APP_DIR))
}

/// Path to the configuration file. The file itself may not exist yet.
pub fn config_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("vortex.toml"))
}

/// Directory holding the SQLite database and the session file, created on demand.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the directory cannot be created
pub fn data_dir() -> anyhow::Result<PathBuf> {
    let dir = home_dir()?.join(".local").join("share").join(APP_DIR);
    std::fs::create_dir_all(&dir)
        .map_err(|e| anyhow!("Failed to create data directory {}: {e}", dir.display()))?;
    Ok(dir)
}

/// Path to the SQLite database shared by the history and account stores.
pub fn database_path() -> anyhow::Result<PathBuf> {
    Ok(data_dir()?.join("vortex.db"))
}

/// Log directory. Prefers `XDG_STATE_HOME` when set.
pub fn log_dir() -> anyhow::Result<PathBuf> {
    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg_state).join(APP_DIR));
    }
    Ok(home_dir()?.join(".local").join("state").join(APP_DIR))
}
