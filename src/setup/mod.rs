//! First-run setup.
//!
//! Writes the default configuration file when it is missing and keeps its
//! `config_version` stamp in line with the running binary.

pub mod version;

use std::path::Path;

/// Embedded default configuration template.
const DEFAULT_CONFIG: &str = include_str!("../../environments/vortex.toml");

/// Creates the config file from the embedded template if it does not exist,
/// or restamps it if it was written by an older release.
///
/// User edits are never discarded; only the first `config_version` line is rewritten.
///
/// # Errors
/// - If the config directory cannot be created
/// - If the config file cannot be read or written
pub fn ensure_config(config_path: &Path) -> anyhow::Result<()> {
    if !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = format!("{}\n{}", version::version_line(), DEFAULT_CONFIG);
        std::fs::write(config_path, content)?;
        tracing::info!("Created default config at {}", config_path.display());
        return Ok(());
    }

    if let Some(previous) = version::stale_version(config_path)? {
        version::stamp_current_version(config_path)?;
        tracing::info!(
            "Config migrated from version {} to {}",
            previous,
            env!("CARGO_PKG_VERSION")
        );
    } else {
        tracing::debug!("Config version up to date ({})", env!("CARGO_PKG_VERSION"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_template_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vortex.toml");

        ensure_config(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(&version::version_line()));
        assert!(content.contains("[api]"));
    }

    #[test]
    fn keeps_user_edits_when_restamping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vortex.toml");
        std::fs::write(
            &path,
            "config_version = \"0.0.1\"\n[download]\ndefault_filename = \"track.mp3\"\n",
        )
        .unwrap();

        ensure_config(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(&version::version_line()));
        assert!(content.contains("default_filename = \"track.mp3\""));
        assert_eq!(content.matches("config_version").count(), 1);
    }
}
