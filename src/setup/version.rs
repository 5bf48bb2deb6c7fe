//! `config_version` stamping.
//!
//! The first line of `vortex.toml` records which release wrote it. Older stamps
//! (or a missing stamp) are replaced with the running version.

use anyhow::anyhow;
use regex::Regex;
use std::path::Path;

/// Current application version from Cargo.toml
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The `config_version = "X.Y.Z"` line for the running binary.
pub fn version_line() -> String {
    format!(r#"config_version = "{CURRENT_VERSION}""#)
}

/// Parses `major.minor.patch` into a comparable tuple.
fn parse_version(version: &str) -> anyhow::Result<(u32, u32, u32)> {
    let mut parts = version.trim().split('.').map(str::parse::<u32>);
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(Ok(major)), Some(Ok(minor)), Some(Ok(patch)), None) => Ok((major, minor, patch)),
        _ => Err(anyhow!(
            "Invalid version format: '{version}'. Expected 'major.minor.patch'"
        )),
    }
}

/// Reads the stamp from the first line of the file, if present.
fn read_stamp(content: &str) -> anyhow::Result<Option<String>> {
    let regex = Regex::new(r#"^\s*config_version\s*=\s*"([^"]+)""#)?;
    Ok(content
        .lines()
        .next()
        .and_then(|line| regex.captures(line))
        .map(|caps| caps[1].to_string()))
}

/// Returns the previous version when the file needs restamping.
///
/// `None` means the stamp matches (or is newer than) the running binary.
pub fn stale_version(config_path: &Path) -> anyhow::Result<Option<String>> {
    let content = std::fs::read_to_string(config_path)?;
    let Some(stamp) = read_stamp(&content)? else {
        return Ok(Some("unknown (unversioned config)".to_string()));
    };

    let found = parse_version(&stamp)?;
    let current = parse_version(CURRENT_VERSION)?;
    if found > current {
        tracing::warn!("Config version {stamp} is newer than app version {CURRENT_VERSION}");
    }
    Ok((found < current).then_some(stamp))
}

/// Rewrites the file with the current stamp as its first line.
pub fn stamp_current_version(config_path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(config_path)?;
    let body: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim_start().starts_with("config_version"))
        .collect();

    let new_content = if body.is_empty() {
        version_line()
    } else {
        format!("{}\n{}", version_line(), body.join("\n"))
    };
    std::fs::write(config_path, new_content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_orders_versions() {
        assert_eq!(parse_version("0.1.0").unwrap(), (0, 1, 0));
        assert!(parse_version("0.0.9").unwrap() < parse_version("0.1.0").unwrap());
        assert!(parse_version("0.1").is_err());
        assert!(parse_version("0.1.0.2").is_err());
        assert!(parse_version("latest").is_err());
    }

    #[test]
    fn stamp_must_be_on_first_line() {
        assert_eq!(
            read_stamp("config_version = \"1.2.3\"\n[api]").unwrap(),
            Some("1.2.3".to_string())
        );
        assert_eq!(read_stamp("# config_version = \"1.2.3\"").unwrap(), None);
        assert_eq!(read_stamp("[api]\nconfig_version = \"1.2.3\"").unwrap(), None);
    }

    #[test]
    fn unversioned_file_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vortex.toml");
        std::fs::write(&path, "[api]\n").unwrap();
        assert!(stale_version(&path).unwrap().is_some());

        stamp_current_version(&path).unwrap();
        assert_eq!(stale_version(&path).unwrap(), None);
    }
}
