//! Configuration file management for vortex.
//!
//! This module handles loading application configuration from TOML files.
//! Every section and key has a default, so a partial file (or a file that only
//! carries `config_version`) is valid.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::paths;

/// Conversion service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Endpoint receiving `POST {"video_url": ...}` and answering with the audio payload
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    "https://vortex-mp3-downloader-api-production.up.railway.app/download-mp3".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

/// Local file delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory where finished files are saved. `None` means the user's Downloads folder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Filename used when the service does not send a usable `Content-Disposition`
    #[serde(default = "default_filename")]
    pub default_filename: String,
}

fn default_filename() -> String {
    "audio.mp3".to_string()
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            default_filename: default_filename(),
        }
    }
}

/// Video platforms accepted as submission sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformsConfig {
    /// Bare host names; `www.` variants are accepted implicitly
    #[serde(default = "default_allowed_hosts")]
    pub allowed_hosts: Vec<String>,
}

fn default_allowed_hosts() -> Vec<String> {
    vec!["youtube.com".to_string(), "youtu.be".to_string()]
}

impl Default for PlatformsConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: default_allowed_hosts(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VortexConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub platforms: PlatformsConfig,
}

impl VortexConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file exists but cannot be read
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = paths::config_path()?;
        if !config_path.exists() {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    /// Loads configuration from an explicit path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read {}: {e}", path.display()))?;
        Self::parse(&content).map_err(|e| anyhow!("Invalid config {}: {e}", path.display()))
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Directory finished downloads are written to.
    ///
    /// Uses `download.output_dir` when set, otherwise the platform Downloads folder,
    /// otherwise `~/Downloads`.
    ///
    /// # Errors
    /// - If no home directory can be determined for the fallback
    pub fn output_dir(&self) -> anyhow::Result<PathBuf> {
        if let Some(dir) = &self.download.output_dir {
            return Ok(dir.clone());
        }
        if let Some(dir) = dirs::download_dir() {
            return Ok(dir);
        }
        dirs::home_dir()
            .map(|home| home.join("Downloads"))
            .ok_or_else(|| anyhow!("Could not determine a download directory"))
    }
}
