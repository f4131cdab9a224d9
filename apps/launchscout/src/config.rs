//! CLI configuration.
//!
//! Configuration is stored as TOML:
//! - Linux/macOS: `~/.config/launchscout/config.toml`
//! - Windows: `%APPDATA%/launchscout/config.toml`
//!
//! Every field is optional; command-line flags take precedence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default target OS when `--os` is not given.
    #[serde(default)]
    pub os: Option<String>,

    /// Default target architecture when `--arch` is not given.
    #[serde(default)]
    pub arch: Option<String>,

    /// Signature table replacing the built-in one.
    #[serde(default)]
    pub signatures: Option<PathBuf>,

    /// Never touch permissions, only report.
    #[serde(default)]
    pub dry_run: bool,
}

impl Config {
    /// Loads `explicit`, or the per-user file if present, or defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = config_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata).join("launchscout").join("config.toml")
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home)
            .join(".config")
            .join("launchscout")
            .join("config.toml")
    }
}
