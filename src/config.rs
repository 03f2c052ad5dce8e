//! Configuration for piforge.
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - User configuration (~/.config/piforge/config.toml)
//! - Project configuration (./piforge.toml)
//! - Environment variables and command-line arguments (applied by the CLI)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote target settings
    pub target: TargetConfig,

    /// Privilege escalation settings
    pub escalation: EscalationConfig,

    /// Dotfiles task settings
    pub dotfiles: DotfilesConfig,
}

/// Remote target settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Target host address
    pub host: Option<String>,

    /// SSH port
    pub port: u16,

    /// Login user
    pub user: String,

    /// SSH identity file (supports ~ expansion)
    pub identity_file: Option<String>,

    /// Connection timeout in seconds
    pub connect_timeout: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: 22,
            user: "pi".to_string(),
            identity_file: None,
            connect_timeout: 30,
        }
    }
}

/// Privilege escalation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    /// Escalation method (sudo, su, doas)
    pub method: String,

    /// User to escalate to
    pub user: String,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            method: "sudo".to_string(),
            user: "root".to_string(),
        }
    }
}

/// Dotfiles task settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DotfilesConfig {
    /// Git repository to clone the dotfiles from
    pub repo: String,

    /// Files to copy from the repository into the home directory
    pub files: Vec<String>,
}

impl Default for DotfilesConfig {
    fn default() -> Self {
        Self {
            repo: "https://github.com/moopet/dotfiles.git".to_string(),
            files: vec![
                ".vimrc".to_string(),
                ".ackrc".to_string(),
                ".htoprc".to_string(),
                ".gitignore".to_string(),
                ".gitconfig".to_string(),
                // patched font for vim-powerline
                ".fonts".to_string(),
                ".tmux.conf".to_string(),
            ],
        }
    }
}

impl Config {
    /// Load configuration, merging defaults with the first config file found.
    ///
    /// An explicitly given path must exist and parse; the search locations
    /// (./piforge.toml, then the user config directory) are optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for path in Self::search_paths() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("piforge.toml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("piforge/config.toml"));
        }
        paths
    }

    /// The identity file with `~` expanded, if configured.
    pub fn identity_path(&self) -> Option<PathBuf> {
        self.target
            .identity_file
            .as_deref()
            .map(|raw| PathBuf::from(shellexpand::tilde(raw).into_owned()))
    }
}
