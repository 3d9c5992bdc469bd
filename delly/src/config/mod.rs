//! Configuration store.
//!
//! A TOML file holding the API credentials under a `[dell]` table:
//!
//! ```toml
//! [dell]
//! client_id = ""
//! client_secret = ""
//! ```
//!
//! The file lives in the platform config directory (`dell-lookup/config.toml`)
//! unless `DELLY_CONFIG_DIR` points elsewhere, and is created with default
//! values the first time it is read.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{ConfigError, ConfigResult};
use crate::logs::Logger;

/// Application directory name under the platform config dir
const APP_DIR: &str = "dell-lookup";

const CONFIG_FILE: &str = "config.toml";

/// Overrides the config directory
pub const CONFIG_DIR_ENV: &str = "DELLY_CONFIG_DIR";

/// Editor used when `EDITOR` is unset
const DEFAULT_EDITOR: &str = "vim";

/// Credentials table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DellConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

/// Whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub dell: DellConfig,
}

impl AppConfig {
    /// Copy with both credentials masked, for display
    pub fn masked(&self) -> Self {
        Self {
            dell: DellConfig {
                client_id: mask_secret(&self.dell.client_id),
                client_secret: mask_secret(&self.dell.client_secret),
            },
        }
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string(self)?)
    }
}

/// `****` followed by the last 4 characters; empty stays empty.
pub fn mask_secret(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("****{}", tail)
}

/// Reads and writes the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
    log: Logger,
}

impl ConfigStore {
    /// Store rooted at an explicit directory
    pub fn new(dir: impl Into<PathBuf>, log: Logger) -> Self {
        Self { dir: dir.into(), log }
    }

    /// Store at `DELLY_CONFIG_DIR` or the platform config directory
    pub fn default_location(log: Logger) -> ConfigResult<Self> {
        if let Ok(dir) = env::var(CONFIG_DIR_ENV) {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                return Ok(Self::new(trimmed, log));
            }
        }

        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::new(base.join(APP_DIR), log))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.dir.join(format!("{}.backup", CONFIG_FILE))
    }

    fn ensure_dir(&self) -> ConfigResult<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Load the configuration, writing defaults first if the file is absent.
    ///
    /// A malformed file is reported and defaults are returned.
    pub fn load(&self) -> ConfigResult<AppConfig> {
        let path = self.path();
        if !path.exists() {
            let config = AppConfig::default();
            self.save(&config)?;
            return Ok(config);
        }

        let content = fs::read_to_string(&path)?;
        match toml::from_str::<AppConfig>(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                self.log.error(format!("Error loading config: {}", e));
                Ok(AppConfig::default())
            }
        }
    }

    pub fn save(&self, config: &AppConfig) -> ConfigResult<()> {
        self.ensure_dir()?;
        fs::write(self.path(), config.to_toml()?)?;
        Ok(())
    }

    /// Masked TOML rendering of the current configuration
    pub fn show(&self) -> ConfigResult<String> {
        self.load()?.masked().to_toml()
    }

    /// Open the file in `$EDITOR` (default `vim`) and wait for it to exit.
    pub fn edit(&self) -> ConfigResult<()> {
        if !self.path().exists() {
            self.save(&AppConfig::default())?;
        }

        let editor = env::var("EDITOR")
            .ok()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EDITOR.to_string());

        let status = Command::new(&editor)
            .arg(self.path())
            .status()
            .map_err(|e| {
                ConfigError::Editor(format!(
                    "Editor '{}' not found ({}). Set the EDITOR environment variable to your preferred editor.",
                    editor, e
                ))
            })?;

        if !status.success() {
            return Err(ConfigError::Editor(format!("'{}' exited with {}", editor, status)));
        }
        Ok(())
    }

    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&AppConfig::default())?;
        self.log.success("Configuration reset to defaults.");
        Ok(())
    }

    /// Copy the config file to `config.toml.backup`.
    ///
    /// Returns `None` (with a warning) when there is nothing to back up.
    pub fn backup(&self) -> ConfigResult<Option<PathBuf>> {
        let path = self.path();
        if !path.exists() {
            self.log.warning("No configuration file exists to backup.");
            return Ok(None);
        }

        let backup = self.backup_path();
        fs::copy(&path, &backup)?;
        self.log.success(format!("Backup created: {}", backup.display()));
        Ok(Some(backup))
    }

    /// Open the config directory in the system file browser
    pub fn browse(&self) -> ConfigResult<()> {
        self.ensure_dir()?;

        let opener = if cfg!(target_os = "windows") {
            "explorer"
        } else if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };

        let status = Command::new(opener)
            .arg(&self.dir)
            .status()
            .map_err(|e| ConfigError::Browser(format!("{}: {}", opener, e)))?;

        // explorer.exe reports failure even when it opens the folder
        if !status.success() && !cfg!(target_os = "windows") {
            return Err(ConfigError::Browser(format!("'{}' exited with {}", opener, status)));
        }
        Ok(())
    }
}
