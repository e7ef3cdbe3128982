pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable pointing directly at a settings file
pub const CONFIG_PATH_ENV: &str = "CLOUDSTATE_CONFIG_PATH";

const SETTINGS_CANDIDATES: [&str; 2] = ["cloudstate.local.yaml", "cloudstate.yaml"];

/// `~/.config/cloudstate/cloudstate.yaml`, if the platform has a config
/// directory
pub fn global_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cloudstate").join("cloudstate.yaml"))
}

/// Locate the settings file.
///
/// Search order:
/// 1. `CLOUDSTATE_CONFIG_PATH`
/// 2. current directory: `cloudstate.local.yaml`, `cloudstate.yaml`
/// 3. `./.cloudstate/` with the same names
/// 4. `~/.config/cloudstate/cloudstate.yaml`
pub fn find_settings_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;
    if let Some(path) = first_existing(&current_dir) {
        return Ok(path);
    }

    let project_dir = current_dir.join(".cloudstate");
    if project_dir.is_dir() {
        if let Some(path) = first_existing(&project_dir) {
            return Ok(path);
        }
    }

    if let Some(global) = global_settings_path().filter(|path| path.exists()) {
        return Ok(global);
    }

    Err(ConfigError::SettingsFileNotFound)
}

fn first_existing(dir: &Path) -> Option<PathBuf> {
    SETTINGS_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Connection settings for the Atlas API.
///
/// Every field is optional; unset values fall back to the client defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub base_url: Option<String>,
    pub access_token: Option<String>,
    pub api_version: Option<String>,
    pub timeout_secs: Option<u64>,
    pub items_per_page: Option<u32>,
}

impl Settings {
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the discovered settings file (if any) and apply environment
    /// overrides
    pub fn load() -> Result<Self> {
        let mut settings = match find_settings_file() {
            Ok(path) => Self::from_file(&path)?,
            Err(ConfigError::SettingsFileNotFound) => Self::default(),
            Err(e) => return Err(e),
        };
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// `ATLAS_BASE_URL`, `ATLAS_ACCESS_TOKEN` and `ATLAS_API_VERSION` win
    /// over file values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("ATLAS_BASE_URL") {
            self.base_url = Some(value);
        }
        if let Ok(value) = std::env::var("ATLAS_ACCESS_TOKEN") {
            self.access_token = Some(value);
        }
        if let Ok(value) = std::env::var("ATLAS_API_VERSION") {
            self.api_version = Some(value);
        }
    }
}
