use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Settings file not found. Looked in:\n\
        - current directory: cloudstate.local.yaml, cloudstate.yaml\n\
        - ./.cloudstate/ directory\n\
        - ~/.config/cloudstate/cloudstate.yaml\n\
        Set CLOUDSTATE_CONFIG_PATH to point at a file directly"
    )]
    SettingsFileNotFound,

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid settings: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
