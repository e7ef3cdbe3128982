//! Atlas client error types

use cloudstate_core::RemoteFailure;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("Environment variable not set: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No route registered for resource type: {0}")]
    UnknownRoute(String),

    #[error("Missing path parameter `{param}` for {resource_type}")]
    MissingParam {
        resource_type: String,
        param: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AtlasError>;

impl From<AtlasError> for RemoteFailure {
    fn from(err: AtlasError) -> Self {
        match err {
            AtlasError::Http(e) => RemoteFailure::Transport(e.to_string()),
            AtlasError::JsonError(e) => {
                RemoteFailure::Transport(format!("invalid response body: {}", e))
            }
            other => RemoteFailure::InvalidRequest(other.to_string()),
        }
    }
}
