//! Atlas connection settings

use crate::error::{AtlasError, Result};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://cloud.mongodb.com";
pub const DEFAULT_API_VERSION: &str = "2023-11-15";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 100;

/// Configuration for [`crate::AtlasClient`]
#[derive(Debug, Clone)]
pub struct AtlasConfig {
    pub base_url: String,
    pub access_token: String,
    /// Date-based API version sent in the `Accept` header
    pub api_version: String,
    pub timeout: Duration,
    pub items_per_page: u32,
}

impl AtlasConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: access_token.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }

    /// Create AtlasConfig from environment variables
    pub fn from_env() -> Result<Self> {
        let access_token = std::env::var("ATLAS_ACCESS_TOKEN")
            .map_err(|_| AtlasError::MissingEnvVar("ATLAS_ACCESS_TOKEN".to_string()))?;

        let mut config = Self::new(access_token);
        if let Ok(base_url) = std::env::var("ATLAS_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(api_version) = std::env::var("ATLAS_API_VERSION") {
            config.api_version = api_version;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_items_per_page(mut self, items_per_page: u32) -> Self {
        self.items_per_page = items_per_page;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.access_token.is_empty() {
            return Err(AtlasError::InvalidConfig("access token is empty".to_string()));
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(AtlasError::InvalidConfig(format!(
                "base URL must be http(s): {}",
                self.base_url
            )));
        }
        if self.items_per_page == 0 || self.items_per_page > 500 {
            return Err(AtlasError::InvalidConfig(format!(
                "items per page must be between 1 and 500, got {}",
                self.items_per_page
            )));
        }
        Ok(())
    }

    /// Media type for versioned Atlas endpoints
    pub fn accept_header(&self) -> String {
        format!("application/vnd.atlas.{}+json", self.api_version)
    }
}
