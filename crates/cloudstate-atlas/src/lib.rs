//! MongoDB Atlas provider for cloudstate
//!
//! This crate implements the `RemoteClient` trait against the Atlas Admin
//! API and defines the resource types cloudstate manages there.
//!
//! # Resource types
//!
//! - `federated_settings_identity_provider`: SAML identity providers
//! - `ldap_verify`: LDAP configuration verification requests
//! - `stream_connection`: stream processing instance connections
//!
//! # Requirements
//!
//! - `ATLAS_ACCESS_TOKEN` env var (service account or OAuth access token)
//! - Optional: `ATLAS_BASE_URL`, `ATLAS_API_VERSION`
//!
//! # Example
//!
//! ```ignore
//! use cloudstate_atlas::{AtlasConfig, AtlasProvider};
//!
//! let provider = AtlasProvider::new(AtlasConfig::from_env()?)?;
//! let handler = provider.handler("stream_connection")?;
//!
//! let state = handler
//!     .import("my-instance-5f4e3d2c1b0a9f8e7d6c5b4a-kafka-conn")
//!     .await?;
//! println!("{}", state.id);
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod provider;
pub mod resources;

pub use client::{AtlasClient, Route};
pub use config::AtlasConfig;
pub use error::{AtlasError, Result};
pub use provider::AtlasProvider;
