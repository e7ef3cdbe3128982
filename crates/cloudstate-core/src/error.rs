//! Provider error types

use crate::client::Operation;
use crate::import::ImportError;
use crate::reconcile::ReconcileError;
use crate::state_id::{DecodingError, EncodingError};
use thiserror::Error;

/// Provider errors
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{resource_type}: {message}")]
    Validation {
        resource_type: String,
        message: String,
    },

    #[error("{resource_type} ({id}): invalid state id: {source}")]
    Encoding {
        resource_type: String,
        id: String,
        #[source]
        source: EncodingError,
    },

    #[error("{resource_type} ({id}): corrupt state id: {source}")]
    Decoding {
        resource_type: String,
        id: String,
        #[source]
        source: DecodingError,
    },

    #[error("{resource_type}: {source}")]
    InvalidImportId {
        resource_type: String,
        #[source]
        source: ImportError,
    },

    #[error("{resource_type} ({id}): {operation} failed: {message}")]
    Remote {
        resource_type: String,
        operation: Operation,
        id: String,
        message: String,
    },

    #[error("{resource_type} ({id}) not found")]
    NotFound { resource_type: String, id: String },

    #[error("{resource_type} ({id}): {source}")]
    Reconcile {
        resource_type: String,
        id: String,
        #[source]
        source: ReconcileError,
    },

    #[error("{resource_type}: {operation} cancelled")]
    Cancelled {
        resource_type: String,
        operation: Operation,
    },

    #[error("{resource_type} does not support {operation}")]
    Unsupported {
        resource_type: String,
        operation: Operation,
    },

    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),
}

impl ProviderError {
    pub fn missing_field(resource_type: impl Into<String>, field: &str) -> Self {
        ProviderError::Validation {
            resource_type: resource_type.into(),
            message: format!("missing required field `{}`", field),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }

    /// Local failures that retrying cannot fix
    pub fn is_local(&self) -> bool {
        !matches!(
            self,
            ProviderError::Remote { .. } | ProviderError::NotFound { .. } | ProviderError::Cancelled { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
