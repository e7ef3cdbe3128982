//! Remote API client abstraction
//!
//! Handlers never talk HTTP themselves. They call a [`RemoteClient`] that
//! is injected at construction time, which lets tests substitute an
//! in-memory double returning canned objects.

use crate::state_id::StateFields;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Remote operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Get,
    GetStatus,
    Update,
    Delete,
    List,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Get => write!(f, "get"),
            Operation::GetStatus => write!(f, "get status"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
            Operation::List => write!(f, "list"),
        }
    }
}

/// Resource type plus the path parameters that locate one remote object
/// (or, for create and list, its parent collection)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub resource_type: String,
    pub params: StateFields,
}

impl Address {
    pub fn new(resource_type: impl Into<String>, params: StateFields) -> Self {
        Self {
            resource_type: resource_type.into(),
            params,
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "{}[{}]", self.resource_type, params.join(", "))
    }
}

/// Failure reported by a [`RemoteClient`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteFailure {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("HTTP {status} {code}: {detail}")]
    Api {
        status: u16,
        code: String,
        detail: String,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl RemoteFailure {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteFailure::NotFound(_))
    }
}

pub type RemoteResult<T> = std::result::Result<T, RemoteFailure>;

/// Remote API operations available for every resource type
#[async_trait]
pub trait RemoteClient: Send + Sync {
    async fn create(&self, address: &Address, body: &Value) -> RemoteResult<Value>;

    async fn get(&self, address: &Address) -> RemoteResult<Value>;

    /// Read the status of an asynchronous request (e.g. LDAP verification)
    async fn get_status(&self, address: &Address) -> RemoteResult<Value>;

    async fn update(&self, address: &Address, patch: &Value) -> RemoteResult<Value>;

    async fn delete(&self, address: &Address) -> RemoteResult<()>;

    async fn list(&self, address: &Address) -> RemoteResult<Vec<Value>>;
}
