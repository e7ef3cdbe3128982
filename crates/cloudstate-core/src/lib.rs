//! cloudstate core
//!
//! Provider-side machinery for declarative management of remote API
//! objects: composite state identifiers, reconciliation between nested
//! API objects and flat state records, and per-resource handlers that
//! drive create/read/update/delete/import against a remote client.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              host (cloudstate CLI)               │
//! └─────────────────┬───────────────────────────────┘
//!                   │ create / read / update / delete / import
//! ┌─────────────────▼───────────────────────────────┐
//! │                cloudstate-core                   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │            ResourceHandler                │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │   StateId    │  │  reconcile   │            │
//! │  └──────────────┘  └──────────────┘            │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │       trait RemoteClient { ... }          │   │
//! │  └──────────────────────────────────────────┘   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │    atlas      │
//!           │    client     │
//!           └───────────────┘
//! ```

pub mod action;
pub mod client;
pub mod error;
pub mod handler;
pub mod import;
pub mod reconcile;
pub mod record;
pub mod resource;
pub mod schema;
pub mod state_id;

// Re-exports
pub use action::{Action, ActionType, FieldChange, Plan, PlanSummary};
pub use client::{Address, Operation, RemoteClient, RemoteFailure, RemoteResult};
pub use error::{ProviderError, Result};
pub use handler::ResourceHandler;
pub use import::{ComponentKind, ImportError, ImportFormat};
pub use reconcile::{FieldDiagnostic, Flattened, Problem, ReconcileError};
pub use record::{FlatRecord, FlatValue};
pub use resource::{Capabilities, IdField, IdSource, ReadOutcome, ResourceState, ResourceType};
pub use schema::{FieldKind, FieldMode, FieldPath, FieldSpec, Schema};
pub use state_id::{DecodingError, EncodingError, StateFields, StateId};

// Used by hosts to cancel in-flight operations
pub use tokio_util::sync::CancellationToken;
