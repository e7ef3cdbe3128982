//! Resource type definitions

use crate::client::Operation;
use crate::import::ImportFormat;
use crate::record::FlatRecord;
use crate::schema::{FieldPath, Schema};
use crate::state_id::StateId;
use serde::Serialize;

/// Where an identity field's value comes from at create time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSource {
    /// Supplied by the user as a path parameter
    Input,
    /// Assigned by the server, read from the create response
    Response(FieldPath),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdField {
    pub name: String,
    pub source: IdSource,
}

/// Operations a resource type offers beyond read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub create: bool,
    pub update: bool,
    /// `false` when deleting only forgets the object locally
    pub remote_delete: bool,
    pub list: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            create: true,
            update: true,
            remote_delete: true,
            list: true,
        }
    }
}

/// Declarative description of one remote resource type
#[derive(Debug, Clone)]
pub struct ResourceType {
    name: String,
    schema: Schema,
    id_fields: Vec<IdField>,
    required_inputs: Vec<String>,
    import_format: Option<ImportFormat>,
    read_operation: Operation,
    capabilities: Capabilities,
}

impl ResourceType {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            id_fields: Vec::new(),
            required_inputs: Vec::new(),
            import_format: None,
            read_operation: Operation::Get,
            capabilities: Capabilities::default(),
        }
    }

    /// Identity field supplied as input; also a required create input
    pub fn id_from_input(mut self, name: &str) -> Self {
        self.id_fields.push(IdField {
            name: name.to_string(),
            source: IdSource::Input,
        });
        self.required_inputs.push(name.to_string());
        self
    }

    /// Identity field assigned by the server
    pub fn id_from_response(mut self, name: &str, path: &str) -> Self {
        self.id_fields.push(IdField {
            name: name.to_string(),
            source: IdSource::Response(FieldPath::parse(path)),
        });
        self
    }

    pub fn require(mut self, name: &str) -> Self {
        self.required_inputs.push(name.to_string());
        self
    }

    pub fn import_format(mut self, format: ImportFormat) -> Self {
        self.import_format = Some(format);
        self
    }

    pub fn read_with(mut self, operation: Operation) -> Self {
        self.read_operation = operation;
        self
    }

    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn id_fields(&self) -> &[IdField] {
        &self.id_fields
    }

    pub fn id_field_names(&self) -> Vec<&str> {
        self.id_fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn required_inputs(&self) -> &[String] {
        &self.required_inputs
    }

    /// Import format, defaulting to the identity fields joined by `-`
    pub fn import_format_or_default(&self) -> ImportFormat {
        self.import_format
            .clone()
            .unwrap_or_else(|| ImportFormat::of(&self.id_field_names()))
    }

    pub fn read_operation(&self) -> Operation {
        self.read_operation
    }

    pub fn caps(&self) -> Capabilities {
        self.capabilities
    }
}

/// State handed back to the host after a successful operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceState {
    pub id: StateId,
    pub record: FlatRecord,
}

/// Result of a read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Present(ResourceState),
    /// The remote object no longer exists; the host should drop it
    Gone,
}

impl ReadOutcome {
    pub fn is_gone(&self) -> bool {
        matches!(self, ReadOutcome::Gone)
    }

    pub fn present(self) -> Option<ResourceState> {
        match self {
            ReadOutcome::Present(state) => Some(state),
            ReadOutcome::Gone => None,
        }
    }
}
