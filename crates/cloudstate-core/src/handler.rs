//! Create/read/update/delete/import orchestration for one resource type

use crate::action::{Action, ActionType};
use crate::client::{Address, Operation, RemoteClient, RemoteFailure, RemoteResult};
use crate::error::{ProviderError, Result};
use crate::reconcile::{self, FieldDiagnostic, Problem, ReconcileError};
use crate::record::{FlatRecord, FlatValue};
use crate::resource::{IdSource, ReadOutcome, ResourceState, ResourceType};
use crate::schema::{FieldKind, FieldMode, Schema};
use crate::state_id::{StateFields, StateId};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Drives one resource type against a remote client.
///
/// Handlers hold no mutable state; the host may run any number of them
/// concurrently against independent resource instances.
#[derive(Clone)]
pub struct ResourceHandler {
    resource: Arc<ResourceType>,
    client: Arc<dyn RemoteClient>,
    cancel: CancellationToken,
}

impl ResourceHandler {
    pub fn new(resource: Arc<ResourceType>, client: Arc<dyn RemoteClient>) -> Self {
        Self {
            resource,
            client,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort outstanding remote calls when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn resource(&self) -> &ResourceType {
        &self.resource
    }

    fn type_name(&self) -> String {
        self.resource.name().to_string()
    }

    /// Create the remote object and return its full state
    pub async fn create(&self, desired: &FlatRecord) -> Result<ResourceState> {
        if !self.resource.caps().create {
            return Err(self.unsupported(Operation::Create));
        }
        self.validate_required(desired)?;

        let mut params = StateFields::new();
        for field in self.resource.id_fields() {
            if field.source == IdSource::Input {
                params.insert(field.name.clone(), self.input_string(desired, &field.name)?);
            }
        }
        let address = Address::new(self.resource.name(), params.clone());
        let body = reconcile::expand(desired, self.resource.schema(), |f| f.in_create_body());

        tracing::info!("Creating {}", address);
        let response = self
            .call(Operation::Create, self.client.create(&address, &body))
            .await?
            .map_err(|e| self.remote_error(Operation::Create, &address, e))?;

        let fields = self.identity_from_response(params, &response, &address)?;
        let id = self.encode_id(&fields)?;
        tracing::debug!("Created {} as {}", self.resource.name(), id);

        let mut state = self.read_required(&id).await?;
        carry_write_only(self.resource.schema(), desired, &mut state.record);
        Ok(state)
    }

    /// Refresh state from the remote object.
    ///
    /// A remote not-found is reported as [`ReadOutcome::Gone`] so the host
    /// can drop the instance instead of failing the whole run.
    pub async fn read(&self, id: &StateId) -> Result<ReadOutcome> {
        let fields = self.decode_id(id)?;
        let address = Address::new(self.resource.name(), fields.clone());
        let operation = self.resource.read_operation();

        tracing::debug!("Reading {}", address);
        let result = match operation {
            Operation::GetStatus => {
                self.call(operation, self.client.get_status(&address))
                    .await?
            }
            _ => self.call(operation, self.client.get(&address)).await?,
        };

        let response = match result {
            Ok(response) => response,
            Err(RemoteFailure::NotFound(_)) => {
                tracing::warn!("{} no longer exists, removing from state", address);
                return Ok(ReadOutcome::Gone);
            }
            Err(e) => return Err(self.remote_error(operation, &address, e)),
        };

        let mut record = reconcile::flatten(&response, self.resource.schema()).map_err(|source| {
            ProviderError::Reconcile {
                resource_type: self.type_name(),
                id: address_identifier(&address),
                source,
            }
        })?;
        for (name, value) in fields {
            record.insert(name, value);
        }

        Ok(ReadOutcome::Present(ResourceState {
            id: id.clone(),
            record,
        }))
    }

    /// Apply changed input fields, then refresh
    pub async fn update(&self, prior: &ResourceState, desired: &FlatRecord) -> Result<ResourceState> {
        let action = Action::plan(&self.resource, Some(prior), Some(desired));
        match action.action_type {
            ActionType::NoOp => {
                tracing::debug!("{} ({}) unchanged", self.resource.name(), prior.id);
                return Ok(prior.clone());
            }
            ActionType::Replace => {
                let fields: Vec<&str> = action
                    .changes
                    .iter()
                    .filter(|c| c.forces_replacement)
                    .map(|c| c.field.as_str())
                    .collect();
                return Err(ProviderError::Validation {
                    resource_type: self.type_name(),
                    message: format!(
                        "changing {} requires replacing the resource",
                        fields.join(", ")
                    ),
                });
            }
            _ => {}
        }
        let changed = action.changed_fields();
        let patch = reconcile::expand(desired, self.resource.schema(), |f| {
            changed.contains(&f.name.as_str())
        });

        let fields = self.decode_id(&prior.id)?;
        let address = Address::new(self.resource.name(), fields);

        tracing::info!("Updating {} ({})", address, changed.join(", "));
        self.call(Operation::Update, self.client.update(&address, &patch))
            .await?
            .map_err(|e| self.remote_error(Operation::Update, &address, e))?;

        let mut state = self.read_required(&prior.id).await?;
        carry_write_only(self.resource.schema(), &prior.record, &mut state.record);
        carry_write_only(self.resource.schema(), desired, &mut state.record);
        Ok(state)
    }

    /// Delete the remote object. Already-deleted objects count as success.
    pub async fn delete(&self, id: &StateId) -> Result<()> {
        let fields = self.decode_id(id)?;
        let address = Address::new(self.resource.name(), fields);

        if !self.resource.caps().remote_delete {
            tracing::info!("{} has no remote delete, removing from state only", address);
            return Ok(());
        }

        tracing::info!("Deleting {}", address);
        match self
            .call(Operation::Delete, self.client.delete(&address))
            .await?
        {
            Ok(()) => Ok(()),
            Err(RemoteFailure::NotFound(_)) => {
                tracing::debug!("{} already deleted", address);
                Ok(())
            }
            Err(e) => Err(self.remote_error(Operation::Delete, &address, e)),
        }
    }

    /// Adopt an existing remote object from a user-facing import id
    pub async fn import(&self, import_id: &str) -> Result<ResourceState> {
        let format = self.resource.import_format_or_default();
        let fields = format
            .parse(import_id)
            .map_err(|source| ProviderError::InvalidImportId {
                resource_type: self.type_name(),
                source,
            })?;
        let id = self.encode_id(&fields)?;

        tracing::info!("Importing {} {} as {}", self.resource.name(), import_id, id);
        self.read_required(&id).await
    }

    /// Data source read: the identity comes from user inputs and a missing
    /// remote object is an error
    pub async fn read_data_source(&self, inputs: &FlatRecord) -> Result<ResourceState> {
        let mut fields = StateFields::new();
        for name in self.resource.id_field_names() {
            fields.insert(name.to_string(), self.input_string(inputs, name)?);
        }
        let id = self.encode_id(&fields)?;
        self.read_required(&id).await
    }

    /// List every object below a parent (plural data sources)
    pub async fn list(&self, parent: &StateFields) -> Result<Vec<FlatRecord>> {
        if !self.resource.caps().list {
            return Err(self.unsupported(Operation::List));
        }
        let address = Address::new(self.resource.name(), parent.clone());

        tracing::debug!("Listing {}", address);
        let items = self
            .call(Operation::List, self.client.list(&address))
            .await?
            .map_err(|e| self.remote_error(Operation::List, &address, e))?;

        let mut records = reconcile::flatten_list(&items, self.resource.schema()).map_err(
            |source| ProviderError::Reconcile {
                resource_type: self.type_name(),
                id: address_identifier(&address),
                source,
            },
        )?;
        for record in &mut records {
            for (name, value) in parent {
                record.insert(name.clone(), value.clone());
            }
        }
        Ok(records)
    }

    /// Plan the action needed to move from `prior` to `desired`
    pub fn plan(&self, prior: Option<&ResourceState>, desired: Option<&FlatRecord>) -> Action {
        Action::plan(&self.resource, prior, desired)
    }

    /// User-facing import id for an existing state id
    pub fn import_id(&self, id: &StateId) -> Result<String> {
        let fields = self.decode_id(id)?;
        self.resource
            .import_format_or_default()
            .format(&fields)
            .map_err(|source| ProviderError::InvalidImportId {
                resource_type: self.type_name(),
                source,
            })
    }

    async fn read_required(&self, id: &StateId) -> Result<ResourceState> {
        match self.read(id).await? {
            ReadOutcome::Present(state) => Ok(state),
            ReadOutcome::Gone => Err(ProviderError::NotFound {
                resource_type: self.type_name(),
                id: id.decode().map(|f| fields_identifier(&f)).unwrap_or_else(|_| id.to_string()),
            }),
        }
    }

    async fn call<T, F>(&self, operation: Operation, request: F) -> Result<RemoteResult<T>>
    where
        F: Future<Output = RemoteResult<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ProviderError::Cancelled {
                resource_type: self.type_name(),
                operation,
            }),
            result = request => Ok(result),
        }
    }

    fn decode_id(&self, id: &StateId) -> Result<StateFields> {
        id.decode_expecting(&self.resource.id_field_names())
            .map_err(|source| ProviderError::Decoding {
                resource_type: self.type_name(),
                id: id.to_string(),
                source,
            })
    }

    fn encode_id(&self, fields: &StateFields) -> Result<StateId> {
        StateId::encode(fields).map_err(|source| ProviderError::Encoding {
            resource_type: self.type_name(),
            id: fields_identifier(fields),
            source,
        })
    }

    fn validate_required(&self, desired: &FlatRecord) -> Result<()> {
        for name in self.resource.required_inputs() {
            let present = match desired.get(name) {
                None | Some(FlatValue::Null) => false,
                Some(FlatValue::String(s)) => !s.is_empty(),
                Some(_) => true,
            };
            if !present {
                return Err(ProviderError::missing_field(self.resource.name(), name));
            }
        }
        Ok(())
    }

    fn input_string(&self, record: &FlatRecord, name: &str) -> Result<String> {
        match record.get_str(name) {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(ProviderError::missing_field(self.resource.name(), name)),
        }
    }

    fn identity_from_response(
        &self,
        mut fields: StateFields,
        response: &Value,
        address: &Address,
    ) -> Result<StateFields> {
        let mut diagnostics = Vec::new();
        for field in self.resource.id_fields() {
            let IdSource::Response(path) = &field.source else {
                continue;
            };
            let found = path
                .segments()
                .iter()
                .try_fold(response, |value, segment| value.get(segment));
            match found {
                Some(Value::String(s)) if !s.is_empty() => {
                    fields.insert(field.name.clone(), s.clone());
                }
                None | Some(Value::Null) | Some(Value::String(_)) => {
                    diagnostics.push(FieldDiagnostic {
                        field: field.name.clone(),
                        problem: Problem::Missing,
                    })
                }
                Some(other) => diagnostics.push(FieldDiagnostic {
                    field: field.name.clone(),
                    problem: Problem::TypeMismatch {
                        expected: "string",
                        observed: other.clone(),
                    },
                }),
            }
        }

        if diagnostics.is_empty() {
            Ok(fields)
        } else {
            Err(ProviderError::Reconcile {
                resource_type: self.type_name(),
                id: address_identifier(address),
                source: ReconcileError { diagnostics },
            })
        }
    }

    fn remote_error(&self, operation: Operation, address: &Address, failure: RemoteFailure) -> ProviderError {
        let id = address_identifier(address);
        match failure {
            RemoteFailure::NotFound(_) => ProviderError::NotFound {
                resource_type: self.type_name(),
                id,
            },
            other => ProviderError::Remote {
                resource_type: self.type_name(),
                operation,
                id,
                message: other.to_string(),
            },
        }
    }

    fn unsupported(&self, operation: Operation) -> ProviderError {
        ProviderError::Unsupported {
            resource_type: self.type_name(),
            operation,
        }
    }
}

fn address_identifier(address: &Address) -> String {
    fields_identifier(&address.params)
}

fn fields_identifier(fields: &StateFields) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Copy write-only values (passwords) from `source` into a freshly read
/// record, recursing into nested objects
fn carry_write_only(schema: &Schema, source: &FlatRecord, target: &mut FlatRecord) {
    for spec in schema.iter() {
        match (&spec.mode, &spec.kind) {
            (FieldMode::WriteOnly, _) => {
                if let Some(value) = source.get(&spec.name) {
                    target.insert(spec.name.clone(), value.clone());
                }
            }
            (_, FieldKind::Object(nested)) => {
                let Some(FlatValue::Record(from)) = source.get(&spec.name) else {
                    continue;
                };
                let mut merged = match target.get(&spec.name) {
                    Some(FlatValue::Record(existing)) => existing.clone(),
                    _ => continue,
                };
                carry_write_only(nested, from, &mut merged);
                target.insert(spec.name.clone(), merged);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;

    #[test]
    fn test_carry_write_only_nested() {
        let schema = Schema::new(vec![
            FieldSpec::string("bind_password", "bindPassword").write_only(),
            FieldSpec::object(
                "authentication",
                "authentication",
                Schema::new(vec![
                    FieldSpec::string("username", "username").input(),
                    FieldSpec::string("password", "password").write_only(),
                ]),
            )
            .input(),
        ]);
        let desired = FlatRecord::new().with("bind_password", "secret").with(
            "authentication",
            FlatRecord::new()
                .with("username", "user")
                .with("password", "pw"),
        );
        let mut read = FlatRecord::new().with(
            "authentication",
            FlatRecord::new().with("username", "user"),
        );

        carry_write_only(&schema, &desired, &mut read);

        assert_eq!(read.get_str("bind_password"), Some("secret"));
        let auth = read.get("authentication").and_then(FlatValue::as_record).unwrap();
        assert_eq!(auth.get_str("password"), Some("pw"));
    }

    #[test]
    fn test_fields_identifier() {
        let mut fields = StateFields::new();
        fields.insert("request_id".to_string(), "r1".to_string());
        fields.insert("project_id".to_string(), "p1".to_string());
        assert_eq!(fields_identifier(&fields), "project_id=p1, request_id=r1");
    }
}
