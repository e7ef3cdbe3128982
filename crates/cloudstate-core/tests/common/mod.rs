use async_trait::async_trait;
use cloudstate_core::{
    Address, Capabilities, FieldSpec, ImportFormat, Operation, RemoteClient, RemoteFailure,
    RemoteResult, ResourceType, Schema,
};
use serde_json::{Value, json};
use std::sync::Mutex;

pub const PROJECT_ID: &str = "5f4e3d2c1b0a9f8e7d6c5b4a";

/// In-memory stand-in for a remote API holding a single object
#[derive(Default)]
pub struct FakeClient {
    object: Mutex<Option<Value>>,
    items: Mutex<Vec<Value>>,
    server_fields: Value,
    failure: Mutex<Option<RemoteFailure>>,
    stall: bool,
    calls: Mutex<Vec<(Operation, Option<Value>)>>,
}

#[allow(dead_code)]
impl FakeClient {
    pub fn new() -> Self {
        Self {
            server_fields: json!({}),
            ..Default::default()
        }
    }

    /// Fields the server adds to every created object
    pub fn with_server_fields(mut self, fields: Value) -> Self {
        self.server_fields = fields;
        self
    }

    pub fn with_object(self, object: Value) -> Self {
        *self.object.lock().unwrap() = Some(object);
        self
    }

    pub fn with_items(self, items: Vec<Value>) -> Self {
        *self.items.lock().unwrap() = items;
        self
    }

    /// Fail the next call with `failure`
    pub fn failing(self, failure: RemoteFailure) -> Self {
        *self.failure.lock().unwrap() = Some(failure);
        self
    }

    /// Never answer
    pub fn stalled(mut self) -> Self {
        self.stall = true;
        self
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.calls.lock().unwrap().iter().map(|(op, _)| *op).collect()
    }

    pub fn body_of(&self, operation: Operation) -> Option<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(op, _)| *op == operation)
            .and_then(|(_, body)| body.clone())
    }

    pub fn object(&self) -> Option<Value> {
        self.object.lock().unwrap().clone()
    }

    async fn enter(&self, operation: Operation, body: Option<&Value>) -> RemoteResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((operation, body.cloned()));
        if self.stall {
            std::future::pending::<()>().await;
        }
        match self.failure.lock().unwrap().take() {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    fn current(&self, address: &Address) -> RemoteResult<Value> {
        self.object
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RemoteFailure::NotFound(address.to_string()))
    }
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target), Some(patch)) = (target.as_object_mut(), patch.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[async_trait]
impl RemoteClient for FakeClient {
    async fn create(&self, _address: &Address, body: &Value) -> RemoteResult<Value> {
        self.enter(Operation::Create, Some(body)).await?;
        let mut object = body.clone();
        merge(&mut object, &self.server_fields);
        *self.object.lock().unwrap() = Some(object.clone());
        Ok(object)
    }

    async fn get(&self, address: &Address) -> RemoteResult<Value> {
        self.enter(Operation::Get, None).await?;
        self.current(address)
    }

    async fn get_status(&self, address: &Address) -> RemoteResult<Value> {
        self.enter(Operation::GetStatus, None).await?;
        self.current(address)
    }

    async fn update(&self, address: &Address, patch: &Value) -> RemoteResult<Value> {
        self.enter(Operation::Update, Some(patch)).await?;
        let mut object = self.current(address)?;
        merge(&mut object, patch);
        *self.object.lock().unwrap() = Some(object.clone());
        Ok(object)
    }

    async fn delete(&self, address: &Address) -> RemoteResult<()> {
        self.enter(Operation::Delete, None).await?;
        self.object
            .lock()
            .unwrap()
            .take()
            .map(|_| ())
            .ok_or_else(|| RemoteFailure::NotFound(address.to_string()))
    }

    async fn list(&self, _address: &Address) -> RemoteResult<Vec<Value>> {
        self.enter(Operation::List, None).await?;
        Ok(self.items.lock().unwrap().clone())
    }
}

#[allow(dead_code)]
pub fn stream_connection() -> ResourceType {
    ResourceType::new(
        "stream_connection",
        Schema::new(vec![
            FieldSpec::string("project_id", "groupId").address(),
            FieldSpec::string("instance_name", "instanceName").address(),
            FieldSpec::string("connection_name", "name")
                .address()
                .sent_as("name"),
            FieldSpec::string("type", "type").immutable(),
            FieldSpec::string("bootstrap_servers", "bootstrapServers").input(),
            FieldSpec::object(
                "authentication",
                "authentication",
                Schema::new(vec![
                    FieldSpec::string("mechanism", "mechanism").input(),
                    FieldSpec::string("username", "username").input(),
                    FieldSpec::string("password", "password").write_only(),
                ]),
            )
            .input(),
            FieldSpec::string("state", "state"),
        ]),
    )
    .id_from_input("project_id")
    .id_from_input("instance_name")
    .id_from_input("connection_name")
    .require("type")
    .import_format(
        ImportFormat::new()
            .free("instance_name")
            .object_id("project_id")
            .free("connection_name"),
    )
}

#[allow(dead_code)]
pub fn ldap_verify() -> ResourceType {
    ResourceType::new(
        "ldap_verify",
        Schema::new(vec![
            FieldSpec::string("project_id", "groupId").address(),
            FieldSpec::string("request_id", "requestId"),
            FieldSpec::string("hostname", "request.hostname")
                .immutable()
                .sent_as("hostname"),
            FieldSpec::int("port", "request.port")
                .immutable()
                .sent_as("port"),
            FieldSpec::string("bind_password", "bindPassword").write_only(),
            FieldSpec::string("status", "status"),
            FieldSpec::list(
                "validations",
                "validations",
                Schema::new(vec![
                    FieldSpec::string("status", "status"),
                    FieldSpec::string("validation_type", "validationType"),
                ]),
            ),
        ]),
    )
    .id_from_input("project_id")
    .id_from_response("request_id", "requestId")
    .require("hostname")
    .read_with(Operation::GetStatus)
    .capabilities(Capabilities {
        update: false,
        remote_delete: false,
        ..Default::default()
    })
}
