//! Planned changes for resource instances

use crate::record::{FlatRecord, FlatValue};
use crate::resource::{ResourceState, ResourceType};
use crate::schema::{FieldKind, FieldMode, Schema};
use serde::Serialize;

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new resource
    Create,
    /// Update an existing resource in place
    Update,
    /// Delete and recreate because an immutable field changed
    Replace,
    /// Delete a resource
    Delete,
    /// No changes needed
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Replace => write!(f, "replace"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// One field that differs between last-known and desired state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub before: Option<FlatValue>,
    pub after: Option<FlatValue>,
    pub forces_replacement: bool,
}

/// Planned action for a single resource instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub resource_type: String,

    /// State id of the existing instance, if any
    pub resource_id: Option<String>,

    pub action_type: ActionType,

    pub changes: Vec<FieldChange>,
}

impl Action {
    /// Compare last-known state with desired configuration.
    ///
    /// Only fields the desired record sets are compared, so server-managed
    /// values and optional inputs the user left out never show up as
    /// changes.
    pub fn plan(
        resource: &ResourceType,
        prior: Option<&ResourceState>,
        desired: Option<&FlatRecord>,
    ) -> Self {
        let resource_type = resource.name().to_string();
        let resource_id = prior.map(|p| p.id.to_string());

        let (prior, desired) = match (prior, desired) {
            (None, None) => {
                return Self {
                    resource_type,
                    resource_id,
                    action_type: ActionType::NoOp,
                    changes: Vec::new(),
                };
            }
            (None, Some(_)) => {
                return Self {
                    resource_type,
                    resource_id,
                    action_type: ActionType::Create,
                    changes: Vec::new(),
                };
            }
            (Some(_), None) => {
                return Self {
                    resource_type,
                    resource_id,
                    action_type: ActionType::Delete,
                    changes: Vec::new(),
                };
            }
            (Some(prior), Some(desired)) => (prior, desired),
        };

        // Without an in-place update every change means a new object
        let updatable = resource.caps().update;
        let mut changes = Vec::new();
        for spec in resource.schema().inputs() {
            let Some(after) = desired.get(&spec.name) else {
                continue;
            };
            let before = prior.record.get(&spec.name);
            match before {
                Some(b) if satisfies(after, b, &spec.kind) => continue,
                // The API never returns it, so there is nothing to compare
                None if spec.mode == FieldMode::WriteOnly => continue,
                _ => {}
            }
            changes.push(FieldChange {
                field: spec.name.clone(),
                before: before.cloned(),
                after: Some(after.clone()),
                forces_replacement: !updatable
                    || matches!(spec.mode, FieldMode::Immutable | FieldMode::Address),
            });
        }

        let action_type = if changes.is_empty() {
            ActionType::NoOp
        } else if changes.iter().any(|c| c.forces_replacement) {
            ActionType::Replace
        } else {
            ActionType::Update
        };

        Self {
            resource_type,
            resource_id,
            action_type,
            changes,
        }
    }

    pub fn changed_fields(&self) -> Vec<&str> {
        self.changes.iter().map(|c| c.field.as_str()).collect()
    }
}

/// Whether a desired value is already reflected by the prior value.
///
/// Nested records only need to agree on the keys the desired side sets.
/// Write-only keys missing from the prior record are unknown and never
/// count as a difference.
fn satisfies(desired: &FlatValue, prior: &FlatValue, kind: &FieldKind) -> bool {
    match (desired, prior, kind) {
        (FlatValue::Record(d), FlatValue::Record(p), FieldKind::Object(schema)) => {
            record_satisfies(d, p, schema)
        }
        (FlatValue::List(d), FlatValue::List(p), FieldKind::List(schema)) => {
            d.len() == p.len() && d.iter().zip(p).all(|(d, p)| record_satisfies(d, p, schema))
        }
        _ => desired == prior,
    }
}

fn record_satisfies(desired: &FlatRecord, prior: &FlatRecord, schema: &Schema) -> bool {
    desired.iter().all(|(name, value)| {
        let spec = schema.field(name);
        match prior.get(name) {
            Some(p) => spec.map_or(value == p, |s| satisfies(value, p, &s.kind)),
            None => spec.is_some_and(|s| s.mode == FieldMode::WriteOnly),
        }
    })
}

/// Plan containing all actions to be applied
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    /// List of actions to perform
    pub actions: Vec<Action>,

    /// Whether the plan has any changes
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions.iter().any(|a| a.action_type != ActionType::NoOp);
        Self {
            actions,
            has_changes,
        }
    }

    pub fn empty() -> Self {
        Self {
            actions: Vec::new(),
            has_changes: false,
        }
    }

    /// Get actions by type
    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    /// Summary of the plan
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            update: self.actions_by_type(ActionType::Update).len(),
            replace: self.actions_by_type(ActionType::Replace).len(),
            delete: self.actions_by_type(ActionType::Delete).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub replace: usize,
    pub delete: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to replace, {} to delete, {} unchanged",
            self.create, self.update, self.replace, self.delete, self.no_change
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;
    use crate::state_id::StateId;

    fn resource() -> ResourceType {
        ResourceType::new(
            "stream_connection",
            Schema::new(vec![
                FieldSpec::string("project_id", "groupId").address(),
                FieldSpec::string("connection_name", "name").address(),
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
                FieldSpec::string("api_key", "apiKey").write_only(),
            ]),
        )
        .id_from_input("project_id")
        .id_from_input("connection_name")
    }

    fn prior() -> ResourceState {
        ResourceState {
            id: StateId::from_pairs([("project_id", "p1"), ("connection_name", "c1")]).unwrap(),
            record: FlatRecord::new()
                .with("project_id", "p1")
                .with("connection_name", "c1")
                .with("type", "Kafka")
                .with("bootstrap_servers", "localhost:9092")
                .with(
                    "authentication",
                    FlatRecord::new()
                        .with("mechanism", "PLAIN")
                        .with("username", "user"),
                )
                .with("state", "READY"),
        }
    }

    #[test]
    fn test_identical_desired_is_noop() {
        let desired = FlatRecord::new()
            .with("project_id", "p1")
            .with("connection_name", "c1")
            .with("type", "Kafka")
            .with("bootstrap_servers", "localhost:9092")
            .with("authentication", FlatRecord::new().with("mechanism", "PLAIN"));

        let action = Action::plan(&resource(), Some(&prior()), Some(&desired));
        assert_eq!(action.action_type, ActionType::NoOp);
        assert!(action.changes.is_empty());
    }

    #[test]
    fn test_changed_input_is_update() {
        let desired = FlatRecord::new().with("bootstrap_servers", "broker:9092");

        let action = Action::plan(&resource(), Some(&prior()), Some(&desired));
        assert_eq!(action.action_type, ActionType::Update);
        assert_eq!(action.changed_fields(), vec!["bootstrap_servers"]);
        assert_eq!(
            action.changes[0].before,
            Some(FlatValue::String("localhost:9092".to_string()))
        );
    }

    #[test]
    fn test_nested_change_detected() {
        let desired = FlatRecord::new()
            .with("authentication", FlatRecord::new().with("mechanism", "SCRAM-256"));

        let action = Action::plan(&resource(), Some(&prior()), Some(&desired));
        assert_eq!(action.changed_fields(), vec!["authentication"]);
    }

    #[test]
    fn test_immutable_change_is_replace() {
        let desired = FlatRecord::new()
            .with("type", "Cluster")
            .with("bootstrap_servers", "broker:9092");

        let action = Action::plan(&resource(), Some(&prior()), Some(&desired));
        assert_eq!(action.action_type, ActionType::Replace);
        assert!(action.changes.iter().any(|c| c.forces_replacement));
    }

    #[test]
    fn test_unknown_write_only_values_are_not_changes() {
        let desired = FlatRecord::new()
            .with("bootstrap_servers", "localhost:9092")
            .with("api_key", "k1")
            .with(
                "authentication",
                FlatRecord::new()
                    .with("mechanism", "PLAIN")
                    .with("password", "secret"),
            );

        let action = Action::plan(&resource(), Some(&prior()), Some(&desired));
        assert_eq!(action.action_type, ActionType::NoOp);
    }

    #[test]
    fn test_known_write_only_value_change_is_update() {
        let mut prior = prior();
        prior.record.insert("api_key", "k1");
        let desired = FlatRecord::new().with("api_key", "k2");

        let action = Action::plan(&resource(), Some(&prior), Some(&desired));
        assert_eq!(action.action_type, ActionType::Update);
        assert_eq!(action.changed_fields(), vec!["api_key"]);
    }

    #[test]
    fn test_computed_fields_ignored() {
        let desired = FlatRecord::new().with("state", "FAILED");
        let action = Action::plan(&resource(), Some(&prior()), Some(&desired));
        assert_eq!(action.action_type, ActionType::NoOp);
    }

    #[test]
    fn test_create_and_delete() {
        let desired = FlatRecord::new().with("type", "Kafka");
        assert_eq!(
            Action::plan(&resource(), None, Some(&desired)).action_type,
            ActionType::Create
        );
        assert_eq!(
            Action::plan(&resource(), Some(&prior()), None).action_type,
            ActionType::Delete
        );
    }

    #[test]
    fn test_plan_summary() {
        let desired = FlatRecord::new().with("bootstrap_servers", "broker:9092");
        let plan = Plan::new(vec![
            Action::plan(&resource(), Some(&prior()), Some(&desired)),
            Action::plan(&resource(), Some(&prior()), Some(&FlatRecord::new())),
            Action::plan(&resource(), None, Some(&desired)),
        ]);

        assert!(plan.has_changes);
        assert_eq!(
            plan.summary().to_string(),
            "1 to create, 1 to update, 0 to replace, 0 to delete, 1 unchanged"
        );
        assert!(!Plan::empty().has_changes);
    }
}
