use cloudstate_core::{
    ActionType, FieldKind, FieldMode, FieldSpec, FlatValue, Plan, ReadOutcome, ResourceHandler,
    StateId, reconcile,
};
use colored::Colorize;
use std::path::Path;

pub async fn handle(handler: &ResourceHandler, state_id: &str, desired: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(desired)
        .map_err(|e| anyhow::anyhow!("{}: {}", desired.display(), e))?;
    let config: serde_json::Value = serde_json::from_str(&content)?;
    let desired = reconcile::flatten_config(&config, handler.resource().schema())?;

    let prior = match handler.read(&StateId::from_raw(state_id)).await? {
        ReadOutcome::Present(state) => Some(state),
        ReadOutcome::Gone => None,
    };

    let action = handler.plan(prior.as_ref(), Some(&desired));
    let marker = match action.action_type {
        ActionType::Create => "+".green(),
        ActionType::Update => "~".yellow(),
        ActionType::Replace => "-/+".red(),
        ActionType::Delete => "-".red(),
        ActionType::NoOp => "=".dimmed(),
    };
    println!(
        "{} {} ({})",
        marker,
        handler.resource().name().bold(),
        action.action_type
    );

    for change in &action.changes {
        let spec = handler.resource().schema().field(&change.field);
        let before = render(change.before.as_ref(), spec);
        let after = render(change.after.as_ref(), spec);
        let note = if change.forces_replacement {
            " # forces replacement".red().to_string()
        } else {
            String::new()
        };
        println!("    {}: {} -> {}{}", change.field, before, after.cyan(), note);
    }

    println!();
    println!("Plan: {}", Plan::new(vec![action]).summary());
    Ok(())
}

/// Render a value for display, hiding write-only secrets
fn render(value: Option<&FlatValue>, spec: Option<&FieldSpec>) -> String {
    let Some(value) = value else {
        return "(unset)".to_string();
    };
    match (value, spec) {
        (_, Some(spec)) if spec.mode == FieldMode::WriteOnly => "(sensitive)".to_string(),
        (FlatValue::Record(record), Some(spec)) => {
            let FieldKind::Object(schema) = &spec.kind else {
                return value.to_json().to_string();
            };
            let mut shown = record.clone();
            for nested in schema.iter() {
                if nested.mode == FieldMode::WriteOnly && shown.contains(&nested.name) {
                    shown.insert(nested.name.clone(), "(sensitive)");
                }
            }
            FlatValue::Record(shown).to_json().to_string()
        }
        _ => value.to_json().to_string(),
    }
}
