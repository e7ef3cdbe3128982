use crate::utils;
use cloudstate_core::{ReadOutcome, ResourceHandler, StateId};
use colored::Colorize;

pub async fn import(handler: &ResourceHandler, import_id: &str) -> anyhow::Result<()> {
    let state = handler.import(import_id).await?;
    eprintln!(
        "{} {} {}",
        "✓ Imported".green(),
        handler.resource().name(),
        import_id.cyan()
    );
    utils::print_json(&state)
}

pub async fn read(handler: &ResourceHandler, state_id: &str) -> anyhow::Result<()> {
    let id = StateId::from_raw(state_id);
    match handler.read(&id).await? {
        ReadOutcome::Present(state) => {
            eprintln!("import id: {}", handler.import_id(&id)?.cyan());
            utils::print_json(&state)
        }
        ReadOutcome::Gone => {
            eprintln!(
                "{} {} no longer exists",
                "!".yellow().bold(),
                handler.resource().name()
            );
            utils::print_json(&serde_json::Value::Null)
        }
    }
}

pub async fn data(handler: &ResourceHandler, args: &[String]) -> anyhow::Result<()> {
    let inputs = utils::pairs_to_record(&utils::parse_pairs(args)?);
    let state = handler.read_data_source(&inputs).await?;
    eprintln!("import id: {}", handler.import_id(&state.id)?.cyan());
    utils::print_json(&state)
}

pub async fn list(handler: &ResourceHandler, args: &[String]) -> anyhow::Result<()> {
    let parent = utils::parse_pairs(args)?;
    let records = handler.list(&parent).await?;
    eprintln!("{} item(s)", records.len());
    utils::print_json(&records)
}

pub async fn delete(handler: &ResourceHandler, state_id: &str, yes: bool) -> anyhow::Result<()> {
    let id = StateId::from_raw(state_id);
    let fields = id.decode_expecting(&handler.resource().id_field_names())?;

    if !yes {
        eprintln!(
            "{} this deletes {} {:?}",
            "Warning:".yellow().bold(),
            handler.resource().name(),
            fields
        );
        anyhow::bail!("re-run with --yes to confirm");
    }

    handler.delete(&id).await?;
    println!("{} {}", "✓ Deleted".green(), handler.resource().name());
    Ok(())
}
