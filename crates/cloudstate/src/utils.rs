use anyhow::Context;
use cloudstate_atlas::{AtlasConfig, AtlasProvider};
use cloudstate_config::Settings;
use cloudstate_core::{FlatRecord, FlatValue, StateFields};
use serde::Serialize;
use std::time::Duration;

/// Build the Atlas provider from the discovered settings file and
/// environment overrides
pub fn load_provider() -> anyhow::Result<AtlasProvider> {
    let settings = Settings::load()?;
    let config = atlas_config(settings)?;
    tracing::debug!("Using Atlas API at {}", config.base_url);
    Ok(AtlasProvider::new(config)?)
}

fn atlas_config(settings: Settings) -> anyhow::Result<AtlasConfig> {
    let access_token = settings.access_token.ok_or_else(|| {
        anyhow::anyhow!(
            "No Atlas access token. Set ATLAS_ACCESS_TOKEN or access_token in cloudstate.yaml"
        )
    })?;

    let mut config = AtlasConfig::new(access_token);
    if let Some(base_url) = settings.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(api_version) = settings.api_version {
        config = config.with_api_version(api_version);
    }
    if let Some(secs) = settings.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(items_per_page) = settings.items_per_page {
        config = config.with_items_per_page(items_per_page);
    }
    Ok(config)
}

/// Parse `key=value` arguments. The value may itself contain `=`.
pub fn parse_pairs(args: &[String]) -> anyhow::Result<StateFields> {
    let mut fields = StateFields::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .with_context(|| format!("expected key=value, got `{}`", arg))?;
        if key.is_empty() {
            anyhow::bail!("empty key in `{}`", arg);
        }
        if fields.insert(key.to_string(), value.to_string()).is_some() {
            anyhow::bail!("`{}` given more than once", key);
        }
    }
    Ok(fields)
}

pub fn pairs_to_record(fields: &StateFields) -> FlatRecord {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), FlatValue::from(v.as_str())))
        .collect()
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
