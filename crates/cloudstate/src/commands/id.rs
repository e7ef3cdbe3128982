use crate::utils;
use cloudstate_core::StateId;

pub fn encode(args: &[String]) -> anyhow::Result<()> {
    let fields = utils::parse_pairs(args)?;
    let id = StateId::encode(&fields)?;
    println!("{}", id);
    Ok(())
}

pub fn decode(token: &str, expect: &[String]) -> anyhow::Result<()> {
    let id = StateId::from_raw(token);
    let fields = if expect.is_empty() {
        id.decode()?
    } else {
        let keys: Vec<&str> = expect.iter().map(String::as_str).collect();
        id.decode_expecting(&keys)?
    };
    utils::print_json(&fields)
}
