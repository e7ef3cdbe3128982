use colored::Colorize;

pub fn handle() -> anyhow::Result<()> {
    for (resource, route) in cloudstate_atlas::resources::all() {
        let caps = resource.caps();
        let mut operations = vec!["read", "import"];
        if caps.create {
            operations.push("create");
        }
        if caps.update {
            operations.push("update");
        }
        if caps.remote_delete {
            operations.push("delete");
        }
        if caps.list {
            operations.push("list");
        }

        println!("{}", resource.name().cyan().bold());
        println!("  id fields: {}", resource.id_field_names().join(", "));
        println!("  import id: {}", resource.import_format_or_default());
        println!("  operations: {}", operations.join(", "));
        println!("  route: {}", route.item.dimmed());
    }
    Ok(())
}
