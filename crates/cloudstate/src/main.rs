mod commands;
mod utils;

use clap::{Parser, Subcommand};
use cloudstate_core::CancellationToken;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cloudstate")]
#[command(about = "Inspect and adopt Atlas resources managed as declarative state", long_about = None)]
struct Cli {
    /// Log remote calls (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode or decode composite state ids
    #[command(subcommand)]
    Id(IdCommands),
    /// List supported resource types
    Resources,
    /// Adopt an existing remote object by its import id
    Import {
        /// Resource type (see `cloudstate resources`)
        resource_type: String,
        /// Import id, e.g. {instance_name}-{project_id}-{connection_name}
        import_id: String,
    },
    /// Refresh state for a state id
    Read {
        resource_type: String,
        state_id: String,
    },
    /// Read a single object from identity fields (key=value ...)
    Data {
        resource_type: String,
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// List objects below a parent (key=value ...)
    List {
        resource_type: String,
        parent: Vec<String>,
    },
    /// Show the changes needed to reach a desired configuration
    Plan {
        resource_type: String,
        state_id: String,
        /// JSON file with the desired configuration, keyed by field name
        #[arg(short, long)]
        desired: PathBuf,
    },
    /// Delete the remote object behind a state id
    Delete {
        resource_type: String,
        state_id: String,
        /// Skip the confirmation guard
        #[arg(short, long)]
        yes: bool,
    },
    /// Show version
    Version,
}

#[derive(Subcommand)]
enum IdCommands {
    /// Encode key=value pairs into a state id
    Encode {
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Decode a state id into its fields
    Decode {
        state_id: String,
        /// Fail unless the id holds exactly these fields
        #[arg(long, value_delimiter = ',')]
        expect: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    // Commands below here do not need Atlas credentials
    match &cli.command {
        Commands::Version => {
            println!("cloudstate {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Id(IdCommands::Encode { fields }) => return commands::id::encode(fields),
        Commands::Id(IdCommands::Decode { state_id, expect }) => {
            return commands::id::decode(state_id, expect);
        }
        Commands::Resources => return commands::resources::handle(),
        _ => {}
    }

    let provider = utils::load_provider()?;
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling outstanding request");
                cancel.cancel();
            }
        });
    }

    match cli.command {
        Commands::Import {
            resource_type,
            import_id,
        } => {
            let handler = provider.handler(&resource_type)?.with_cancellation(cancel);
            commands::state::import(&handler, &import_id).await?;
        }
        Commands::Read {
            resource_type,
            state_id,
        } => {
            let handler = provider.handler(&resource_type)?.with_cancellation(cancel);
            commands::state::read(&handler, &state_id).await?;
        }
        Commands::Data {
            resource_type,
            fields,
        } => {
            let handler = provider.handler(&resource_type)?.with_cancellation(cancel);
            commands::state::data(&handler, &fields).await?;
        }
        Commands::List {
            resource_type,
            parent,
        } => {
            let handler = provider.handler(&resource_type)?.with_cancellation(cancel);
            commands::state::list(&handler, &parent).await?;
        }
        Commands::Plan {
            resource_type,
            state_id,
            desired,
        } => {
            let handler = provider.handler(&resource_type)?.with_cancellation(cancel);
            commands::plan::handle(&handler, &state_id, &desired).await?;
        }
        Commands::Delete {
            resource_type,
            state_id,
            yes,
        } => {
            let handler = provider.handler(&resource_type)?.with_cancellation(cancel);
            commands::state::delete(&handler, &state_id, yes).await?;
        }
        Commands::Version | Commands::Id(_) | Commands::Resources => {}
    }

    Ok(())
}
