//! forgectl — operator CLI for an MCP gateway/registry service.
//!
//! Read-only lookups (`health`, `list`, `get`) print JSON to stdout; `delete`
//! is idempotent. Logs go to stderr, filtered by RUST_LOG.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use forge_provider::{
    Client, DataSource, GatewayModel, Managed, PromptModel, ProviderConfig, ResourceModel,
    RootModel, ServerModel, ToolModel,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// forgectl — inspect and prune entities registered with an MCP gateway.
#[derive(Parser)]
#[command(
    name = "forgectl",
    version,
    about = "forgectl — inspect and prune entities registered with an MCP gateway"
)]
struct Cli {
    /// Path to a TOML config file [default: ./forge-provider.toml or <config dir>/forge-provider/config.toml]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Gateway API base URL (overrides config and CONTEXTFORGE_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,
    /// Bearer token (overrides config and CONTEXTFORGE_BEARER_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the service health status
    Health,
    /// List every entity of one kind as JSON
    List {
        kind: Kind,
        /// Include deactivated entities (ignored for roots)
        #[arg(long)]
        include_inactive: bool,
    },
    /// Print one entity as JSON; fails if it does not exist
    Get {
        kind: Kind,
        /// Identity (for roots, the URI)
        id: String,
    },
    /// Delete one entity; succeeds if it is already gone
    Delete {
        kind: Kind,
        /// Identity (for roots, the URI)
        id: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Gateway,
    Server,
    Tool,
    Resource,
    Prompt,
    Root,
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = build_client(cli.config, cli.endpoint, cli.token)?;
    let source = DataSource::new(client.clone());

    match cli.command {
        Commands::Health => {
            let status = source
                .health()
                .await
                .context("Failed to query service health")?;
            println!("{status}");
        }
        Commands::List {
            kind,
            include_inactive,
        } => match kind {
            Kind::Gateway => print_list::<GatewayModel>(&source, include_inactive).await?,
            Kind::Server => print_list::<ServerModel>(&source, include_inactive).await?,
            Kind::Tool => print_list::<ToolModel>(&source, include_inactive).await?,
            Kind::Resource => print_list::<ResourceModel>(&source, include_inactive).await?,
            Kind::Prompt => print_list::<PromptModel>(&source, include_inactive).await?,
            Kind::Root => print_list::<RootModel>(&source, include_inactive).await?,
        },
        Commands::Get { kind, id } => match kind {
            Kind::Gateway => print_one::<GatewayModel>(&source, &id).await?,
            Kind::Server => print_one::<ServerModel>(&source, &id).await?,
            Kind::Tool => print_one::<ToolModel>(&source, &id).await?,
            Kind::Resource => print_one::<ResourceModel>(&source, &id).await?,
            Kind::Prompt => print_one::<PromptModel>(&source, &id).await?,
            Kind::Root => print_one::<RootModel>(&source, &id).await?,
        },
        Commands::Delete { kind, id } => {
            match kind {
                Kind::Gateway => delete::<GatewayModel>(&client, &id).await?,
                Kind::Server => delete::<ServerModel>(&client, &id).await?,
                Kind::Tool => delete::<ToolModel>(&client, &id).await?,
                Kind::Resource => delete::<ResourceModel>(&client, &id).await?,
                Kind::Prompt => delete::<PromptModel>(&client, &id).await?,
                Kind::Root => delete::<RootModel>(&client, &id).await?,
            }
            tracing::info!(kind = ?kind, id = %id, "deleted");
        }
    }

    Ok(())
}

/// Explicit flags win over the config file, which wins over the environment.
fn build_client(
    config_path: Option<PathBuf>,
    endpoint: Option<String>,
    token: Option<String>,
) -> Result<Client> {
    let mut config = match resolve_config(config_path)? {
        Some(path) => ProviderConfig::load(&path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => ProviderConfig::default(),
    };
    if endpoint.is_some() {
        config.endpoint = endpoint;
    }
    if token.is_some() {
        config.bearer_token = token;
    }

    let resolved = config.resolve().context("Invalid provider configuration")?;
    tracing::debug!(endpoint = %resolved.endpoint, "using gateway endpoint");
    Ok(Client::new(&resolved))
}

/// Resolve config file path: explicit flag → ./forge-provider.toml →
/// <config dir>/forge-provider/config.toml. No file is fine: the
/// environment and built-in defaults apply.
fn resolve_config(explicit: Option<PathBuf>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Config file {} does not exist", path.display());
        }
        return Ok(Some(path));
    }

    let local = Path::new("forge-provider.toml");
    if local.exists() {
        return Ok(Some(local.to_path_buf()));
    }

    if let Some(config_dir) = dirs::config_dir() {
        let xdg = config_dir.join("forge-provider").join("config.toml");
        if xdg.exists() {
            return Ok(Some(xdg));
        }
    }

    Ok(None)
}

async fn print_list<M: Managed>(source: &DataSource, include_inactive: bool) -> Result<()> {
    let models = source
        .list::<M>(include_inactive)
        .await
        .with_context(|| format!("Failed to list {} entities", M::SCHEMA.kind))?;
    print_json(&models)
}

async fn print_one<M: Managed>(source: &DataSource, id: &str) -> Result<()> {
    let model = source
        .get::<M>(id)
        .await
        .with_context(|| format!("Failed to look up {} {}", M::SCHEMA.kind, id))?;
    print_json(&model)
}

async fn delete<M: Managed>(client: &Client, id: &str) -> Result<()> {
    client
        .delete::<M::Entity>(id)
        .await
        .with_context(|| format!("Failed to delete {} {}", M::SCHEMA.kind, id))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render JSON")?;
    println!("{rendered}");
    Ok(())
}
