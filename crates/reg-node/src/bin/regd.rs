//! regd - REG mesh node daemon

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use reg_runtime::{init_tracing, spawn, NodeConfig};
use tracing::info;

/// A REG mesh node: serves registries over JSON-RPC and floods pushes to
/// linked registries.
#[derive(Parser, Debug, Clone)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[clap(long, short)]
    config: Option<PathBuf>,
    /// Address to bind, overrides `listen` from the file.
    #[clap(long)]
    listen: Option<String>,
    /// Address advertised to peers, overrides `instance` from the file.
    #[clap(long)]
    instance: Option<String>,
    /// Registry to create at startup. May be repeated.
    #[clap(long = "registry", short)]
    registries: Vec<String>,
}

impl Cli {
    fn config(&self) -> Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => NodeConfig::default(),
        };

        if let Some(listen) = &self.listen {
            config.listen = listen.clone();
        }
        if let Some(instance) = &self.instance {
            config.instance = Some(instance.clone());
        }
        for name in &self.registries {
            config.add_registry(name.clone());
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config()?;
    init_tracing(&config.log)?;

    let node = spawn(&config).await.context("starting node")?;
    info!(
        addr = %node.local_addr(),
        instance = node.instance(),
        "regd ready"
    );

    tokio::signal::ctrl_c()
        .await
        .context("waiting for ctrl-c")?;
    info!("shutting down");
    node.shutdown().await?;
    Ok(())
}
