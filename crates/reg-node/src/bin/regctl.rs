//! regctl - command-line client for a REG mesh node

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reg_core::{Link, RegisterKey};
use reg_node::{parse_full, parse_partial};
use reg_transport::TcpClient;
use reg_wire::{
    ClearAndReplaceParams, FrameCodec, GetAllParams, GetMultipleParams, LinkParams,
    ListLinksParams, PushAllParams, PushMultipleParams, RegistryInfoParams, RemoteCall, Request,
    SetMultipleParams,
};

/// Talk to a REG mesh node.
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// Node address.
    #[clap(long, short, default_value = "127.0.0.1:7100")]
    node: String,
    /// Overall deadline for the call, e.g. `5s` or `500ms`.
    #[clap(long, default_value = "30s", value_parser = humantime::parse_duration)]
    timeout: Duration,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether a registry exists.
    Info { reference: String },
    /// Read some registers.
    Get {
        registry: String,
        #[clap(required = true)]
        keys: Vec<RegisterKey>,
    },
    /// Read every set register.
    GetAll { registry: String },
    /// Set registers locally: `key=value`, or a bare `key` to clear.
    Set {
        registry: String,
        #[clap(required = true)]
        assignments: Vec<String>,
    },
    /// Replace the whole registry locally with `key=value` pairs.
    Replace {
        registry: String,
        assignments: Vec<String>,
    },
    /// List a registry's links.
    Links { registry: String },
    /// Link a registry to `registry@instance`.
    Link { registry: String, link: Link },
    /// Remove a link.
    Unlink { registry: String, link: Link },
    /// Set registers and flood the change to linked registries.
    Push {
        registry: String,
        #[clap(required = true)]
        assignments: Vec<String>,
    },
    /// Flood the registry's full contents to linked registries.
    PushAll { registry: String },
}

impl Command {
    fn into_request(self) -> Result<Request> {
        Ok(match self {
            Command::Info { reference } => Request::RegistryInfo(RegistryInfoParams { reference }),
            Command::Get { registry, keys } => {
                Request::GetMultiple(GetMultipleParams { registry, keys })
            }
            Command::GetAll { registry } => Request::GetAll(GetAllParams { registry }),
            Command::Set {
                registry,
                assignments,
            } => Request::SetMultiple(SetMultipleParams {
                registry,
                values: parse_partial(&assignments)?,
            }),
            Command::Replace {
                registry,
                assignments,
            } => Request::ClearAndReplace(ClearAndReplaceParams {
                registry,
                values: parse_full(&assignments)?,
            }),
            Command::Links { registry } => Request::ListLinks(ListLinksParams { registry }),
            Command::Link { registry, link } => Request::AddLink(LinkParams { registry, link }),
            Command::Unlink { registry, link } => {
                Request::RemoveLink(LinkParams { registry, link })
            }
            Command::Push {
                registry,
                assignments,
            } => Request::PushMultiple(PushMultipleParams {
                registry,
                values: parse_partial(&assignments)?,
            }),
            Command::PushAll { registry } => Request::PushAll(PushAllParams { registry }),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let request = cli.command.into_request()?;
    let method = request.method();

    let client = TcpClient::new(FrameCodec::default());
    let result = tokio::time::timeout(cli.timeout, client.call(&cli.node, request))
        .await
        .with_context(|| format!("{} timed out after {:?}", method.as_str(), cli.timeout))?
        .with_context(|| format!("{} failed on {}", method.as_str(), cli.node))?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
