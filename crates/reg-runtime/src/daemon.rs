//! Daemon - a configured node serving JSON-RPC over TCP

use std::net::SocketAddr;
use std::sync::Arc;

use reg_core::{Link, RegError, RegResult};
use reg_state::{MemoryStore, RegistryStore};
use reg_transport::{RequestHandler, RpcServer, TcpClient};
use reg_wire::FrameCodec;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::{ConfigError, NodeConfig, RegNode, RpcProcessor};

#[derive(Error, Debug)]
pub enum DaemonError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Reg(#[from] RegError),
}

/// Running node
pub struct NodeHandle {
    local_addr: SocketAddr,
    instance: String,
    store: Arc<MemoryStore>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<RegResult<()>>,
}

impl NodeHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Address advertised in this node's links
    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// Link naming `registry` on this node
    pub fn link(&self, registry: &str) -> Link {
        Link::new(self.instance.clone(), registry)
    }

    /// Stop accepting connections and wait for the accept loop to end
    pub async fn shutdown(self) -> RegResult<()> {
        let _ = self.shutdown.send(true);
        self.task
            .await
            .map_err(|e| RegError::Internal(format!("server task failed: {e}")))?
    }
}

/// Build the in-memory store from configuration
pub fn build_store(config: &NodeConfig, instance: &str) -> Result<MemoryStore, DaemonError> {
    config.validate()?;
    let store = MemoryStore::new();

    for registry in &config.registries {
        store.create_registry(&registry.name)?;
        for link in registry.parsed_links()? {
            if link.instance == instance && link.registry == registry.name {
                return Err(ConfigError::InvalidLink {
                    registry: registry.name.clone(),
                    link: link.to_string(),
                    reason: "a registry cannot link to itself".into(),
                }
                .into());
            }
            store.add_link(&registry.name, link)?;
        }
    }
    Ok(store)
}

/// Bind, seed the store and start serving
pub async fn spawn(config: &NodeConfig) -> Result<NodeHandle, DaemonError> {
    config.validate()?;

    let codec = FrameCodec::new(config.max_frame_size);
    let server = RpcServer::bind(config.listen.as_str(), codec).await?;
    let local_addr = server.local_addr();
    let instance = config
        .instance
        .clone()
        .unwrap_or_else(|| local_addr.to_string());

    let store = Arc::new(build_store(config, &instance)?);
    let client = TcpClient::new(codec).with_connect_timeout(config.connect_timeout);
    let node = RegNode::new(instance.clone(), Arc::clone(&store), client)
        .with_sync_timeout(config.sync_timeout);
    let handler: Arc<dyn RequestHandler> = Arc::new(RpcProcessor::new(node));

    let (shutdown, rx) = watch::channel(false);
    let task = tokio::spawn(server.serve(handler, rx));

    info!(
        %local_addr,
        instance = %instance,
        registries = store.len(),
        "node started"
    );

    Ok(NodeHandle {
        local_addr,
        instance,
        store,
        shutdown,
        task,
    })
}
