//! In-process mesh simulator
//!
//! Every instance is a real [`RegNode`] behind an [`RpcProcessor`]. Calls
//! between them are serialized to JSON-RPC envelopes and back, so the
//! simulator exercises the same decode and dispatch path as TCP.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use reg_core::{Link, PartialValues, RegError, RegResult};
use reg_runtime::{RegNode, RpcProcessor};
use reg_state::{MemoryStore, RegistryStore};
use reg_transport::RequestHandler;
use reg_wire::{
    decode_result, GetAllParams, GetAllResult, JsonRequest, JsonResponse, PushAllParams,
    PushMultipleParams, RegMethod, RemoteCall, Request, SyncResult,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use crate::{ChaosConfig, ChaosState, ChaosStats, Fault, Verdict};

/// One routed call between instances
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRecord {
    pub instance: String,
    pub method: RegMethod,
    /// Sender's link, for sync calls
    pub source: Option<Link>,
    /// Addressed registry, for sync calls
    pub target: Option<Link>,
}

impl CallRecord {
    fn new(instance: &str, request: &Request) -> Self {
        let (source, target) = match request {
            Request::SyncMultiple(p) => (
                Some(p.source_link.clone()),
                Some(Link::new(instance, p.registry.clone())),
            ),
            Request::SyncAll(p) => (
                Some(p.source_link.clone()),
                Some(Link::new(instance, p.registry.clone())),
            ),
            _ => (None, None),
        };
        CallRecord {
            instance: instance.to_string(),
            method: request.method(),
            source,
            target,
        }
    }

    pub fn is_sync(&self) -> bool {
        self.target.is_some()
    }
}

type MeshNode = RegNode<MemoryStore, MeshCaller>;

struct Instance {
    store: Arc<MemoryStore>,
    handler: Arc<dyn RequestHandler>,
}

struct MeshInner {
    instances: RwLock<HashMap<String, Instance>>,
    chaos: Mutex<ChaosState>,
    calls: Mutex<Vec<CallRecord>>,
    next_id: AtomicU64,
    sync_timeout: Duration,
}

impl MeshInner {
    fn handler(&self, instance: &str) -> RegResult<Arc<dyn RequestHandler>> {
        self.instances
            .read()
            .get(instance)
            .map(|i| Arc::clone(&i.handler))
            .ok_or_else(|| RegError::Transport(format!("no route to {instance}")))
    }

    /// Deliver through the JSON envelope, without chaos or accounting
    async fn deliver(&self, instance: &str, request: Request) -> RegResult<Value> {
        let handler = self.handler(instance)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let envelope = JsonRequest::new(id, request.method().as_str(), request.params()?);

        // Through text, as on the wire
        let text = serde_json::to_string(&envelope).map_err(|e| RegError::Internal(e.to_string()))?;
        let envelope: JsonRequest =
            serde_json::from_str(&text).map_err(|e| RegError::Parse(e.to_string()))?;

        let response = handler.handle_request(envelope).await;
        let text = serde_json::to_string(&response).map_err(|e| RegError::Internal(e.to_string()))?;
        let response: JsonResponse = serde_json::from_str(&text).map_err(|e| {
            RegError::ResponseSchemaMismatch {
                schema_name: "JsonResponse".into(),
                details: e.to_string(),
            }
        })?;
        response.into_result()
    }

    /// Peer-to-peer call: recorded and subject to chaos
    async fn route(&self, instance: &str, request: Request) -> RegResult<Value> {
        self.calls.lock().push(CallRecord::new(instance, &request));

        let verdict = self.chaos.lock().decide(instance);
        trace!(instance, method = request.method().as_str(), ?verdict, "mesh call");
        match verdict {
            Verdict::Fail(Fault::Offline) => {
                return Err(RegError::Transport(format!("{instance} is offline")));
            }
            Verdict::Fail(Fault::Dropped) => {
                return Err(RegError::Transport(format!("call to {instance} dropped")));
            }
            Verdict::Hang => std::future::pending::<()>().await,
            Verdict::Deliver { latency } => {
                if !latency.is_zero() {
                    tokio::time::sleep(latency).await;
                }
            }
        }

        self.deliver(instance, request).await
    }
}

/// Transport handed to each node; holds the mesh weakly
#[derive(Clone)]
pub struct MeshCaller {
    mesh: Weak<MeshInner>,
}

#[async_trait]
impl RemoteCall for MeshCaller {
    async fn call(&self, instance: &str, request: Request) -> RegResult<Value> {
        let mesh = self
            .mesh
            .upgrade()
            .ok_or_else(|| RegError::Transport("mesh shut down".into()))?;
        mesh.route(instance, request).await
    }
}

/// Mesh builder
#[derive(Clone, Debug)]
pub struct MeshBuilder {
    chaos: ChaosConfig,
    seed: u64,
    sync_timeout: Duration,
}

impl Default for MeshBuilder {
    fn default() -> Self {
        MeshBuilder {
            chaos: ChaosConfig::clean(),
            seed: 0,
            sync_timeout: Duration::from_secs(1),
        }
    }
}

impl MeshBuilder {
    pub fn chaos(mut self, chaos: ChaosConfig) -> Self {
        self.chaos = chaos;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Per-call sync timeout on every node
    pub fn sync_timeout(mut self, timeout: Duration) -> Self {
        self.sync_timeout = timeout;
        self
    }

    pub fn build(self) -> MeshSimulator {
        MeshSimulator {
            inner: Arc::new(MeshInner {
                instances: RwLock::new(HashMap::new()),
                chaos: Mutex::new(ChaosState::new(self.chaos, self.seed)),
                calls: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                sync_timeout: self.sync_timeout,
            }),
        }
    }
}

/// In-process mesh of REG nodes
#[derive(Clone)]
pub struct MeshSimulator {
    inner: Arc<MeshInner>,
}

impl Default for MeshSimulator {
    fn default() -> Self {
        MeshSimulator::builder().build()
    }
}

impl MeshSimulator {
    pub fn builder() -> MeshBuilder {
        MeshBuilder::default()
    }

    /// Start a node for `instance` if there is none yet; returns its store
    pub fn add_instance(&self, instance: &str) -> Arc<MemoryStore> {
        let mut instances = self.inner.instances.write();
        if let Some(existing) = instances.get(instance) {
            return Arc::clone(&existing.store);
        }

        let store = Arc::new(MemoryStore::new());
        let caller = MeshCaller {
            mesh: Arc::downgrade(&self.inner),
        };
        let node: MeshNode = RegNode::new(instance, Arc::clone(&store), caller)
            .with_sync_timeout(self.inner.sync_timeout);
        instances.insert(
            instance.to_string(),
            Instance {
                store: Arc::clone(&store),
                handler: Arc::new(RpcProcessor::new(node)),
            },
        );
        store
    }

    /// Create the registry a link names, starting its instance as needed
    pub fn add_registry(&self, link: &Link) -> RegResult<()> {
        self.add_instance(&link.instance).create_registry(&link.registry)?;
        Ok(())
    }

    /// Add a one-way link
    pub fn link(&self, from: &Link, to: &Link) -> RegResult<bool> {
        self.store(&from.instance)?.add_link(&from.registry, to.clone())
    }

    /// Add links both ways
    pub fn link_both(&self, a: &Link, b: &Link) -> RegResult<()> {
        self.link(a, b)?;
        self.link(b, a)?;
        Ok(())
    }

    pub fn store(&self, instance: &str) -> RegResult<Arc<MemoryStore>> {
        self.inner
            .instances
            .read()
            .get(instance)
            .map(|i| Arc::clone(&i.store))
            .ok_or_else(|| RegError::Transport(format!("no instance {instance}")))
    }

    /// Client request to one node, outside chaos and accounting
    pub async fn request<T: DeserializeOwned>(&self, instance: &str, request: Request) -> RegResult<T> {
        let value = self.inner.deliver(instance, request).await?;
        decode_result(value)
    }

    /// Push a partial update from `origin`
    pub async fn push(&self, origin: &Link, values: PartialValues) -> RegResult<SyncResult> {
        self.request(
            &origin.instance,
            Request::PushMultiple(PushMultipleParams {
                registry: origin.registry.clone(),
                values,
            }),
        )
        .await
    }

    /// Push the full contents of `origin`
    pub async fn push_all(&self, origin: &Link) -> RegResult<SyncResult> {
        self.request(
            &origin.instance,
            Request::PushAll(PushAllParams {
                registry: origin.registry.clone(),
            }),
        )
        .await
    }

    /// Read a registry through its node
    pub async fn get_all(&self, link: &Link) -> RegResult<GetAllResult> {
        self.request(
            &link.instance,
            Request::GetAll(GetAllParams {
                registry: link.registry.clone(),
            }),
        )
        .await
    }

    /// Peer-to-peer calls routed so far
    pub fn calls(&self) -> Vec<CallRecord> {
        self.inner.calls.lock().clone()
    }

    /// Sync calls routed so far
    pub fn sync_calls(&self) -> Vec<CallRecord> {
        self.calls().into_iter().filter(CallRecord::is_sync).collect()
    }

    pub fn reset_calls(&self) {
        self.inner.calls.lock().clear();
        self.inner.chaos.lock().reset_stats();
    }

    pub fn chaos_stats(&self) -> ChaosStats {
        self.inner.chaos.lock().stats().clone()
    }

    pub fn set_offline(&self, instance: &str, offline: bool) {
        let mut chaos = self.inner.chaos.lock();
        let set = &mut chaos.config_mut().offline;
        if offline {
            set.insert(instance.to_string());
        } else {
            set.remove(instance);
        }
    }

    pub fn set_hanging(&self, instance: &str, hanging: bool) {
        let mut chaos = self.inner.chaos.lock();
        let set = &mut chaos.config_mut().hanging;
        if hanging {
            set.insert(instance.to_string());
        } else {
            set.remove(instance);
        }
    }

    pub fn instance_count(&self) -> usize {
        self.inner.instances.read().len()
    }
}

#[async_trait]
impl RemoteCall for MeshSimulator {
    async fn call(&self, instance: &str, request: Request) -> RegResult<Value> {
        self.inner.route(instance, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reg_core::RegisterKey;
    use reg_wire::{call_typed, ListLinksParams, ListLinksResult};

    #[tokio::test]
    async fn test_request_reaches_node() {
        let mesh = MeshSimulator::default();
        let a = Link::new("n1", "A");
        mesh.add_registry(&a).unwrap();
        mesh.link(&a, &Link::new("n2", "B")).unwrap();

        let links: ListLinksResult = mesh
            .request(
                "n1",
                Request::ListLinks(ListLinksParams {
                    registry: "A".into(),
                }),
            )
            .await
            .unwrap();
        assert_eq!(links.links, vec![Link::new("n2", "B")]);
        assert!(mesh.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_instance_is_transport_error() {
        let mesh = MeshSimulator::default();
        let err = mesh
            .call(
                "nowhere",
                Request::GetAll(GetAllParams {
                    registry: "A".into(),
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RegError::Transport(_)));
        assert_eq!(mesh.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_remote_errors_survive_the_envelope() {
        let mesh = MeshSimulator::default();
        mesh.add_instance("n1");
        let err = call_typed::<GetAllResult, _>(
            &mesh,
            "n1",
            Request::GetAll(GetAllParams {
                registry: "ghost".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err,
            RegError::RegistryDoesNotExist {
                reference: "ghost".into()
            }
        );
    }

    #[tokio::test]
    async fn test_push_records_sync_calls() {
        let mesh = MeshSimulator::default();
        let a = Link::new("n1", "A");
        let b = Link::new("n2", "B");
        mesh.add_registry(&a).unwrap();
        mesh.add_registry(&b).unwrap();
        mesh.link_both(&a, &b).unwrap();

        let mut values = PartialValues::new();
        values.insert(RegisterKey::A, Some("1".into()));
        let result = mesh.push(&a, values).await.unwrap();

        assert_eq!(result.verdict(&b), Some(true));
        let calls = mesh.sync_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].source, Some(a));
        assert_eq!(calls[0].target, Some(b.clone()));
        assert_eq!(mesh.get_all(&b).await.unwrap().values[&RegisterKey::A], "1");
    }

    #[test]
    fn test_add_instance_is_idempotent() {
        let mesh = MeshSimulator::default();
        let first = mesh.add_instance("n1");
        let again = mesh.add_instance("n1");
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(mesh.instance_count(), 1);
    }
}
