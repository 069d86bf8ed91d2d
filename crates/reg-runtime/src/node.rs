//! REG Node - registry operations for one instance

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reg_core::{Link, RegError, RegResult};
use reg_state::RegistryStore;
use reg_sync::{nested_timeout, propagate, RpcSync, SyncPayload, DEFAULT_SYNC_TIMEOUT};
use reg_wire::{
    AddLinkResult, ClearAndReplaceParams, EmptyResult, GetAllParams, GetAllResult,
    GetMultipleParams, GetMultipleResult, LinkParams, ListLinksParams, ListLinksResult,
    PushAllParams, PushMultipleParams, RegistryInfoParams, RegistryInfoResult, RemoteCall,
    RemoveLinkResult, SetMultipleParams, SyncAllParams, SyncMultipleParams, SyncResult,
};
use tracing::{debug, info, warn};

use crate::RegService;

/// Registry service of one instance
pub struct RegNode<S, C> {
    /// Address peers use to reach this node
    instance: String,
    store: Arc<S>,
    caller: C,
    sync_timeout: Duration,
}

impl<S: RegistryStore, C: RemoteCall> RegNode<S, C> {
    pub fn new(instance: impl Into<String>, store: Arc<S>, caller: C) -> Self {
        RegNode {
            instance: instance.into(),
            store,
            caller,
            sync_timeout: DEFAULT_SYNC_TIMEOUT,
        }
    }

    pub fn with_sync_timeout(mut self, timeout: Duration) -> Self {
        self.sync_timeout = timeout;
        self
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Link naming `registry` on this node
    pub fn link_of(&self, registry: &str) -> Link {
        Link::new(self.instance.clone(), registry)
    }

    /// Refuse a push from a registry that `registry` does not link to
    fn check_linked(&self, registry: &str, source_link: &Link) -> RegResult<()> {
        let links = self.store.read_links(registry)?;
        if links.contains(source_link) {
            return Ok(());
        }
        warn!(
            registry,
            source = %source_link,
            "rejected sync from unlinked registry"
        );
        Err(RegError::RejectedUnlinkedSync {
            source_link: source_link.clone(),
            registry: registry.to_string(),
        })
    }

    /// Per-call timeout when continuing a flood whose sender waits `budget_ms`
    fn hop_timeout(&self, budget_ms: Option<u64>) -> Duration {
        let budget = budget_ms.map_or(self.sync_timeout, Duration::from_millis);
        nested_timeout(budget, self.sync_timeout)
    }

    /// Continue or start a flood from `registry` with its current links
    async fn flood(
        &self,
        registry: &str,
        visited: Vec<Link>,
        payload: SyncPayload,
        timeout: Duration,
    ) -> RegResult<SyncResult> {
        let links = self.store.read_links(registry)?;
        let remote = RpcSync::new(&self.caller, payload).with_timeout(timeout);
        let acceptance = propagate(&self.instance, registry, visited, &links, &remote).await;
        Ok(SyncResult::new(acceptance))
    }
}

#[async_trait]
impl<S: RegistryStore, C: RemoteCall> RegService for RegNode<S, C> {
    async fn registry_info(&self, params: RegistryInfoParams) -> RegResult<RegistryInfoResult> {
        let id = self.store.registry_info(&params.reference);
        Ok(RegistryInfoResult {
            exists: id.is_some(),
            id,
        })
    }

    async fn get_multiple(&self, params: GetMultipleParams) -> RegResult<GetMultipleResult> {
        let values = self.store.get_multiple(&params.registry, &params.keys)?;
        Ok(GetMultipleResult { values })
    }

    async fn get_all(&self, params: GetAllParams) -> RegResult<GetAllResult> {
        let values = self.store.get_all(&params.registry)?;
        Ok(GetAllResult { values })
    }

    async fn set_multiple(&self, params: SetMultipleParams) -> RegResult<EmptyResult> {
        self.store.apply_partial(&params.registry, &params.values)?;
        Ok(EmptyResult {})
    }

    async fn clear_and_replace(&self, params: ClearAndReplaceParams) -> RegResult<EmptyResult> {
        self.store.apply_full(&params.registry, &params.values)?;
        Ok(EmptyResult {})
    }

    async fn list_links(&self, params: ListLinksParams) -> RegResult<ListLinksResult> {
        let links = self.store.read_links(&params.registry)?;
        Ok(ListLinksResult { links })
    }

    async fn add_link(&self, params: LinkParams) -> RegResult<AddLinkResult> {
        params
            .link
            .validate()
            .map_err(|e| RegError::InvalidParams(e.to_string()))?;
        if params.link == self.link_of(&params.registry) {
            return Err(RegError::InvalidParams(format!(
                "{} cannot link to itself",
                params.link
            )));
        }
        let added = self.store.add_link(&params.registry, params.link)?;
        Ok(AddLinkResult { added })
    }

    async fn remove_link(&self, params: LinkParams) -> RegResult<RemoveLinkResult> {
        let removed = self.store.remove_link(&params.registry, &params.link)?;
        Ok(RemoveLinkResult { removed })
    }

    async fn sync_multiple(&self, params: SyncMultipleParams) -> RegResult<SyncResult> {
        let SyncMultipleParams {
            source_link,
            visited_registries,
            registry,
            values,
            timeout_ms,
        } = params;

        self.check_linked(&registry, &source_link)?;
        self.store.apply_partial(&registry, &values)?;
        debug!(registry = %registry, source = %source_link, keys = values.len(), "applied sync");

        let timeout = self.hop_timeout(timeout_ms);
        self.flood(&registry, visited_registries, SyncPayload::Multiple(values), timeout)
            .await
    }

    async fn sync_all(&self, params: SyncAllParams) -> RegResult<SyncResult> {
        let SyncAllParams {
            source_link,
            visited_registries,
            registry,
            values,
            timeout_ms,
        } = params;

        self.check_linked(&registry, &source_link)?;
        self.store.apply_full(&registry, &values)?;
        debug!(registry = %registry, source = %source_link, keys = values.len(), "applied full sync");

        let timeout = self.hop_timeout(timeout_ms);
        self.flood(&registry, visited_registries, SyncPayload::All(values), timeout)
            .await
    }

    async fn push_multiple(&self, params: PushMultipleParams) -> RegResult<SyncResult> {
        self.store.apply_partial(&params.registry, &params.values)?;
        info!(registry = %params.registry, keys = params.values.len(), "push");

        let payload = SyncPayload::Multiple(params.values);
        self.flood(&params.registry, Vec::new(), payload, self.sync_timeout)
            .await
    }

    async fn push_all(&self, params: PushAllParams) -> RegResult<SyncResult> {
        let values = self.store.get_all(&params.registry)?;
        info!(registry = %params.registry, keys = values.len(), "push all");

        self.flood(&params.registry, Vec::new(), SyncPayload::All(values), self.sync_timeout)
            .await
    }
}
