//! JSON-RPC request processing
//!
//! Envelope check, typed decode, one exhaustive dispatch.

use async_trait::async_trait;
use reg_core::{RegError, RegResult};
use reg_transport::RequestHandler;
use reg_wire::{JsonRequest, JsonResponse, Request};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::RegService;

/// [`RequestHandler`] in front of a [`RegService`]
pub struct RpcProcessor<T> {
    service: T,
}

impl<T: RegService> RpcProcessor<T> {
    pub fn new(service: T) -> Self {
        RpcProcessor { service }
    }

    pub fn service(&self) -> &T {
        &self.service
    }

    /// Decode and run one request
    pub async fn process(&self, request: JsonRequest) -> RegResult<Value> {
        request.check_version()?;
        let request = Request::from_parts(&request.method, request.params)?;
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request) -> RegResult<Value> {
        let service = &self.service;
        match request {
            Request::RegistryInfo(p) => to_value(service.registry_info(p).await?),
            Request::GetMultiple(p) => to_value(service.get_multiple(p).await?),
            Request::GetAll(p) => to_value(service.get_all(p).await?),
            Request::SetMultiple(p) => to_value(service.set_multiple(p).await?),
            Request::ClearAndReplace(p) => to_value(service.clear_and_replace(p).await?),
            Request::ListLinks(p) => to_value(service.list_links(p).await?),
            Request::AddLink(p) => to_value(service.add_link(p).await?),
            Request::RemoveLink(p) => to_value(service.remove_link(p).await?),
            Request::SyncMultiple(p) => to_value(service.sync_multiple(p).await?),
            Request::SyncAll(p) => to_value(service.sync_all(p).await?),
            Request::PushMultiple(p) => to_value(service.push_multiple(p).await?),
            Request::PushAll(p) => to_value(service.push_all(p).await?),
        }
    }
}

#[async_trait]
impl<T: RegService> RequestHandler for RpcProcessor<T> {
    async fn handle_request(&self, request: JsonRequest) -> JsonResponse {
        let id = request.id;
        let method = request.method.clone();

        let outcome = self.process(request).await;
        if let Err(e) = &outcome {
            debug!(%method, code = e.code(), error = %e, "request failed");
        }
        JsonResponse::from_result(id, outcome)
    }
}

fn to_value<R: Serialize>(result: R) -> RegResult<Value> {
    serde_json::to_value(result).map_err(|e| RegError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RegNode;
    use reg_core::Link;
    use reg_state::{MemoryStore, RegistryStore};
    use reg_wire::RemoteCall;
    use serde_json::json;
    use std::sync::Arc;

    struct NoPeers;

    #[async_trait]
    impl RemoteCall for NoPeers {
        async fn call(&self, instance: &str, _request: Request) -> RegResult<Value> {
            Err(RegError::Transport(format!("{instance} unreachable")))
        }
    }

    fn processor() -> RpcProcessor<RegNode<MemoryStore, NoPeers>> {
        let store = Arc::new(MemoryStore::new());
        store.create_registry("A").unwrap();
        store.add_link("A", Link::new("i2", "B")).unwrap();
        RpcProcessor::new(RegNode::new("i1", store, NoPeers))
    }

    async fn call(processor: &impl RequestHandler, method: &str, params: Value) -> JsonResponse {
        processor
            .handle_request(JsonRequest::new(7, method, params))
            .await
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let p = processor();
        let set = call(
            &p,
            "reg.set-multiple",
            json!({"registry": "A", "values": {"a": "1", "\"": "clip"}}),
        )
        .await;
        assert_eq!(set.id, Some(7));
        assert_eq!(set.result, Some(json!({})));

        let got = call(
            &p,
            "reg.get-multiple",
            json!({"registry": "A", "keys": ["a", "b", "\""]}),
        )
        .await;
        assert_eq!(
            got.result,
            Some(json!({"values": {"\"": "clip", "a": "1", "b": null}}))
        );
    }

    #[tokio::test]
    async fn test_unknown_register_is_11005() {
        let p = processor();
        let response = call(
            &p,
            "reg.set-multiple",
            json!({"registry": "A", "values": {"AA": "x"}}),
        )
        .await;
        let error = response.error.unwrap();
        assert_eq!(error.code, 11005);
        assert!(p.service().store().get_all("A").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = call(&processor(), "reg.frobnicate", json!({})).await;
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_bad_version() {
        let mut request = JsonRequest::new(1, "reg.get-all", json!({"registry": "A"}));
        request.jsonrpc = "1.0".into();
        let response = processor().handle_request(request).await;
        assert_eq!(response.error.unwrap().code, -32600);
    }

    #[tokio::test]
    async fn test_missing_registry_is_11003() {
        let response = call(&processor(), "reg.get-all", json!({"registry": "nope"})).await;
        let error = response.error.unwrap();
        assert_eq!(error.code, 11003);
        assert_eq!(error.message, "Registry does not exist");
    }

    #[tokio::test]
    async fn test_unlinked_sync_is_11006() {
        let p = processor();
        let response = call(
            &p,
            "reg.sync-multiple",
            json!({
                "source_link": {"instance": "i9", "registry": "X"},
                "visited_registries": [],
                "registry": "A",
                "values": {"k": "v"}
            }),
        )
        .await;
        assert_eq!(response.error.unwrap().code, 11006);
        assert!(p.service().store().get_all("A").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_push_reports_acceptance() {
        let response = call(
            &processor(),
            "reg.push-multiple",
            json!({"registry": "A", "values": {"k": "v"}}),
        )
        .await;
        assert_eq!(
            response.result,
            Some(json!({
                "sync_acceptance": [
                    {"link": {"instance": "i2", "registry": "B"}, "accepted": false},
                    {"link": {"instance": "i1", "registry": "A"}, "accepted": true}
                ]
            }))
        );
    }
}
