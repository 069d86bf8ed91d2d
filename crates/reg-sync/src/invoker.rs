//! Remote sync invoker
//!
//! Turns one flood edge into one outbound `sync-multiple` or `sync-all`
//! call and absorbs every failure of that call into a rejection.

use std::time::Duration;

use async_trait::async_trait;
use reg_core::{FullValues, Link, PartialValues, RegError, SyncAcceptance};
use reg_wire::{call_typed, RemoteCall, Request, SyncAllParams, SyncMultipleParams, SyncResult};
use tracing::{debug, warn};

use crate::RemoteSync;

/// Default bound on one outbound sync call, including the peer's own flood
pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(5);

/// Share of a hop's budget its receiver gives to its own outbound calls
const NESTED_BUDGET: f64 = 0.75;

/// Per-call timeout for a flood continued by the receiver of a sync hop.
///
/// `budget` is how long the sender waits for the hop. The result is
/// strictly shorter, so along any call chain the deepest timeout fires
/// first and every hop above it still gets its report back in time.
pub fn nested_timeout(budget: Duration, local: Duration) -> Duration {
    budget.mul_f64(NESTED_BUDGET).min(local)
}

/// Values carried by a flood
#[derive(Clone, Debug, PartialEq)]
pub enum SyncPayload {
    /// Partial merge; `None` clears a key
    Multiple(PartialValues),
    /// Full replacement
    All(FullValues),
}

impl SyncPayload {
    /// Build the request addressed at `to`, telling it how long we wait
    pub fn request(&self, from: &Link, visited: &[Link], to: &Link, timeout: Duration) -> Request {
        let timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        match self {
            SyncPayload::Multiple(values) => Request::SyncMultiple(SyncMultipleParams {
                source_link: from.clone(),
                visited_registries: visited.to_vec(),
                registry: to.registry.clone(),
                values: values.clone(),
                timeout_ms,
            }),
            SyncPayload::All(values) => Request::SyncAll(SyncAllParams {
                source_link: from.clone(),
                visited_registries: visited.to_vec(),
                registry: to.registry.clone(),
                values: values.clone(),
                timeout_ms,
            }),
        }
    }
}

/// [`RemoteSync`] over a [`RemoteCall`] transport
pub struct RpcSync<'a, C: ?Sized> {
    caller: &'a C,
    payload: SyncPayload,
    timeout: Duration,
}

impl<'a, C: RemoteCall + ?Sized> RpcSync<'a, C> {
    pub fn new(caller: &'a C, payload: SyncPayload) -> Self {
        RpcSync {
            caller,
            payload,
            timeout: DEFAULT_SYNC_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn try_sync(
        &self,
        from: &Link,
        visited: &[Link],
        to: &Link,
    ) -> Result<Vec<SyncAcceptance>, RegError> {
        let request = self.payload.request(from, visited, to, self.timeout);
        let call = call_typed::<SyncResult, C>(self.caller, &to.instance, request);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => Ok(result?.sync_acceptance),
            Err(_) => Err(RegError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl<'a, C: RemoteCall + ?Sized> RemoteSync for RpcSync<'a, C> {
    async fn sync_to(&self, from: &Link, visited: &[Link], to: &Link) -> Vec<SyncAcceptance> {
        match self.try_sync(from, visited, to).await {
            Ok(acceptance) => {
                debug!(from = %from, to = %to, reported = acceptance.len(), "sync delivered");
                acceptance
            }
            Err(e) => {
                warn!(from = %from, to = %to, code = e.code(), error = %e, "sync failed");
                vec![SyncAcceptance::rejected(to.clone())]
            }
        }
    }
}
