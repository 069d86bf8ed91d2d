//! Registry service capability
//!
//! One method per registry operation. [`crate::RpcProcessor`] decodes
//! inbound requests and calls into whatever implements this.

use async_trait::async_trait;
use reg_core::RegResult;
use reg_wire::{
    AddLinkResult, ClearAndReplaceParams, EmptyResult, GetAllParams, GetAllResult,
    GetMultipleParams, GetMultipleResult, LinkParams, ListLinksParams, ListLinksResult,
    PushAllParams, PushMultipleParams, RegistryInfoParams, RegistryInfoResult, RemoveLinkResult,
    SetMultipleParams, SyncAllParams, SyncMultipleParams, SyncResult,
};

#[async_trait]
pub trait RegService: Send + Sync {
    async fn registry_info(&self, params: RegistryInfoParams) -> RegResult<RegistryInfoResult>;

    async fn get_multiple(&self, params: GetMultipleParams) -> RegResult<GetMultipleResult>;

    async fn get_all(&self, params: GetAllParams) -> RegResult<GetAllResult>;

    /// Local partial update, no flood
    async fn set_multiple(&self, params: SetMultipleParams) -> RegResult<EmptyResult>;

    /// Local full replacement, no flood
    async fn clear_and_replace(&self, params: ClearAndReplaceParams) -> RegResult<EmptyResult>;

    async fn list_links(&self, params: ListLinksParams) -> RegResult<ListLinksResult>;

    async fn add_link(&self, params: LinkParams) -> RegResult<AddLinkResult>;

    async fn remove_link(&self, params: LinkParams) -> RegResult<RemoveLinkResult>;

    /// Inbound partial push from a linked peer
    async fn sync_multiple(&self, params: SyncMultipleParams) -> RegResult<SyncResult>;

    /// Inbound full push from a linked peer
    async fn sync_all(&self, params: SyncAllParams) -> RegResult<SyncResult>;

    /// Apply locally, then start a flood
    async fn push_multiple(&self, params: PushMultipleParams) -> RegResult<SyncResult>;

    /// Flood the registry's current contents
    async fn push_all(&self, params: PushAllParams) -> RegResult<SyncResult>;
}
