//! Inbound request seam

use async_trait::async_trait;
use reg_wire::{JsonRequest, JsonResponse};

/// Handler for inbound JSON-RPC requests.
///
/// Always produces a response; failures travel as error objects.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle_request(&self, request: JsonRequest) -> JsonResponse;
}
