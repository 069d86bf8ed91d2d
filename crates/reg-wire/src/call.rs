//! Outbound call boundary
//!
//! Anything that can deliver a [`Request`] to another instance implements
//! [`RemoteCall`]: the TCP client in production, an in-process router in
//! tests.

use std::any::type_name;

use async_trait::async_trait;
use reg_core::{RegError, RegResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Request;

/// Transport to peer instances
#[async_trait]
pub trait RemoteCall: Send + Sync {
    /// Deliver one request to `instance` and return the raw `result` member.
    ///
    /// Remote error objects come back as the decoded [`RegError`].
    async fn call(&self, instance: &str, request: Request) -> RegResult<Value>;
}

/// Call and decode the result into `T`.
///
/// A result that does not fit `T` is a `ResponseSchemaMismatch`.
pub async fn call_typed<T, C>(caller: &C, instance: &str, request: Request) -> RegResult<T>
where
    T: DeserializeOwned,
    C: RemoteCall + ?Sized,
{
    let value = caller.call(instance, request).await?;
    decode_result(value)
}

/// Decode a raw `result` member into `T`
pub fn decode_result<T: DeserializeOwned>(value: Value) -> RegResult<T> {
    serde_json::from_value(value).map_err(|e| RegError::ResponseSchemaMismatch {
        schema_name: short_type_name::<T>().to_string(),
        details: e.to_string(),
    })
}

fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GetAllParams, SyncResult};
    use serde_json::json;

    struct Fixed(RegResult<Value>);

    #[async_trait]
    impl RemoteCall for Fixed {
        async fn call(&self, _instance: &str, _request: Request) -> RegResult<Value> {
            self.0.clone()
        }
    }

    fn any_request() -> Request {
        Request::GetAll(GetAllParams {
            registry: "A".into(),
        })
    }

    #[tokio::test]
    async fn test_call_typed_decodes() {
        let caller = Fixed(Ok(json!({"sync_acceptance": []})));
        let result: SyncResult = call_typed(&caller, "i1", any_request()).await.unwrap();
        assert!(result.sync_acceptance.is_empty());
    }

    #[tokio::test]
    async fn test_call_typed_schema_mismatch() {
        let caller = Fixed(Ok(json!({"unexpected": 1})));
        let err = call_typed::<SyncResult, _>(&caller, "i1", any_request())
            .await
            .unwrap_err();
        match err {
            RegError::ResponseSchemaMismatch { schema_name, .. } => {
                assert_eq!(schema_name, "SyncResult")
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_call_typed_passes_errors() {
        let caller = Fixed(Err(RegError::Transport("refused".into())));
        let err = call_typed::<SyncResult, _>(&caller, "i1", any_request())
            .await
            .unwrap_err();
        assert_eq!(err, RegError::Transport("refused".into()));
    }
}
