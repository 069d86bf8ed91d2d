//! JSON-RPC 2.0 object definitions

use reg_core::{ApiError, RegError, RegResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version carried by every object
pub const JSONRPC_VERSION: &str = "2.0";

/// Request ID. `None` is serialized as `null`.
pub type RequestId = Option<u64>;

/// A JSON-RPC request object
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: RequestId,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl JsonRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        JsonRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            method: method.into(),
            params,
        }
    }

    /// Reject envelopes that are not JSON-RPC 2.0
    pub fn check_version(&self) -> RegResult<()> {
        if self.jsonrpc != JSONRPC_VERSION {
            return Err(RegError::InvalidRequest(format!(
                "unsupported jsonrpc version {:?}",
                self.jsonrpc
            )));
        }
        Ok(())
    }
}

/// A JSON-RPC response object, carrying either `result` or `error`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl JsonResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        JsonResponse {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: RequestId, error: ApiError) -> Self {
        JsonResponse {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    pub fn from_result(id: RequestId, outcome: RegResult<Value>) -> Self {
        match outcome {
            Ok(value) => JsonResponse::success(id, value),
            Err(err) => JsonResponse::failure(id, err.to_api_error()),
        }
    }

    /// Collapse into the outcome, decoding a typed error when possible.
    ///
    /// A response with neither member is a schema mismatch.
    pub fn into_result(self) -> RegResult<Value> {
        match (self.result, self.error) {
            (_, Some(error)) => Err(RegError::from_api_error(error)),
            (Some(result), None) => Ok(result),
            (None, None) => Err(RegError::ResponseSchemaMismatch {
                schema_name: "JsonResponse".into(),
                details: "neither result nor error present".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let req: JsonRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"reg.get-all"}"#).unwrap();
        assert_eq!(req.id, None);
        assert_eq!(req.params, Value::Null);
        assert!(req.check_version().is_ok());
    }

    #[test]
    fn test_wrong_version_rejected() {
        let req = JsonRequest {
            jsonrpc: "1.0".into(),
            id: Some(1),
            method: "reg.get-all".into(),
            params: Value::Null,
        };
        assert!(matches!(req.check_version(), Err(RegError::InvalidRequest(_))));
    }

    #[test]
    fn test_response_success_shape() {
        let resp = JsonResponse::success(Some(7), serde_json::json!({}));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, serde_json::json!({"jsonrpc": "2.0", "id": 7, "result": {}}));
    }

    #[test]
    fn test_response_error_decodes_typed() {
        let err = RegError::RegistryDoesNotExist {
            reference: "x".into(),
        };
        let resp = JsonResponse::from_result(Some(1), Err(err.clone()));
        let wire = serde_json::to_string(&resp).unwrap();
        let back: JsonResponse = serde_json::from_str(&wire).unwrap();
        assert_eq!(back.into_result(), Err(err));
    }

    #[test]
    fn test_empty_response_is_schema_mismatch() {
        let resp: JsonResponse = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1}"#).unwrap();
        assert!(matches!(
            resp.into_result(),
            Err(RegError::ResponseSchemaMismatch { .. })
        ));
    }
}
