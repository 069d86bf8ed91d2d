//! Error types for the REG mesh
//!
//! Every failure that crosses a process boundary is an [`ApiError`]
//! `(code, message, data)`. [`RegError`] is the typed form used inside the
//! crates; the two convert losslessly for the registry-specific codes.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::Link;

/// Numeric error codes.
/// `[-32768, -32000]` are the JSON-RPC reserved codes, `110xx` are registry codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    RegistryDoesNotExist,
    ResponseSchemaMismatch,
    InvalidRegisterName,
    RejectedUnlinkedSync,
}

impl ErrorCode {
    pub fn code(self) -> i64 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::RegistryDoesNotExist => 11003,
            Self::ResponseSchemaMismatch => 11004,
            Self::InvalidRegisterName => 11005,
            Self::RejectedUnlinkedSync => 11006,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            -32700 => Self::ParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            11003 => Self::RegistryDoesNotExist,
            11004 => Self::ResponseSchemaMismatch,
            11005 => Self::InvalidRegisterName,
            11006 => Self::RejectedUnlinkedSync,
            _ => return None,
        })
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::ParseError => "parse error",
            Self::InvalidRequest => "invalid request",
            Self::MethodNotFound => "method not found",
            Self::InvalidParams => "invalid params",
            Self::InternalError => "internal error",
            Self::RegistryDoesNotExist => "Registry does not exist",
            Self::ResponseSchemaMismatch => "Response schema does not match",
            Self::InvalidRegisterName => "Invalid register name",
            Self::RejectedUnlinkedSync => "Rejected sync from unlinked registry",
        }
    }
}

/// Wire error object
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, data: Option<Value>) -> Self {
        ApiError {
            code: code.code(),
            message: code.message().to_string(),
            data,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RegistryDoesNotExistData {
    reference: String,
}

#[derive(Serialize, Deserialize)]
struct ResponseSchemaMismatchData {
    schema_name: String,
    details: String,
}

#[derive(Serialize, Deserialize)]
struct InvalidRegisterNameData {
    name: String,
}

#[derive(Serialize, Deserialize)]
struct RejectedUnlinkedSyncData {
    source_link: Link,
    registry: String,
}

/// Core REG errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegError {
    // Registry errors
    #[error("Registry does not exist: {reference}")]
    RegistryDoesNotExist { reference: String },

    #[error("Response schema {schema_name} does not match: {details}")]
    ResponseSchemaMismatch { schema_name: String, details: String },

    #[error("Invalid register name: {name:?}")]
    InvalidRegisterName { name: String },

    #[error("Rejected sync from unlinked registry {source_link} into {registry}")]
    RejectedUnlinkedSync { source_link: Link, registry: String },

    #[error("Invalid link: {0}")]
    InvalidLink(String),

    // Protocol errors
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Frame too large: {size} > {max}")]
    FrameTooLarge { size: usize, max: usize },

    // Transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Error object from a peer that has no typed counterpart
    #[error("Remote error {}: {}", .0.code, .0.message)]
    Remote(ApiError),
}

impl RegError {
    pub fn code(&self) -> i64 {
        match self {
            RegError::Remote(api) => api.code,
            other => other.error_code().code(),
        }
    }

    fn error_code(&self) -> ErrorCode {
        match self {
            RegError::RegistryDoesNotExist { .. } => ErrorCode::RegistryDoesNotExist,
            RegError::ResponseSchemaMismatch { .. } => ErrorCode::ResponseSchemaMismatch,
            RegError::InvalidRegisterName { .. } => ErrorCode::InvalidRegisterName,
            RegError::RejectedUnlinkedSync { .. } => ErrorCode::RejectedUnlinkedSync,
            RegError::InvalidLink(_) | RegError::InvalidParams(_) => ErrorCode::InvalidParams,
            RegError::Parse(_) => ErrorCode::ParseError,
            RegError::InvalidRequest(_) | RegError::FrameTooLarge { .. } => {
                ErrorCode::InvalidRequest
            }
            RegError::MethodNotFound(_) => ErrorCode::MethodNotFound,
            RegError::Transport(_)
            | RegError::Timeout(_)
            | RegError::Internal(_)
            | RegError::Remote(_) => ErrorCode::InternalError,
        }
    }

    /// Convert to the wire error object
    pub fn to_api_error(&self) -> ApiError {
        let data = match self {
            RegError::Remote(api) => return api.clone(),
            RegError::RegistryDoesNotExist { reference } => {
                serde_json::to_value(RegistryDoesNotExistData {
                    reference: reference.clone(),
                })
            }
            RegError::ResponseSchemaMismatch {
                schema_name,
                details,
            } => serde_json::to_value(ResponseSchemaMismatchData {
                schema_name: schema_name.clone(),
                details: details.clone(),
            }),
            RegError::InvalidRegisterName { name } => {
                serde_json::to_value(InvalidRegisterNameData { name: name.clone() })
            }
            RegError::RejectedUnlinkedSync {
                source_link,
                registry,
            } => serde_json::to_value(RejectedUnlinkedSyncData {
                source_link: source_link.clone(),
                registry: registry.clone(),
            }),
            RegError::MethodNotFound(method) => Ok(Value::String(method.clone())),
            other => Ok(Value::String(other.to_string())),
        };
        ApiError::new(self.error_code(), data.ok())
    }

    /// Decode a wire error object.
    ///
    /// Registry codes with a well-formed data payload come back typed;
    /// everything else is kept as [`RegError::Remote`].
    pub fn from_api_error(api: ApiError) -> Self {
        let Some(code) = ErrorCode::from_code(api.code) else {
            return RegError::Remote(api);
        };
        let data = api.data.clone().unwrap_or(Value::Null);
        let typed = match code {
            ErrorCode::RegistryDoesNotExist => serde_json::from_value(data)
                .ok()
                .map(|d: RegistryDoesNotExistData| RegError::RegistryDoesNotExist {
                    reference: d.reference,
                }),
            ErrorCode::ResponseSchemaMismatch => serde_json::from_value(data).ok().map(
                |d: ResponseSchemaMismatchData| RegError::ResponseSchemaMismatch {
                    schema_name: d.schema_name,
                    details: d.details,
                },
            ),
            ErrorCode::InvalidRegisterName => serde_json::from_value(data)
                .ok()
                .map(|d: InvalidRegisterNameData| RegError::InvalidRegisterName { name: d.name }),
            ErrorCode::RejectedUnlinkedSync => serde_json::from_value(data).ok().map(
                |d: RejectedUnlinkedSyncData| RegError::RejectedUnlinkedSync {
                    source_link: d.source_link,
                    registry: d.registry,
                },
            ),
            ErrorCode::MethodNotFound => data
                .as_str()
                .map(|method| RegError::MethodNotFound(method.to_string())),
            _ => None,
        };
        typed.unwrap_or(RegError::Remote(api))
    }
}

/// Result type for REG operations
pub type RegResult<T> = Result<T, RegError>;
