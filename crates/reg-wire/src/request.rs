//! Typed requests
//!
//! [`Request`] is the tagged union over every method. Inbound requests are
//! decoded once here and dispatched by a single exhaustive `match`.

use reg_core::{RegError, RegResult, RegisterKey};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::{
    ClearAndReplaceParams, GetAllParams, GetMultipleParams, LinkParams, ListLinksParams,
    PushAllParams, PushMultipleParams, RegMethod, RegistryInfoParams, SetMultipleParams,
    SyncAllParams, SyncMultipleParams,
};

/// One registry API call with its strongly-typed params
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    RegistryInfo(RegistryInfoParams),
    GetMultiple(GetMultipleParams),
    GetAll(GetAllParams),
    SetMultiple(SetMultipleParams),
    ClearAndReplace(ClearAndReplaceParams),
    ListLinks(ListLinksParams),
    AddLink(LinkParams),
    RemoveLink(LinkParams),
    SyncMultiple(SyncMultipleParams),
    SyncAll(SyncAllParams),
    PushMultiple(PushMultipleParams),
    PushAll(PushAllParams),
}

impl Request {
    pub fn method(&self) -> RegMethod {
        match self {
            Request::RegistryInfo(_) => RegMethod::RegistryInfo,
            Request::GetMultiple(_) => RegMethod::GetMultiple,
            Request::GetAll(_) => RegMethod::GetAll,
            Request::SetMultiple(_) => RegMethod::SetMultiple,
            Request::ClearAndReplace(_) => RegMethod::ClearAndReplace,
            Request::ListLinks(_) => RegMethod::ListLinks,
            Request::AddLink(_) => RegMethod::AddLink,
            Request::RemoveLink(_) => RegMethod::RemoveLink,
            Request::SyncMultiple(_) => RegMethod::SyncMultiple,
            Request::SyncAll(_) => RegMethod::SyncAll,
            Request::PushMultiple(_) => RegMethod::PushMultiple,
            Request::PushAll(_) => RegMethod::PushAll,
        }
    }

    /// Decode a request from its method name and raw params.
    ///
    /// Unknown register names are reported as `InvalidRegisterName` before
    /// the typed decode, any other shape problem as `InvalidParams`.
    pub fn from_parts(method: &str, params: Value) -> RegResult<Self> {
        let method: RegMethod = method.parse()?;
        check_register_names(method, &params)?;

        Ok(match method {
            RegMethod::RegistryInfo => Request::RegistryInfo(decode(params)?),
            RegMethod::GetMultiple => Request::GetMultiple(decode(params)?),
            RegMethod::GetAll => Request::GetAll(decode(params)?),
            RegMethod::SetMultiple => Request::SetMultiple(decode(params)?),
            RegMethod::ClearAndReplace => Request::ClearAndReplace(decode(params)?),
            RegMethod::ListLinks => Request::ListLinks(decode(params)?),
            RegMethod::AddLink => Request::AddLink(decode(params)?),
            RegMethod::RemoveLink => Request::RemoveLink(decode(params)?),
            RegMethod::SyncMultiple => Request::SyncMultiple(decode(params)?),
            RegMethod::SyncAll => Request::SyncAll(decode(params)?),
            RegMethod::PushMultiple => Request::PushMultiple(decode(params)?),
            RegMethod::PushAll => Request::PushAll(decode(params)?),
        })
    }

    /// Encode the params for the wire
    pub fn params(&self) -> RegResult<Value> {
        match self {
            Request::RegistryInfo(p) => encode(p),
            Request::GetMultiple(p) => encode(p),
            Request::GetAll(p) => encode(p),
            Request::SetMultiple(p) => encode(p),
            Request::ClearAndReplace(p) => encode(p),
            Request::ListLinks(p) => encode(p),
            Request::AddLink(p) | Request::RemoveLink(p) => encode(p),
            Request::SyncMultiple(p) => encode(p),
            Request::SyncAll(p) => encode(p),
            Request::PushMultiple(p) => encode(p),
            Request::PushAll(p) => encode(p),
        }
    }
}

fn decode<T: DeserializeOwned>(params: Value) -> RegResult<T> {
    serde_json::from_value(params).map_err(|e| RegError::InvalidParams(e.to_string()))
}

fn encode<T: Serialize>(params: &T) -> RegResult<Value> {
    serde_json::to_value(params).map_err(|e| RegError::Internal(e.to_string()))
}

/// Validate register names in `values` maps and `keys` lists.
fn check_register_names(method: RegMethod, params: &Value) -> RegResult<()> {
    if method.carries_values() {
        if let Some(values) = params.get("values").and_then(Value::as_object) {
            for name in values.keys() {
                name.parse::<RegisterKey>()?;
            }
        }
    }
    if method == RegMethod::GetMultiple {
        if let Some(keys) = params.get("keys").and_then(Value::as_array) {
            for name in keys.iter().filter_map(Value::as_str) {
                name.parse::<RegisterKey>()?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reg_core::Link;
    use serde_json::json;

    #[test]
    fn test_decode_sync_multiple() {
        let params = json!({
            "source_link": {"instance": "i1", "registry": "A"},
            "visited_registries": [],
            "registry": "B",
            "values": {"k": "v", "a": null},
        });
        let request = Request::from_parts("reg.sync-multiple", params).unwrap();
        let Request::SyncMultiple(p) = &request else {
            panic!("wrong variant: {request:?}");
        };
        assert_eq!(p.source_link, Link::new("i1", "A"));
        assert_eq!(p.values[&RegisterKey::K], Some("v".into()));
        assert_eq!(p.values[&RegisterKey::A], None);
        assert_eq!(request.method(), RegMethod::SyncMultiple);
    }

    #[test]
    fn test_invalid_register_name_in_values() {
        let params = json!({"registry": "A", "values": {"K": "v"}});
        assert_eq!(
            Request::from_parts("reg.set-multiple", params),
            Err(RegError::InvalidRegisterName { name: "K".into() })
        );
    }

    #[test]
    fn test_invalid_register_name_in_keys() {
        let params = json!({"registry": "A", "keys": ["a", "zz"]});
        assert_eq!(
            Request::from_parts("reg.get-multiple", params),
            Err(RegError::InvalidRegisterName { name: "zz".into() })
        );
    }

    #[test]
    fn test_missing_field_is_invalid_params() {
        let params = json!({"values": {}});
        assert!(matches!(
            Request::from_parts("reg.clear-and-replace", params),
            Err(RegError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_null_in_full_values_is_invalid_params() {
        let params = json!({"registry": "A", "values": {"a": null}});
        assert!(matches!(
            Request::from_parts("reg.clear-and-replace", params),
            Err(RegError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_unknown_method() {
        assert!(matches!(
            Request::from_parts("reg.nope", json!({})),
            Err(RegError::MethodNotFound(_))
        ));
    }

    #[test]
    fn test_params_roundtrip_through_parts() {
        let request = Request::AddLink(LinkParams {
            registry: "A".into(),
            link: Link::new("i2", "B"),
        });
        let params = request.params().unwrap();
        let back = Request::from_parts(request.method().as_str(), params).unwrap();
        assert_eq!(back, request);
    }
}
