//! Params and results of every registry method

use std::collections::BTreeMap;

use reg_core::{FullValues, Link, PartialValues, RegisterKey, RegisterValue, SyncAcceptance};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistryInfoParams {
    #[serde(rename = "ref")]
    pub reference: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistryInfoResult {
    pub exists: bool,
    pub id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GetMultipleParams {
    pub registry: String,
    pub keys: Vec<RegisterKey>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GetMultipleResult {
    pub values: BTreeMap<RegisterKey, RegisterValue>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GetAllParams {
    pub registry: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GetAllResult {
    pub values: FullValues,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetMultipleParams {
    pub registry: String,
    pub values: PartialValues,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClearAndReplaceParams {
    pub registry: String,
    pub values: FullValues,
}

/// Result of the methods that only acknowledge
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EmptyResult {}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListLinksParams {
    pub registry: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListLinksResult {
    pub links: Vec<Link>,
}

/// Params of both `add-link` and `remove-link`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkParams {
    pub registry: String,
    pub link: Link,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddLinkResult {
    pub added: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemoveLinkResult {
    pub removed: bool,
}

/// Flood hop carrying a partial update
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyncMultipleParams {
    pub source_link: Link,
    pub visited_registries: Vec<Link>,
    pub registry: String,
    pub values: PartialValues,
    /// How long the sender waits for this hop, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// Flood hop carrying a full replacement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyncAllParams {
    pub source_link: Link,
    pub visited_registries: Vec<Link>,
    pub registry: String,
    pub values: FullValues,
    /// How long the sender waits for this hop, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PushMultipleParams {
    pub registry: String,
    pub values: PartialValues,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PushAllParams {
    pub registry: String,
}

/// Reconciled outcome of a flood, shared by sync and push methods
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    pub sync_acceptance: Vec<SyncAcceptance>,
}

impl SyncResult {
    pub fn new(sync_acceptance: Vec<SyncAcceptance>) -> Self {
        SyncResult { sync_acceptance }
    }

    /// Verdict for one link, if reported
    pub fn verdict(&self, link: &Link) -> Option<bool> {
        self.sync_acceptance
            .iter()
            .find(|a| &a.link == link)
            .map(|a| a.accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_info_uses_ref_field() {
        let params: RegistryInfoParams =
            serde_json::from_value(serde_json::json!({"ref": "notes"})).unwrap();
        assert_eq!(params.reference, "notes");
    }

    #[test]
    fn test_sync_params_shape() {
        let mut values = PartialValues::new();
        values.insert(RegisterKey::K, Some("v".into()));
        let params = SyncMultipleParams {
            source_link: Link::new("i1", "A"),
            visited_registries: vec![Link::new("i1", "A")],
            registry: "B".into(),
            values,
            timeout_ms: None,
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "source_link": {"instance": "i1", "registry": "A"},
                "visited_registries": [{"instance": "i1", "registry": "A"}],
                "registry": "B",
                "values": {"k": "v"},
            })
        );
    }

    #[test]
    fn test_sync_params_timeout_is_optional() {
        let params: SyncAllParams = serde_json::from_value(serde_json::json!({
            "source_link": {"instance": "i1", "registry": "A"},
            "visited_registries": [],
            "registry": "B",
            "values": {},
        }))
        .unwrap();
        assert_eq!(params.timeout_ms, None);

        let params = SyncAllParams {
            timeout_ms: Some(750),
            ..params
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["timeout_ms"], 750);
    }

    #[test]
    fn test_sync_result_verdict() {
        let a = Link::new("i1", "A");
        let b = Link::new("i2", "B");
        let result = SyncResult::new(vec![
            SyncAcceptance::accepted(a.clone()),
            SyncAcceptance::rejected(b.clone()),
        ]);
        assert_eq!(result.verdict(&a), Some(true));
        assert_eq!(result.verdict(&b), Some(false));
        assert_eq!(result.verdict(&Link::new("i3", "C")), None);
    }
}
