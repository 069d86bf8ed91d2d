//! Registry method names

use std::fmt;
use std::str::FromStr;

use reg_core::{RegError, RegResult};

/// Every method of the registry API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegMethod {
    RegistryInfo,
    GetMultiple,
    GetAll,
    SetMultiple,
    ClearAndReplace,
    ListLinks,
    AddLink,
    RemoveLink,
    SyncMultiple,
    SyncAll,
    PushMultiple,
    PushAll,
}

impl RegMethod {
    pub const ALL: [RegMethod; 12] = [
        RegMethod::RegistryInfo,
        RegMethod::GetMultiple,
        RegMethod::GetAll,
        RegMethod::SetMultiple,
        RegMethod::ClearAndReplace,
        RegMethod::ListLinks,
        RegMethod::AddLink,
        RegMethod::RemoveLink,
        RegMethod::SyncMultiple,
        RegMethod::SyncAll,
        RegMethod::PushMultiple,
        RegMethod::PushAll,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RegMethod::RegistryInfo => "reg.registry-info",
            RegMethod::GetMultiple => "reg.get-multiple",
            RegMethod::GetAll => "reg.get-all",
            RegMethod::SetMultiple => "reg.set-multiple",
            RegMethod::ClearAndReplace => "reg.clear-and-replace",
            RegMethod::ListLinks => "reg.list-links",
            RegMethod::AddLink => "reg.add-link",
            RegMethod::RemoveLink => "reg.remove-link",
            RegMethod::SyncMultiple => "reg.sync-multiple",
            RegMethod::SyncAll => "reg.sync-all",
            RegMethod::PushMultiple => "reg.push-multiple",
            RegMethod::PushAll => "reg.push-all",
        }
    }

    /// Methods that carry a `values` map with register-name keys
    pub fn carries_values(self) -> bool {
        matches!(
            self,
            RegMethod::SetMultiple
                | RegMethod::ClearAndReplace
                | RegMethod::SyncMultiple
                | RegMethod::SyncAll
                | RegMethod::PushMultiple
        )
    }
}

impl fmt::Display for RegMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegMethod {
    type Err = RegError;

    fn from_str(s: &str) -> RegResult<Self> {
        RegMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| RegError::MethodNotFound(s.to_string()))
    }
}
