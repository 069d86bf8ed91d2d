//! Identity types for the REG mesh
//!
//! A registry is named locally on its instance; a [`Link`] pairs that name
//! with the instance address and is the vertex id of the peer graph.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{RegError, RegResult};

/// Separator of the textual link form `registry@instance`
pub const LINK_SEPARATOR: char = '@';

/// Check that a registry name is usable on the wire and in link text.
pub fn validate_registry_name(name: &str) -> RegResult<()> {
    if name.is_empty() {
        return Err(RegError::InvalidLink("registry name is empty".into()));
    }
    if name.contains(LINK_SEPARATOR) || name.chars().any(char::is_whitespace) {
        return Err(RegError::InvalidLink(format!(
            "registry name {name:?} contains '@' or whitespace"
        )));
    }
    Ok(())
}

/// Graph vertex: a registry on a specific instance.
///
/// Equality is structural over both fields.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Link {
    /// Network address of the hosting instance
    pub instance: String,
    /// Registry name local to that instance
    pub registry: String,
}

impl Link {
    #[inline]
    pub fn new(instance: impl Into<String>, registry: impl Into<String>) -> Self {
        Link {
            instance: instance.into(),
            registry: registry.into(),
        }
    }

    /// Validate both fields
    pub fn validate(&self) -> RegResult<()> {
        if self.instance.is_empty() || self.instance.chars().any(char::is_whitespace) {
            return Err(RegError::InvalidLink(format!(
                "instance {:?} is empty or contains whitespace",
                self.instance
            )));
        }
        validate_registry_name(&self.registry)
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link({}@{})", self.registry, self.instance)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.registry, LINK_SEPARATOR, self.instance)
    }
}

impl FromStr for Link {
    type Err = RegError;

    fn from_str(s: &str) -> RegResult<Self> {
        let (registry, instance) = s
            .split_once(LINK_SEPARATOR)
            .ok_or_else(|| RegError::InvalidLink(format!("{s:?} is not registry@instance")))?;
        let link = Link::new(instance, registry);
        link.validate()?;
        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_text_roundtrip() {
        let link: Link = "clipboard@127.0.0.1:7100".parse().unwrap();
        assert_eq!(link, Link::new("127.0.0.1:7100", "clipboard"));
        assert_eq!(link.to_string(), "clipboard@127.0.0.1:7100");
    }

    #[test]
    fn test_link_equality_is_structural() {
        let a = Link::new("host-a", "notes");
        assert_eq!(a, Link::new("host-a", "notes"));
        assert_ne!(a, Link::new("host-b", "notes"));
        assert_ne!(a, Link::new("host-a", "todo"));
    }

    #[test]
    fn test_link_rejects_malformed_text() {
        assert!("no-separator".parse::<Link>().is_err());
        assert!("@host".parse::<Link>().is_err());
        assert!("name@".parse::<Link>().is_err());
        assert!("bad name@host".parse::<Link>().is_err());
    }

    #[test]
    fn test_link_json_shape() {
        let link = Link::new("host:1", "r");
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json, serde_json::json!({"instance": "host:1", "registry": "r"}));
    }

    #[test]
    fn test_registry_name_validation() {
        assert!(validate_registry_name("clipboard").is_ok());
        assert!(validate_registry_name("").is_err());
        assert!(validate_registry_name("a@b").is_err());
        assert!(validate_registry_name("a b").is_err());
    }
}
