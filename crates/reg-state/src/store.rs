//! Store capability consumed by the node

use reg_core::{FullValues, Link, PartialValues, RegResult, RegisterKey};

/// Registry storage.
///
/// Each call is atomic; callers do not lock around sequences of calls.
/// Every operation on a missing registry fails with `RegistryDoesNotExist`.
pub trait RegistryStore: Send + Sync {
    /// Canonical id of the registry named by `reference`, if it exists
    fn registry_info(&self, reference: &str) -> Option<String>;

    /// Create an empty registry; returns false if it already existed
    fn create_registry(&self, name: &str) -> RegResult<bool>;

    fn read_links(&self, registry: &str) -> RegResult<Vec<Link>>;

    fn add_link(&self, registry: &str, link: Link) -> RegResult<bool>;

    fn remove_link(&self, registry: &str, link: &Link) -> RegResult<bool>;

    fn get_multiple(&self, registry: &str, keys: &[RegisterKey]) -> RegResult<PartialValues>;

    fn get_all(&self, registry: &str) -> RegResult<FullValues>;

    /// Merge `values`; `None` clears a key
    fn apply_partial(&self, registry: &str, values: &PartialValues) -> RegResult<()>;

    /// Replace the registry's contents with `values`
    fn apply_full(&self, registry: &str, values: &FullValues) -> RegResult<()>;
}
