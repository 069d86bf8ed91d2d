//! In-memory registry store

use std::collections::HashMap;

use parking_lot::RwLock;
use reg_core::{
    validate_registry_name, FullValues, Link, PartialValues, RegError, RegResult, RegisterKey,
};
use tracing::debug;

use crate::{Registry, RegistryStore};

/// Registries of one instance, held in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    registries: RwLock<HashMap<String, Registry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Names of all registries, sorted
    pub fn registry_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.registries.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Get number of registries
    pub fn len(&self) -> usize {
        self.registries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registries.read().is_empty()
    }

    fn read<T>(&self, registry: &str, f: impl FnOnce(&Registry) -> T) -> RegResult<T> {
        let registries = self.registries.read();
        registries.get(registry).map(f).ok_or_else(|| missing(registry))
    }

    fn write<T>(&self, registry: &str, f: impl FnOnce(&mut Registry) -> T) -> RegResult<T> {
        let mut registries = self.registries.write();
        registries
            .get_mut(registry)
            .map(f)
            .ok_or_else(|| missing(registry))
    }
}

fn missing(registry: &str) -> RegError {
    RegError::RegistryDoesNotExist {
        reference: registry.to_string(),
    }
}

impl RegistryStore for MemoryStore {
    fn registry_info(&self, reference: &str) -> Option<String> {
        self.registries
            .read()
            .contains_key(reference)
            .then(|| reference.to_string())
    }

    fn create_registry(&self, name: &str) -> RegResult<bool> {
        validate_registry_name(name)?;
        let mut registries = self.registries.write();
        if registries.contains_key(name) {
            return Ok(false);
        }
        registries.insert(name.to_string(), Registry::new());
        debug!(registry = name, "registry created");
        Ok(true)
    }

    fn read_links(&self, registry: &str) -> RegResult<Vec<Link>> {
        self.read(registry, |r| r.links().to_vec())
    }

    fn add_link(&self, registry: &str, link: Link) -> RegResult<bool> {
        let shown = link.to_string();
        let added = self.write(registry, |r| r.add_link(link))?;
        debug!(registry, link = %shown, added, "add link");
        Ok(added)
    }

    fn remove_link(&self, registry: &str, link: &Link) -> RegResult<bool> {
        let removed = self.write(registry, |r| r.remove_link(link))?;
        debug!(registry, link = %link, removed, "remove link");
        Ok(removed)
    }

    fn get_multiple(&self, registry: &str, keys: &[RegisterKey]) -> RegResult<PartialValues> {
        self.read(registry, |r| r.get_multiple(keys))
    }

    fn get_all(&self, registry: &str) -> RegResult<FullValues> {
        self.read(registry, |r| r.values().clone())
    }

    fn apply_partial(&self, registry: &str, values: &PartialValues) -> RegResult<()> {
        self.write(registry, |r| r.apply_partial(values))?;
        debug!(registry, keys = values.len(), "applied partial update");
        Ok(())
    }

    fn apply_full(&self, registry: &str, values: &FullValues) -> RegResult<()> {
        self.write(registry, |r| r.apply_full(values))?;
        debug!(registry, keys = values.len(), "replaced registry contents");
        Ok(())
    }
}
