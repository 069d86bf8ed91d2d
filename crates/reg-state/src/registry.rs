//! Registry - register values plus the registry's links

use reg_core::{FullValues, Link, PartialValues, RegisterKey, RegisterValue};

/// One named registry
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Registry {
    /// Values indexed by key; a missing key has no value
    values: FullValues,
    /// Known links in insertion order, no duplicates
    links: Vec<Link>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Get one value
    pub fn get(&self, key: RegisterKey) -> RegisterValue {
        self.values.get(&key).cloned()
    }

    /// Get several values; absent keys map to `None`
    pub fn get_multiple(&self, keys: &[RegisterKey]) -> PartialValues {
        keys.iter().map(|key| (*key, self.get(*key))).collect()
    }

    /// All set values
    pub fn values(&self) -> &FullValues {
        &self.values
    }

    /// Merge a partial update. `None` clears the key.
    pub fn apply_partial(&mut self, update: &PartialValues) {
        for (key, value) in update {
            match value {
                Some(value) => {
                    self.values.insert(*key, value.clone());
                }
                None => {
                    self.values.remove(key);
                }
            }
        }
    }

    /// Clear every key, then set `values`
    pub fn apply_full(&mut self, values: &FullValues) {
        self.values = values.clone();
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn has_link(&self, link: &Link) -> bool {
        self.links.contains(link)
    }

    /// Add a link; returns false if it was already known
    pub fn add_link(&mut self, link: Link) -> bool {
        if self.has_link(&link) {
            return false;
        }
        self.links.push(link);
        true
    }

    /// Remove a link; returns false if it was not known
    pub fn remove_link(&mut self, link: &Link) -> bool {
        let before = self.links.len();
        self.links.retain(|l| l != link);
        self.links.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(entries: &[(RegisterKey, Option<&str>)]) -> PartialValues {
        entries
            .iter()
            .map(|(k, v)| (*k, v.map(str::to_string)))
            .collect()
    }

    #[test]
    fn test_partial_merge_keeps_untouched_keys() {
        let mut reg = Registry::new();
        reg.apply_partial(&partial(&[(RegisterKey::A, Some("1")), (RegisterKey::B, Some("2"))]));
        reg.apply_partial(&partial(&[(RegisterKey::B, Some("3"))]));

        assert_eq!(reg.get(RegisterKey::A), Some("1".into()));
        assert_eq!(reg.get(RegisterKey::B), Some("3".into()));
    }

    #[test]
    fn test_partial_none_clears() {
        let mut reg = Registry::new();
        reg.apply_partial(&partial(&[(RegisterKey::A, Some("1"))]));
        reg.apply_partial(&partial(&[(RegisterKey::A, None)]));

        assert_eq!(reg.get(RegisterKey::A), None);
        assert!(reg.values().is_empty());
    }

    #[test]
    fn test_full_replace_clears_others() {
        let mut reg = Registry::new();
        reg.apply_partial(&partial(&[(RegisterKey::A, Some("1")), (RegisterKey::B, Some("2"))]));

        let mut full = FullValues::new();
        full.insert(RegisterKey::C, "3".into());
        reg.apply_full(&full);

        assert_eq!(reg.get(RegisterKey::A), None);
        assert_eq!(reg.get(RegisterKey::C), Some("3".into()));
        assert_eq!(reg.values().len(), 1);
    }

    #[test]
    fn test_get_multiple_reports_absent() {
        let mut reg = Registry::new();
        reg.apply_partial(&partial(&[(RegisterKey::Unnamed, Some(""))]));

        let got = reg.get_multiple(&[RegisterKey::Unnamed, RegisterKey::Z]);
        assert_eq!(got[&RegisterKey::Unnamed], Some(String::new()));
        assert_eq!(got[&RegisterKey::Z], None);
    }

    #[test]
    fn test_links_are_a_set() {
        let mut reg = Registry::new();
        let link = Link::new("i2", "B");

        assert!(reg.add_link(link.clone()));
        assert!(!reg.add_link(link.clone()));
        assert_eq!(reg.links().len(), 1);

        assert!(reg.remove_link(&link));
        assert!(!reg.remove_link(&link));
        assert!(reg.links().is_empty());
    }

    fn update_strategy() -> impl proptest::strategy::Strategy<Value = PartialValues> {
        use proptest::prelude::*;
        proptest::collection::btree_map(
            (0..RegisterKey::ALL.len()).prop_map(|i| RegisterKey::ALL[i]),
            proptest::option::of("[a-z]{0,4}"),
            0..6,
        )
    }

    proptest::proptest! {
        #[test]
        fn prop_partial_updates_match_last_write(
            updates in proptest::collection::vec(update_strategy(), 0..8),
        ) {
            let mut reg = Registry::new();
            let mut model = std::collections::BTreeMap::new();
            for update in &updates {
                reg.apply_partial(update);
                for (key, value) in update {
                    model.insert(*key, value.clone());
                }
            }

            let expected: FullValues = model
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v)))
                .collect();
            proptest::prop_assert_eq!(reg.values(), &expected);
        }
    }
}
