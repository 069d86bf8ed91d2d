//! Visited path of one flood

use std::collections::HashSet;

use reg_core::Link;

/// Ordered path-history of links on one flood's call chain.
///
/// Append-only. Duplicates may arrive from peers and are kept until
/// [`VisitedSet::dedup`]; membership tests always look at distinct links.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisitedSet {
    links: Vec<Link>,
}

impl VisitedSet {
    pub fn push(&mut self, link: Link) {
        self.links.push(link);
    }

    pub fn extend<'a>(&mut self, links: impl IntoIterator<Item = &'a Link>) {
        self.links.extend(links.into_iter().cloned());
    }

    /// Drop repeated links, keeping first-seen order
    pub fn dedup(&mut self) {
        let mut seen = HashSet::with_capacity(self.links.len());
        self.links.retain(|link| seen.insert(link.clone()));
    }

    /// Distinct links, for membership tests
    pub fn members(&self) -> HashSet<&Link> {
        self.links.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn as_slice(&self) -> &[Link] {
        &self.links
    }

    pub fn into_vec(self) -> Vec<Link> {
        self.links
    }
}

impl From<Vec<Link>> for VisitedSet {
    fn from(links: Vec<Link>) -> Self {
        VisitedSet { links }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(name: &str) -> Link {
        Link::new("host", name)
    }

    #[test]
    fn test_dedup_keeps_first_seen_order() {
        let mut visited = VisitedSet::from(vec![link("b"), link("a"), link("b"), link("c"), link("a")]);
        visited.dedup();
        assert_eq!(visited.as_slice(), &[link("b"), link("a"), link("c")]);
    }

    #[test]
    fn test_members_collapse_duplicates() {
        let visited = VisitedSet::from(vec![link("a"), link("a")]);
        assert_eq!(visited.len(), 2);
        assert_eq!(visited.members().len(), 1);
        assert!(visited.members().contains(&link("a")));
    }
}
