//! Acceptance reconciliation
//!
//! Reports for the same link can arrive from several branches of a flood,
//! in any order. They are merged by key over the whole input, never by
//! adjacent runs.

use std::collections::HashMap;

use reg_core::{Link, SyncAcceptance};

/// Keyed OR-accumulator over acceptance reports
#[derive(Debug, Default)]
pub struct AcceptanceLedger {
    /// Position of each link in `entries`
    index: HashMap<Link, usize>,
    /// One entry per distinct link, first-seen order
    entries: Vec<SyncAcceptance>,
}

impl AcceptanceLedger {
    pub fn new() -> Self {
        AcceptanceLedger::default()
    }

    /// Fold one report in
    pub fn record(&mut self, report: SyncAcceptance) {
        match self.index.get(&report.link) {
            Some(&pos) => self.entries[pos].accepted |= report.accepted,
            None => {
                self.index.insert(report.link.clone(), self.entries.len());
                self.entries.push(report);
            }
        }
    }

    /// Current verdict for a link
    pub fn verdict(&self, link: &Link) -> Option<bool> {
        self.index.get(link).map(|&pos| self.entries[pos].accepted)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<SyncAcceptance> {
        self.entries
    }
}

impl Extend<SyncAcceptance> for AcceptanceLedger {
    fn extend<I: IntoIterator<Item = SyncAcceptance>>(&mut self, iter: I) {
        for report in iter {
            self.record(report);
        }
    }
}

impl FromIterator<SyncAcceptance> for AcceptanceLedger {
    fn from_iter<I: IntoIterator<Item = SyncAcceptance>>(iter: I) -> Self {
        let mut ledger = AcceptanceLedger::new();
        ledger.extend(iter);
        ledger
    }
}

/// Collapse reports to one entry per distinct link, accepted iff any
/// report for that link accepted.
pub fn reconcile(reports: impl IntoIterator<Item = SyncAcceptance>) -> Vec<SyncAcceptance> {
    reports.into_iter().collect::<AcceptanceLedger>().into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn link(i: usize) -> Link {
        Link::new(format!("instance-{}", i % 3), format!("reg-{i}"))
    }

    #[test]
    fn test_or_merge_non_contiguous() {
        let l = link(0);
        let other = link(1);
        let merged = reconcile(vec![
            SyncAcceptance::rejected(l.clone()),
            SyncAcceptance::accepted(other.clone()),
            SyncAcceptance::accepted(l.clone()),
            SyncAcceptance::rejected(other.clone()),
            SyncAcceptance::rejected(l.clone()),
        ]);
        assert_eq!(
            merged,
            vec![SyncAcceptance::accepted(l), SyncAcceptance::accepted(other)]
        );
    }

    #[test]
    fn test_all_rejected_stays_rejected() {
        let l = link(0);
        let merged = reconcile(vec![
            SyncAcceptance::rejected(l.clone()),
            SyncAcceptance::rejected(l.clone()),
        ]);
        assert_eq!(merged, vec![SyncAcceptance::rejected(l)]);
    }

    #[test]
    fn test_same_registry_name_on_different_instances_stay_apart() {
        let a = Link::new("i1", "clipboard");
        let b = Link::new("i2", "clipboard");
        let merged = reconcile(vec![
            SyncAcceptance::accepted(a.clone()),
            SyncAcceptance::rejected(b.clone()),
        ]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(reconcile(Vec::new()).is_empty());
    }

    #[test]
    fn test_ledger_verdict() {
        let mut ledger = AcceptanceLedger::new();
        ledger.record(SyncAcceptance::rejected(link(4)));
        assert_eq!(ledger.verdict(&link(4)), Some(false));
        ledger.record(SyncAcceptance::accepted(link(4)));
        assert_eq!(ledger.verdict(&link(4)), Some(true));
        assert_eq!(ledger.verdict(&link(5)), None);
        assert_eq!(ledger.len(), 1);
    }

    fn reports() -> impl Strategy<Value = Vec<SyncAcceptance>> {
        prop::collection::vec((0usize..6, any::<bool>()), 0..40).prop_map(|raw| {
            raw.into_iter()
                .map(|(i, accepted)| SyncAcceptance::new(link(i), accepted))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_one_entry_per_distinct_link(input in reports()) {
            let distinct: HashSet<_> = input.iter().map(|r| r.link.clone()).collect();
            let merged = reconcile(input);
            let out: HashSet<_> = merged.iter().map(|r| r.link.clone()).collect();
            prop_assert_eq!(merged.len(), out.len());
            prop_assert_eq!(out, distinct);
        }

        #[test]
        fn prop_accepted_iff_any_report_accepted(input in reports()) {
            let merged = reconcile(input.clone());
            for entry in &merged {
                let any = input.iter().any(|r| r.link == entry.link && r.accepted);
                prop_assert_eq!(entry.accepted, any);
            }
        }

        #[test]
        fn prop_order_independent(
            (input, shuffled) in reports().prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
        ) {
            let mut a = reconcile(input);
            let mut b = reconcile(shuffled);
            a.sort_by(|x, y| x.link.cmp(&y.link));
            b.sort_by(|x, y| x.link.cmp(&y.link));
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_idempotent(input in reports()) {
            let once = reconcile(input);
            let twice = reconcile(once.clone());
            prop_assert_eq!(once, twice);
        }
    }
}
