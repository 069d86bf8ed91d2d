//! Flood propagation - how a push moves through the link graph
//!
//! Fork-join: one round contacts every unvisited neighbor concurrently,
//! waits for all of them and folds their reports together.

use async_trait::async_trait;
use futures::future::join_all;
use reg_core::{Link, SyncAcceptance};
use tracing::{debug, info};

use crate::{AcceptanceLedger, VisitedSet};

/// Delivery of one sync push to one neighbor.
///
/// Implementations never fail: a neighbor that cannot be reached or that
/// refuses the push is reported as `[(to, false)]`.
#[async_trait]
pub trait RemoteSync: Send + Sync {
    async fn sync_to(&self, from: &Link, visited: &[Link], to: &Link) -> Vec<SyncAcceptance>;
}

/// Which neighbors one round contacts, and the path it forwards to them
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FloodPlan {
    pub this_link: Link,
    /// Snapshot sent to every target of this round
    pub visited: Vec<Link>,
    /// Neighbors not already on the incoming path, first-seen order
    pub targets: Vec<Link>,
}

impl FloodPlan {
    pub fn new(this_link: Link, incoming_visited: Vec<Link>, outgoing_links: &[Link]) -> Self {
        let mut visited = VisitedSet::from(incoming_visited);
        visited.push(this_link.clone());

        // Targets are filtered against the path that reached us, before our
        // own links are folded in.
        let mut targets = Vec::new();
        {
            let on_path = visited.members();
            for link in outgoing_links {
                if !on_path.contains(link) && !targets.contains(link) {
                    targets.push(link.clone());
                }
            }
        }

        visited.extend(outgoing_links);
        visited.dedup();

        FloodPlan {
            this_link,
            visited: visited.into_vec(),
            targets,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Run one flood round for `this_registry` on `this_instance`.
///
/// Always returns an entry for this registry with `accepted = true`, and
/// exactly one entry per distinct link reported anywhere downstream.
pub async fn propagate<R>(
    this_instance: &str,
    this_registry: &str,
    incoming_visited: Vec<Link>,
    outgoing_links: &[Link],
    remote: &R,
) -> Vec<SyncAcceptance>
where
    R: RemoteSync + ?Sized,
{
    let plan = FloodPlan::new(
        Link::new(this_instance, this_registry),
        incoming_visited,
        outgoing_links,
    );
    run_plan(&plan, remote).await
}

/// Execute a precomputed plan
pub async fn run_plan<R>(plan: &FloodPlan, remote: &R) -> Vec<SyncAcceptance>
where
    R: RemoteSync + ?Sized,
{
    if plan.is_leaf() {
        debug!(link = %plan.this_link, visited = plan.visited.len(), "flood leaf");
    } else {
        info!(
            link = %plan.this_link,
            visited = plan.visited.len(),
            unvisited = plan.targets.len(),
            "propagating sync"
        );
    }

    let calls = plan
        .targets
        .iter()
        .map(|to| remote.sync_to(&plan.this_link, &plan.visited, to));
    let reports = join_all(calls).await;

    let mut ledger: AcceptanceLedger = reports.into_iter().flatten().collect();
    ledger.record(SyncAcceptance::accepted(plan.this_link.clone()));

    let result = ledger.into_vec();
    let accepted = result.iter().filter(|r| r.accepted).count();
    if plan.is_leaf() {
        debug!(link = %plan.this_link, accepted, "flood leaf complete");
    } else {
        info!(
            link = %plan.this_link,
            reported = result.len(),
            accepted,
            "flood round complete"
        );
    }
    result
}
