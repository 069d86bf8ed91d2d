//! Flood scenarios on generated topologies

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reg_core::{Link, RegResult};

use crate::MeshSimulator;

/// Registry name used by generated topologies
pub const SCENARIO_REGISTRY: &str = "shared";

/// Directed link graph over `nodes`, as index pairs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    pub nodes: Vec<Link>,
    pub edges: Vec<(usize, usize)>,
}

impl Topology {
    /// `n` registries, one per instance, no links
    pub fn isolated(n: usize) -> Self {
        Topology {
            nodes: (0..n)
                .map(|i| Link::new(format!("node-{i}"), SCENARIO_REGISTRY))
                .collect(),
            edges: Vec::new(),
        }
    }

    /// Add `a -> b` and `b -> a`
    pub fn connect(&mut self, a: usize, b: usize) {
        self.edges.push((a, b));
        self.edges.push((b, a));
    }

    /// Bidirectional chain 0 - 1 - ... - n-1
    pub fn chain(n: usize) -> Self {
        let mut topology = Topology::isolated(n);
        for i in 1..n {
            topology.connect(i - 1, i);
        }
        topology
    }

    /// Bidirectional ring
    pub fn ring(n: usize) -> Self {
        let mut topology = Topology::chain(n);
        if n > 2 {
            topology.connect(n - 1, 0);
        }
        topology
    }

    /// Node 0 linked both ways to every other node
    pub fn star(n: usize) -> Self {
        let mut topology = Topology::isolated(n);
        for i in 1..n {
            topology.connect(0, i);
        }
        topology
    }

    /// Binary tree rooted at node 0
    pub fn tree(n: usize) -> Self {
        let mut topology = Topology::isolated(n);
        for i in 1..n {
            topology.connect((i - 1) / 2, i);
        }
        topology
    }

    /// Every pair linked both ways
    pub fn full(n: usize) -> Self {
        let mut topology = Topology::isolated(n);
        for a in 0..n {
            for b in (a + 1)..n {
                topology.connect(a, b);
            }
        }
        topology
    }

    /// Seeded random graph: each pair linked both ways with probability `p`
    pub fn random(n: usize, p: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut topology = Topology::isolated(n);
        for a in 0..n {
            for b in (a + 1)..n {
                if rng.gen::<f64>() < p {
                    topology.connect(a, b);
                }
            }
        }
        topology
    }

    /// Number of directed links
    pub fn link_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, index: usize) -> &Link {
        &self.nodes[index]
    }

    /// Nodes reachable from `origin` along the links
    pub fn reachable_from(&self, origin: usize) -> Vec<usize> {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![origin];
        seen[origin] = true;
        while let Some(node) = stack.pop() {
            for &(from, to) in &self.edges {
                if from == node && !seen[to] {
                    seen[to] = true;
                    stack.push(to);
                }
            }
        }
        (0..self.nodes.len()).filter(|&i| seen[i]).collect()
    }

    /// Create every registry and link on the mesh
    pub fn install(&self, mesh: &MeshSimulator) -> RegResult<()> {
        for node in &self.nodes {
            mesh.add_registry(node)?;
        }
        for &(from, to) in &self.edges {
            mesh.link(&self.nodes[from], &self.nodes[to])?;
        }
        Ok(())
    }
}
