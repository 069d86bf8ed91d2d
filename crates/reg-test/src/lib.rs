//! REG Test Harness - flood validation on in-process meshes
//!
//! This crate provides:
//! - An in-process mesh routing JSON-RPC requests between real nodes
//! - Chaos injection (offline and hanging peers, random failures, latency)
//! - Topology builders and flood scenarios

pub mod chaos;
pub mod mesh;
pub mod scenario;

pub use chaos::*;
pub use mesh::*;
pub use scenario::*;
