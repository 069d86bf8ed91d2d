//! REG State - Registry storage
//!
//! This crate implements the local side of a registry:
//! - Register values with partial-merge and full-replace semantics
//! - Per-registry link lists (the flood's outgoing edges)
//! - The [`RegistryStore`] capability consumed by the node
//! - An in-memory store guarded by one lock per operation

pub mod memory;
pub mod registry;
pub mod store;

pub use memory::*;
pub use registry::*;
pub use store::*;
