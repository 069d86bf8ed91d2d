//! REG Runtime - Node orchestration
//!
//! This crate wires the layers into a running node:
//! 1. Load configuration (TOML, humantime durations)
//! 2. Install the tracing subscriber
//! 3. Seed the in-memory store with configured registries and links
//! 4. Bind the JSON-RPC server
//! 5. Decode each request into a typed [`reg_wire::Request`]
//! 6. Dispatch it to the [`RegService`] implementation
//! 7. Run floods for sync and push requests over the TCP client

pub mod config;
pub mod daemon;
pub mod logging;
pub mod node;
pub mod processor;
pub mod service;

pub use config::*;
pub use daemon::*;
pub use logging::*;
pub use node::*;
pub use processor::*;
pub use service::*;
