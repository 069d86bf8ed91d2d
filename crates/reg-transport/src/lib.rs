//! REG Transport Layer - JSON-RPC over TCP
//!
//! This crate provides:
//! - The inbound [`RequestHandler`] seam
//! - A TCP server with one task per connection
//! - A TCP client implementing [`reg_wire::RemoteCall`]
//!
//! Every frame is one JSON message terminated by `\n`. A connection may
//! carry any number of request/response pairs in order.

pub mod client;
pub mod handler;
pub mod server;

pub use client::*;
pub use handler::*;
pub use server::*;
