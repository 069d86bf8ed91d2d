//! REG Wire Protocol - JSON-RPC over newline-delimited frames
//!
//! This crate implements the wire format of the registry API:
//! - JSON-RPC 2.0 request/response envelope
//! - Method names and strongly-typed params/results
//! - The [`Request`] tagged union over every method
//! - Frame codec (one JSON message per line)
//! - The [`RemoteCall`] boundary used to reach other instances

pub mod api;
pub mod call;
pub mod codec;
pub mod envelope;
pub mod method;
pub mod request;

pub use api::*;
pub use call::*;
pub use codec::*;
pub use envelope::*;
pub use method::*;
pub use request::*;
