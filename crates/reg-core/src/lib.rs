//! REG Core - Fundamental types and primitives
//!
//! This crate defines the core types used throughout the REG mesh:
//! - Identifiers (Link, registry names)
//! - Register keys and value maps
//! - Sync acceptances
//! - Structured errors and their wire codes

pub mod acceptance;
pub mod error;
pub mod id;
pub mod register;

pub use acceptance::*;
pub use error::*;
pub use id::*;
pub use register::*;
