//! REG Flood Synchronization
//!
//! Pushes a value set through the link graph so that every reachable
//! linked registry receives it.
//!
//! # Flood
//!
//! A node receiving a push (from a local client, or from a peer that is
//! itself flooding) appends itself to the visited path, contacts each of
//! its links that is not on that path, and forwards the path extended with
//! all of its own links. Neighbors therefore never step back towards the
//! path they came from, and every single call chain ends after at most one
//! hop per distinct link.
//!
//! Sibling branches carry different snapshots and may reach the same
//! distant registry twice. Their reports are merged per link, accepted if
//! any path accepted.

pub mod invoker;
pub mod propagate;
pub mod reconcile;
pub mod visited;

pub use invoker::*;
pub use propagate::*;
pub use reconcile::*;
pub use visited::*;
