//! Core type definitions for Tessera.
//!
//! This crate defines the document tree that every other Tessera crate
//! routes through:
//! - [`Node`]: one row or cell, generic over what fills its plugin slots
//! - [`WireNode`] / [`RawSlot`]: the persisted (JSON) form of the tree
//! - [`IdAssigner`] / [`NodeId`]: stable node identifiers (UUID v4 or v7)
//!
//! Plugin state is carried as opaque [`serde_json::Value`]s. Nothing in
//! this crate interprets it; that is the job of the plugin descriptors in
//! `tessera-plugin`.

mod ids;
mod node;

pub use ids::{IdAssigner, IdStrategy, NodeId, assign_ids};
pub use node::{Inline, Node, PluginRef, RawSlot, SlotKind, WireNode};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),
}
