//! Node identifiers.
//!
//! Persisted documents may carry any non-empty string as a node id. Ids minted
//! here are UUIDs: v4 by default, v7 when time-ordered ids are preferred.

use crate::node::Node;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// How fresh node ids are minted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Random UUID v4.
    #[default]
    V4,
    /// UUID v7, which embeds a timestamp for natural ordering.
    V7,
}

/// A generated node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Creates a new random node ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a node ID using the given strategy.
    #[must_use]
    pub fn generate(strategy: IdStrategy) -> Self {
        match strategy {
            IdStrategy::V4 => Self(Uuid::new_v4()),
            IdStrategy::V7 => Self(Uuid::now_v7()),
        }
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Parses a node ID from a string.
    pub fn parse(s: &str) -> crate::Result<Self> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Fills in missing node ids across a tree.
///
/// Existing non-empty ids are never touched, so running the assigner twice
/// is the same as running it once.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdAssigner {
    strategy: IdStrategy,
}

impl IdAssigner {
    pub fn new(strategy: IdStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Mints a fresh id string.
    pub fn fresh(&self) -> String {
        NodeId::generate(self.strategy).to_string()
    }

    /// Walks `node` in preorder (rows when present, otherwise cells) and gives
    /// every node without an id a fresh one. Returns how many ids were minted.
    pub fn assign<S>(&self, node: &mut Node<S>) -> usize {
        let mut minted = 0;
        if node.id().is_none() {
            node.id = Some(self.fresh());
            minted += 1;
        }
        for child in node.children_mut() {
            minted += self.assign(child);
        }
        minted
    }
}

/// Consuming shorthand for [`IdAssigner::assign`] with random ids.
pub fn assign_ids<S>(mut node: Node<S>) -> Node<S> {
    IdAssigner::default().assign(&mut node);
    node
}
