//! Dependency Graph
//!
//! This module implements the graph of "provides / depends-on" relationships
//! between named components.
//!
//! # Overview
//!
//! - Nodes are named vertices; each wraps the [`Dependency`](crate::Dependency)
//!   describing how its value is produced.
//! - Edges are relationships: an edge `(a, b)` means `a` requires `b`.
//!
//! The graph records that relationships exist and answers queries about
//! them. It never resolves or instantiates anything.
//!
//! # Design Decisions
//!
//! 1. Nodes are keyed by a composite `(namespace, name)` [`NodeName`], so
//!    identically named dependencies of different owners stay distinct.
//!
//! 2. The graph is indexed by name for O(1) lookups and by produced type for
//!    "everything that produces X" queries.
//!
//! 3. Reverse queries scan the relationship set by default. Large graphs can
//!    opt into forward/reverse adjacency indexes through
//!    [`GraphConfig`](crate::GraphConfig).

mod node;
mod shared;
mod snapshot;
mod store;

pub use node::{Node, NodeId, NodeName, NodeTree, NAMESPACE_SEPARATOR};
pub use shared::SharedDepGraph;
pub use snapshot::{EdgeRecord, GraphSnapshot, NodeRecord};
pub use store::{DepGraph, Relationship};
