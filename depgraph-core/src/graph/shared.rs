//! Shared Graph Handle
//!
//! [`DepGraph`] has no internal locking. Hosts that touch a graph from several
//! threads share it through [`SharedDepGraph`], which serializes every
//! mutation behind a write lock and every query behind a read lock.

use std::sync::Arc;

use indexmap::IndexSet;
use parking_lot::RwLock;

use super::node::{Node, NodeName, NodeTree};
use super::snapshot::GraphSnapshot;
use super::store::DepGraph;
use crate::error::Result;

/// A cloneable, lock-protected handle to a [`DepGraph`].
///
/// Each method holds the lock for exactly one graph operation. Use
/// [`read`](Self::read) or [`write`](Self::write) when several operations
/// must observe the same state.
#[derive(Clone, Default)]
pub struct SharedDepGraph {
    inner: Arc<RwLock<DepGraph>>,
}

impl SharedDepGraph {
    pub fn new(graph: DepGraph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    pub fn add_node<I>(&self, node: Node, dependencies: I) -> Node
    where
        I: IntoIterator<Item = Node>,
    {
        self.inner.write().add_node(node, dependencies)
    }

    pub fn add_subtree(&self, tree: &NodeTree) -> Node {
        self.inner.write().add_subtree(tree)
    }

    pub fn add_dependencies<N, I>(&self, name: N, dependencies: I) -> Result<()>
    where
        N: Into<NodeName>,
        I: IntoIterator<Item = Node>,
    {
        self.inner.write().add_dependencies(name, dependencies)
    }

    pub fn add_relationship<N, M>(&self, dependent: N, dependency: M) -> Result<()>
    where
        N: Into<NodeName>,
        M: Into<NodeName>,
    {
        self.inner.write().add_relationship(dependent, dependency)
    }

    /// Get a handle to the node registered under `name`.
    pub fn get_by_name<N: Into<NodeName>>(&self, name: N) -> Result<Node> {
        self.inner.read().get_by_name(name).cloned()
    }

    pub fn get_dependents<N: Into<NodeName>>(&self, name: N) -> Result<IndexSet<Node>> {
        self.inner.read().get_dependents(name)
    }

    pub fn get_dependencies<N: Into<NodeName>>(&self, name: N) -> Result<IndexSet<Node>> {
        self.inner.read().get_dependencies(name)
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        self.inner.read().snapshot()
    }

    /// Run `f` with shared access to the graph.
    pub fn read<R>(&self, f: impl FnOnce(&DepGraph) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` with exclusive access to the graph.
    pub fn write<R>(&self, f: impl FnOnce(&mut DepGraph) -> R) -> R {
        f(&mut self.inner.write())
    }
}

impl From<DepGraph> for SharedDepGraph {
    fn from(graph: DepGraph) -> Self {
        Self::new(graph)
    }
}
