//! Dependency Graph Store
//!
//! [`DepGraph`] owns every registered node and the directed relationships
//! between them. Nodes are indexed twice: by name (the primary key) and by the
//! type they produce. Relationships are a set of `(dependent, dependency)`
//! pairs.
//!
//! # Invariants
//!
//! After every public operation:
//!
//! 1. The name index and the type index hold exactly the same nodes.
//! 2. Both ends of every relationship are the nodes registered under their
//!    names. Edges are always created against the registered node, so a
//!    same-named stray object can never leak into the relationship set.
//! 3. A name maps to the first node registered under it. Later registrations
//!    under that name are ignored.
//! 4. Relationships are a set. Repeated edges collapse; self-loops are kept.
//!
//! The graph only grows: there is no removal.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use super::node::{Node, NodeId, NodeName, NodeTree};
use super::snapshot::GraphSnapshot;
use crate::config::{AdjacencyMode, GraphConfig};
use crate::dependency::TypeKey;
use crate::error::{GraphError, Result};

/// A directed edge: `dependent` requires `dependency`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Relationship {
    dependent: Node,
    dependency: Node,
}

impl Relationship {
    pub fn dependent(&self) -> &Node {
        &self.dependent
    }

    pub fn dependency(&self) -> &Node {
        &self.dependency
    }

    /// Whether the edge points from a node to itself.
    pub fn is_self_loop(&self) -> bool {
        self.dependent == self.dependency
    }
}

/// The indexed store of nodes and relationships.
pub struct DepGraph {
    config: GraphConfig,

    /// Primary index: name to its unique node.
    name_index: IndexMap<NodeName, Node>,

    /// Produced type to every node producing it.
    type_index: IndexMap<TypeKey, IndexSet<Node>>,

    relationships: IndexSet<Relationship>,

    /// Forward and reverse adjacency, only maintained in
    /// [`AdjacencyMode::Indexed`].
    dependencies: HashMap<NodeId, IndexSet<Node>>,
    dependents: HashMap<NodeId, IndexSet<Node>>,
}

impl DepGraph {
    /// Create an empty graph with the default configuration.
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    /// Create an empty graph with the given configuration.
    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            config,
            name_index: IndexMap::new(),
            type_index: IndexMap::new(),
            relationships: IndexSet::new(),
            dependencies: HashMap::new(),
            dependents: HashMap::new(),
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Register `node` and each of `dependencies`, and link `node` to every
    /// dependency.
    ///
    /// Registration is idempotent per name: if a name is already taken the
    /// existing node is kept and used for the edges. Returns the node that is
    /// registered under `node`'s name after the call.
    pub fn add_node<I>(&mut self, node: Node, dependencies: I) -> Node
    where
        I: IntoIterator<Item = Node>,
    {
        let node = self.register(node);
        for dependency in dependencies {
            let dependency = self.register(dependency);
            self.link(&node, &dependency);
        }
        node
    }

    /// Register a whole dependency tree, linking every node to its direct
    /// children. Returns the registered root.
    pub fn add_subtree(&mut self, tree: &NodeTree) -> Node {
        let node = self.register(tree.node().clone());
        for child in tree.dependencies() {
            let dependency = self.add_subtree(child);
            self.link(&node, &dependency);
        }
        node
    }

    /// Link the node registered under `name` to each of `dependencies`.
    ///
    /// Unlike [`add_node`](Self::add_node) this never registers anything.
    /// Every dependency must be the node already registered under its name;
    /// the whole batch is checked before any edge is added.
    pub fn add_dependencies<N, I>(&mut self, name: N, dependencies: I) -> Result<()>
    where
        N: Into<NodeName>,
        I: IntoIterator<Item = Node>,
    {
        let name = name.into();
        let node = self.lookup(&name)?.clone();
        let dependencies: Vec<Node> = dependencies.into_iter().collect();

        if let Some(stray) = dependencies
            .iter()
            .find(|d| self.name_index.get(d.name()) != Some(*d))
        {
            return Err(GraphError::UnregisteredDependency {
                dependent: name,
                dependency: stray.name().clone(),
            });
        }

        for dependency in &dependencies {
            self.link(&node, dependency);
        }
        Ok(())
    }

    /// Link two registered nodes by name.
    pub fn add_relationship<N, M>(&mut self, dependent: N, dependency: M) -> Result<()>
    where
        N: Into<NodeName>,
        M: Into<NodeName>,
    {
        let dependent = self.lookup(&dependent.into())?.clone();
        let dependency = self.lookup(&dependency.into())?.clone();
        self.link(&dependent, &dependency);
        Ok(())
    }

    /// Get the node registered under `name`.
    pub fn get_by_name<N: Into<NodeName>>(&self, name: N) -> Result<&Node> {
        self.lookup(&name.into())
    }

    /// Every node that depends on `name`.
    pub fn get_dependents<N: Into<NodeName>>(&self, name: N) -> Result<IndexSet<Node>> {
        let node = self.lookup(&name.into())?;
        Ok(match self.config.adjacency {
            AdjacencyMode::Scan => self
                .relationships
                .iter()
                .filter(|r| r.dependency == *node)
                .map(|r| r.dependent.clone())
                .collect(),
            AdjacencyMode::Indexed => self.dependents.get(&node.id()).cloned().unwrap_or_default(),
        })
    }

    /// Every node that `name` depends on.
    pub fn get_dependencies<N: Into<NodeName>>(&self, name: N) -> Result<IndexSet<Node>> {
        let node = self.lookup(&name.into())?;
        Ok(match self.config.adjacency {
            AdjacencyMode::Scan => self
                .relationships
                .iter()
                .filter(|r| r.dependent == *node)
                .map(|r| r.dependency.clone())
                .collect(),
            AdjacencyMode::Indexed => self.dependencies.get(&node.id()).cloned().unwrap_or_default(),
        })
    }

    /// Every node producing `ty`.
    pub fn nodes_of_type(&self, ty: TypeKey) -> IndexSet<Node> {
        self.type_index.get(&ty).cloned().unwrap_or_default()
    }

    /// Every node producing `T`.
    pub fn get_by_type<T: ?Sized + 'static>(&self) -> IndexSet<Node> {
        self.nodes_of_type(TypeKey::of::<T>())
    }

    pub fn contains<N: Into<NodeName>>(&self, name: N) -> bool {
        self.name_index.contains_key(&name.into())
    }

    /// Whether the edge `dependent -> dependency` exists.
    pub fn contains_relationship<N, M>(&self, dependent: N, dependency: M) -> bool
    where
        N: Into<NodeName>,
        M: Into<NodeName>,
    {
        match (
            self.name_index.get(&dependent.into()),
            self.name_index.get(&dependency.into()),
        ) {
            (Some(dependent), Some(dependency)) => self.relationships.contains(&Relationship {
                dependent: dependent.clone(),
                dependency: dependency.clone(),
            }),
            _ => false,
        }
    }

    /// Registered nodes in registration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.name_index.values()
    }

    /// Relationships in insertion order.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.iter()
    }

    /// Get the total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.name_index.len()
    }

    /// Get the total number of relationships in the graph.
    pub fn edge_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_index.is_empty()
    }

    /// Capture a serializable view of the graph.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::from(self)
    }

    /// Verify that the indexes agree with each other.
    ///
    /// Returns the first violation found.
    pub fn check_invariants(&self) -> Result<()> {
        let mut typed = 0;
        for (ty, nodes) in &self.type_index {
            for node in nodes {
                if node.produces() != *ty {
                    return Err(GraphError::InvariantViolation(format!(
                        "{:?} indexed under type {}",
                        node, ty
                    )));
                }
                if self.name_index.get(node.name()) != Some(node) {
                    return Err(GraphError::InvariantViolation(format!(
                        "{:?} is in the type index but not the name index",
                        node
                    )));
                }
            }
            typed += nodes.len();
        }
        if typed != self.name_index.len() {
            return Err(GraphError::InvariantViolation(format!(
                "type index holds {} nodes, name index holds {}",
                typed,
                self.name_index.len()
            )));
        }

        for (name, node) in &self.name_index {
            if node.name() != name {
                return Err(GraphError::InvariantViolation(format!(
                    "{:?} registered under {}",
                    node, name
                )));
            }
        }

        for relationship in &self.relationships {
            for end in [&relationship.dependent, &relationship.dependency] {
                if self.name_index.get(end.name()) != Some(end) {
                    return Err(GraphError::InvariantViolation(format!(
                        "dangling edge {} -> {}",
                        relationship.dependent.name(),
                        relationship.dependency.name()
                    )));
                }
            }
        }

        if self.config.adjacency == AdjacencyMode::Indexed {
            let forward: usize = self.dependencies.values().map(IndexSet::len).sum();
            let reverse: usize = self.dependents.values().map(IndexSet::len).sum();
            if forward != self.relationships.len() || reverse != self.relationships.len() {
                return Err(GraphError::InvariantViolation(format!(
                    "adjacency holds {}/{} edges, relationship set holds {}",
                    forward,
                    reverse,
                    self.relationships.len()
                )));
            }
        }

        Ok(())
    }

    fn lookup(&self, name: &NodeName) -> Result<&Node> {
        self.name_index
            .get(name)
            .ok_or_else(|| GraphError::UnknownNode(name.clone()))
    }

    /// Insert `node` into both indexes unless its name is taken. Returns the
    /// node registered under the name.
    fn register(&mut self, node: Node) -> Node {
        if let Some(existing) = self.name_index.get(node.name()) {
            if self.config.log_duplicates && *existing != node {
                debug!(
                    name = %node.name(),
                    kept = existing.id().raw(),
                    ignored = node.id().raw(),
                    "name already registered, keeping first node"
                );
            }
            return existing.clone();
        }

        trace!(name = %node.name(), produces = %node.produces(), "registering node");
        self.type_index
            .entry(node.produces())
            .or_default()
            .insert(node.clone());
        self.name_index.insert(node.name().clone(), node.clone());
        node
    }

    /// The only place edges are inserted. Both ends must be registered.
    fn link(&mut self, dependent: &Node, dependency: &Node) {
        let relationship = Relationship {
            dependent: dependent.clone(),
            dependency: dependency.clone(),
        };
        if !self.relationships.insert(relationship) {
            return;
        }

        trace!(dependent = %dependent.name(), dependency = %dependency.name(), "adding relationship");
        if self.config.adjacency == AdjacencyMode::Indexed {
            self.dependencies
                .entry(dependent.id())
                .or_default()
                .insert(dependency.clone());
            self.dependents
                .entry(dependency.id())
                .or_default()
                .insert(dependent.clone());
        }
    }
}

impl Default for DepGraph {
    fn default() -> Self {
        Self::new()
    }
}
