//! Graph Nodes
//!
//! This module defines the vertex type that lives in the dependency graph,
//! together with its name key.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dependency::{AnyDependency, Dependency, TypeKey};

/// Separator between a namespace and a name in the dotted form.
pub const NAMESPACE_SEPARATOR: char = '.';

/// Unique identifier for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// The key a node is registered under.
///
/// A name is a `(namespace, name)` pair. Two owners can each declare a
/// dependency called `dep1` without colliding, because `EntityA.dep1` and
/// `EntityB.dep1` are different keys.
///
/// Every name is kept in one canonical split: the leaf never contains a `.`
/// and the namespace is never empty. Constructors join their parts and split
/// on the last `.`, so `scoped("App", "db.url")` and `scoped("App.db", "url")`
/// are the same key, and `NodeName::parse(&name.to_string()) == name` holds
/// for every name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawNodeName")]
pub struct NodeName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    name: String,
}

/// Wire form of [`NodeName`], canonicalized on the way in.
#[derive(Deserialize)]
struct RawNodeName {
    #[serde(default)]
    namespace: Option<String>,
    name: String,
}

impl From<RawNodeName> for NodeName {
    fn from(raw: RawNodeName) -> Self {
        match raw.namespace {
            Some(namespace) => Self::scoped(namespace, raw.name),
            None => Self::new(raw.name),
        }
    }
}

impl NodeName {
    /// A name without an explicit namespace. A `.` in `name` still scopes it.
    pub fn new(name: impl Into<String>) -> Self {
        Self::parse(&name.into())
    }

    /// A name inside `namespace`.
    pub fn scoped(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let name = name.into();
        if namespace.is_empty() {
            Self::parse(&name)
        } else {
            Self::parse(&format!("{}{}{}", namespace, NAMESPACE_SEPARATOR, name))
        }
    }

    /// Parse the dotted form, splitting on the last `.`. An empty namespace
    /// part means unscoped.
    pub fn parse(qualified: &str) -> Self {
        match qualified.rsplit_once(NAMESPACE_SEPARATOR) {
            Some((namespace, name)) if !namespace.is_empty() => Self {
                namespace: Some(namespace.to_string()),
                name: name.to_string(),
            },
            Some((_, name)) => Self {
                namespace: None,
                name: name.to_string(),
            },
            None => Self {
                namespace: None,
                name: qualified.to_string(),
            },
        }
    }

    /// A name scoped under this one, e.g. `EntityA` + `dep1` → `EntityA.dep1`.
    pub fn child(&self, name: impl Into<String>) -> Self {
        Self::scoped(self.to_string(), name)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_scoped(&self) -> bool {
        self.namespace.is_some()
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}{}{}", namespace, NAMESPACE_SEPARATOR, self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl From<&str> for NodeName {
    fn from(qualified: &str) -> Self {
        Self::parse(qualified)
    }
}

impl From<String> for NodeName {
    fn from(qualified: String) -> Self {
        Self::parse(&qualified)
    }
}

impl From<&NodeName> for NodeName {
    fn from(name: &NodeName) -> Self {
        name.clone()
    }
}

impl<N: Into<String>, M: Into<String>> From<(N, M)> for NodeName {
    fn from((namespace, name): (N, M)) -> Self {
        Self::scoped(namespace, name)
    }
}

/// A named vertex in the dependency graph.
///
/// A node is a cheap handle: clones share the same identity. Equality and
/// hashing follow the [`NodeId`], never the name or the dependency, so two
/// separately built nodes are always distinct even when their fields match.
#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

struct NodeInner {
    id: NodeId,
    name: NodeName,
    dependency: AnyDependency,
}

impl Node {
    /// Create a node for a typed dependency.
    pub fn new<T: 'static, A: 'static>(name: impl Into<NodeName>, dependency: Dependency<T, A>) -> Self {
        Self::from_erased(name, dependency.erase())
    }

    /// Create a node for an already erased dependency.
    pub fn from_erased(name: impl Into<NodeName>, dependency: AnyDependency) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                id: NodeId::new(),
                name: name.into(),
                dependency,
            }),
        }
    }

    /// Get the node's ID.
    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    /// Get the node's name.
    pub fn name(&self) -> &NodeName {
        &self.inner.name
    }

    /// Get the dependency this node represents.
    pub fn dependency(&self) -> &AnyDependency {
        &self.inner.dependency
    }

    /// Get the type this node produces.
    pub fn produces(&self) -> TypeKey {
        self.inner.dependency.produces()
    }

    /// Recover the typed dependency record.
    pub fn typed<T: 'static>(&self) -> Option<&Dependency<T>> {
        self.inner.dependency.downcast::<T>()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Node(name={}, dependency_type={:?})",
            self.inner.name, self.inner.dependency
        )
    }
}

/// A node together with the nodes it depends on, nested to any depth.
///
/// Passed to [`DepGraph::add_subtree`](super::DepGraph::add_subtree) to
/// register a whole dependency tree in one call.
#[derive(Debug, Clone)]
pub struct NodeTree {
    node: Node,
    dependencies: Vec<NodeTree>,
}

impl NodeTree {
    /// A tree with no dependencies.
    pub fn new(node: Node) -> Self {
        Self {
            node,
            dependencies: Vec::new(),
        }
    }

    /// Add a dependency subtree.
    pub fn with(mut self, dependency: NodeTree) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Add a leaf dependency.
    pub fn depends_on(self, dependency: Node) -> Self {
        self.with(NodeTree::new(dependency))
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn dependencies(&self) -> &[NodeTree] {
        &self.dependencies
    }
}

impl From<Node> for NodeTree {
    fn from(node: Node) -> Self {
        Self::new(node)
    }
}
