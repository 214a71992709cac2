//! Graph Snapshots
//!
//! A snapshot is a plain-data copy of a graph's vertex names, produced types
//! and edges. It exists so a host can inspect or dump a graph without holding
//! on to the graph itself.

use serde::{Deserialize, Serialize};

use super::node::NodeName;
use super::store::DepGraph;
use crate::error::Result;

/// A registered node, as seen in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: NodeName,
    /// Name of the produced type.
    pub produces: String,
}

/// A relationship, as seen in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub dependent: NodeName,
    pub dependency: NodeName,
}

/// Serializable view of a [`DepGraph`].
///
/// Nodes appear in registration order and edges in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeRecord>,
    pub relationships: Vec<EdgeRecord>,
}

impl GraphSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Names of the nodes `name` depends on.
    pub fn dependencies_of(&self, name: &NodeName) -> Vec<&NodeName> {
        self.relationships
            .iter()
            .filter(|edge| &edge.dependent == name)
            .map(|edge| &edge.dependency)
            .collect()
    }
}

impl From<&DepGraph> for GraphSnapshot {
    fn from(graph: &DepGraph) -> Self {
        Self {
            nodes: graph
                .nodes()
                .map(|node| NodeRecord {
                    name: node.name().clone(),
                    produces: node.produces().name().to_string(),
                })
                .collect(),
            relationships: graph
                .relationships()
                .map(|r| EdgeRecord {
                    dependent: r.dependent().name().clone(),
                    dependency: r.dependency().name().clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::Dependency;
    use crate::graph::Node;

    #[test]
    fn snapshot_lists_nodes_and_edges() {
        let mut graph = DepGraph::new();
        let service = Node::new("Service", Dependency::new(|| "service"));
        let port = Node::new("Service.port", Dependency::new(|| 8080u16));
        graph.add_node(service, [port]);

        let snapshot = graph.snapshot();

        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes[0].name, NodeName::new("Service"));
        assert_eq!(snapshot.nodes[1].produces, "u16");
        assert_eq!(
            snapshot.dependencies_of(&NodeName::new("Service")),
            vec![&NodeName::scoped("Service", "port")]
        );
    }

    #[test]
    fn snapshot_json_shape() {
        let mut graph = DepGraph::new();
        graph.add_node(Node::new("a.b", Dependency::new(|| 1u8)), []);

        let json: serde_json::Value = serde_json::from_str(&graph.snapshot().to_json().unwrap()).unwrap();

        assert_eq!(json["nodes"][0]["name"]["namespace"], "a");
        assert_eq!(json["nodes"][0]["name"]["name"], "b");
        assert_eq!(json["nodes"][0]["produces"], "u8");
        assert!(json["relationships"].as_array().unwrap().is_empty());
    }

    #[test]
    fn unscoped_names_omit_namespace() {
        let mut graph = DepGraph::new();
        graph.add_node(Node::new("plain", Dependency::new(|| 1u8)), []);

        let json = graph.snapshot().to_json().unwrap();
        assert!(!json.contains("namespace"));

        let parsed = GraphSnapshot::from_json(&json).unwrap();
        assert_eq!(parsed.nodes[0].name, NodeName::new("plain"));
    }
}
