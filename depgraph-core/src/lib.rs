//! Depgraph Core
//!
//! This crate models "provides / depends-on" relationships between named
//! components and infers those relationships from construction signatures.
//! It implements:
//!
//! - Dependency records (a factory plus the type it produces)
//! - Named, namespaced graph nodes
//! - An indexed dependency graph with name, type and relationship queries
//! - Dependency extraction from declared parameter lists
//!
//! The crate only records relationships. It never resolves or instantiates
//! a component.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `dependency`: `Dependency` records and their type-erased form
//! - `graph`: nodes, the `DepGraph` store, snapshots and a shared handle
//! - `extract`: signatures and dependency extraction
//! - `config`: graph configuration
//! - `error`: error types
//!
//! # Example
//!
//! ```rust
//! use depgraph_core::{Dependency, DepGraph, Node};
//!
//! let mut graph = DepGraph::new();
//!
//! let db = Node::new("App.db", Dependency::new(|| "postgres://localhost"));
//! let cache = Node::new("App.cache", Dependency::new(|| 64usize));
//! let app = Node::new("App", Dependency::new(|| ()));
//!
//! // Registers all three nodes and links App to both dependencies.
//! graph.add_node(app, [db.clone(), cache]);
//!
//! assert_eq!(graph.get_dependencies("App").unwrap().len(), 2);
//! assert!(graph.get_dependents("App.db").unwrap().iter().any(|n| n.name().name() == "App"));
//! assert_eq!(graph.get_by_name("App.db").unwrap(), &db);
//! ```

pub mod config;
pub mod dependency;
pub mod error;
pub mod extract;
pub mod graph;

pub use config::{AdjacencyMode, GraphConfig};
pub use dependency::{AnyDependency, Dependency, DependencyId, Factory, TypeKey};
pub use error::{ConfigError, ExtractError, GraphError, Result};
pub use extract::{
    extract_dependencies, extract_from_signature, populate, register, Constructible, DependencyMap,
    Signature, SignatureBuilder,
};
pub use graph::{DepGraph, GraphSnapshot, Node, NodeId, NodeName, NodeTree, Relationship, SharedDepGraph};
