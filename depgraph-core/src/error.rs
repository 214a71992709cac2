//! Error types for depgraph-core.

use thiserror::Error;

use crate::graph::NodeName;

/// Result type for depgraph-core operations.
///
/// Defaults to [`GraphError`], which covers every graph mutation and query.
pub type Result<T, E = GraphError> = std::result::Result<T, E>;

/// Errors raised by [`DepGraph`](crate::graph::DepGraph) operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// No node is registered under the given name.
    #[error("unknown node: {0}")]
    UnknownNode(NodeName),

    /// A dependency passed to `add_dependencies` has not been registered.
    #[error("cannot link {dependent} to unregistered dependency {dependency}")]
    UnregisteredDependency {
        dependent: NodeName,
        dependency: NodeName,
    },

    /// The graph's indexes disagree with each other.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Snapshot (de)serialization failed.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Errors raised while extracting dependencies from a signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The parameter has no declared type, so no dependency can be inferred.
    #[error("parameter `{parameter}` has no type annotation")]
    MissingAnnotation { parameter: String },

    /// The same parameter name is declared twice in one signature.
    #[error("parameter `{parameter}` is declared more than once")]
    DuplicateParameter { parameter: String },
}

/// Errors raised while loading a [`GraphConfig`](crate::config::GraphConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid graph config: {0}")]
    Parse(#[from] serde_json::Error),
}
