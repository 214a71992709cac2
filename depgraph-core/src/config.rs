//! Graph configuration.
//!
//! Configuration is plain data: it can be built in code or deserialized from
//! JSON. Every field has a default, so a partial document is valid.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How `get_dependents` / `get_dependencies` answer their queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjacencyMode {
    /// Scan the relationship set on every query. O(|relationships|), no
    /// extra bookkeeping on insert.
    #[default]
    Scan,

    /// Keep forward and reverse adjacency sets alongside the relationship
    /// set. Queries are a single lookup.
    Indexed,
}

/// Configuration for a [`DepGraph`](crate::graph::DepGraph).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Query strategy for relationship lookups.
    pub adjacency: AdjacencyMode,

    /// Emit a `debug` event when a registration is ignored because the name
    /// is already taken by another node.
    pub log_duplicates: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            adjacency: AdjacencyMode::Scan,
            log_duplicates: true,
        }
    }
}

impl GraphConfig {
    /// Configuration with adjacency indexes enabled.
    pub fn indexed() -> Self {
        Self {
            adjacency: AdjacencyMode::Indexed,
            ..Self::default()
        }
    }

    /// Parse a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_scans() {
        let config = GraphConfig::default();
        assert_eq!(config.adjacency, AdjacencyMode::Scan);
        assert!(config.log_duplicates);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = GraphConfig::from_json(r#"{ "adjacency": "indexed" }"#).unwrap();
        assert_eq!(config.adjacency, AdjacencyMode::Indexed);
        assert!(config.log_duplicates);

        let config = GraphConfig::from_json("{}").unwrap();
        assert_eq!(config, GraphConfig::default());
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = GraphConfig::from_json(r#"{ "adjacency": "cached" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
