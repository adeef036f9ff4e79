//! Graph wire types

use serde::{Deserialize, Serialize};

/// Relation between consecutive episodic memories
pub const RELATION_FOLLOWED_BY: &str = "followed_by";
/// Relation from an episode to the semantic concept it instantiates
pub const RELATION_INSTANCE_OF: &str = "instance_of";
/// Relation used for explicit links without a named relation
pub const RELATION_RELATED_TO: &str = "related_to";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub relation: String,
}

impl GraphEdge {
    pub fn new(source: &str, target: &str, relation: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            relation: relation.to_string(),
        }
    }
}

/// Full graph snapshot returned by `GET /graph`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_shape() {
        let snapshot = GraphSnapshot {
            nodes: vec![GraphNode {
                id: "mem-1".to_string(),
                label: "login".to_string(),
            }],
            edges: vec![GraphEdge::new("mem-1", "mem-1", RELATION_RELATED_TO)],
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["nodes"][0]["id"], "mem-1");
        assert_eq!(json["nodes"][0]["label"], "login");
        assert_eq!(json["edges"][0]["source"], "mem-1");
        assert_eq!(json["edges"][0]["relation"], "related_to");
    }

    #[test]
    fn test_empty_snapshot() {
        let json = serde_json::to_string(&GraphSnapshot::default()).unwrap();
        assert_eq!(json, r#"{"nodes":[],"edges":[]}"#);
    }
}
