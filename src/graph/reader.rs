//! Live graph projection over memory items
//!
//! Derivation rules:
//! - one node per memory item, in insertion order
//! - `followed_by` between consecutive episodic items
//! - `instance_of` from an episodic item to each semantic item sharing
//!   its `data.concept`
//! - explicit `data.links`, either `[{"target": id, "relation": r}]` or
//!   `[id, ...]`; links to unknown ids are dropped

use super::types::*;
use crate::memory::{MemoryItem, MemoryStore, MemoryType};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Data keys consulted, in order, for a node label
const LABEL_KEYS: [&str; 5] = ["label", "name", "title", "concept", "event"];

/// Read-only knowledge graph view over a memory store
pub struct KnowledgeGraphReader {
    store: Arc<MemoryStore>,
}

impl KnowledgeGraphReader {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Current full graph snapshot
    pub async fn get_graph(&self) -> GraphSnapshot {
        let items = self.store.all().await;
        let snapshot = project(&items);
        tracing::debug!(
            nodes = snapshot.nodes.len(),
            edges = snapshot.edges.len(),
            "Projected knowledge graph"
        );
        snapshot
    }
}

/// Project memory items into nodes and edges
pub fn project(items: &[MemoryItem]) -> GraphSnapshot {
    let nodes: Vec<GraphNode> = items
        .iter()
        .map(|item| GraphNode {
            id: item.id.clone(),
            label: node_label(item),
        })
        .collect();

    let known: HashSet<&str> = items.iter().map(|i| i.id.as_str()).collect();
    let mut edges = EdgeSet::default();

    // Episodic timeline
    let episodes: Vec<&MemoryItem> = items
        .iter()
        .filter(|i| i.memory_type == MemoryType::Episodic)
        .collect();
    for pair in episodes.windows(2) {
        edges.push(GraphEdge::new(&pair[0].id, &pair[1].id, RELATION_FOLLOWED_BY));
    }

    // Episodes -> semantic concepts
    let mut concepts: HashMap<&str, Vec<&str>> = HashMap::new();
    for item in items.iter().filter(|i| i.memory_type == MemoryType::Semantic) {
        if let Some(concept) = item.data.get("concept").and_then(Value::as_str) {
            concepts.entry(concept).or_default().push(&item.id);
        }
    }
    for episode in &episodes {
        let Some(concept) = episode.data.get("concept").and_then(Value::as_str) else {
            continue;
        };
        for target in concepts.get(concept).into_iter().flatten() {
            edges.push(GraphEdge::new(&episode.id, target, RELATION_INSTANCE_OF));
        }
    }

    // Explicit links
    for item in items {
        for (target, relation) in explicit_links(&item.data) {
            if known.contains(target) {
                edges.push(GraphEdge::new(&item.id, target, relation));
            }
        }
    }

    GraphSnapshot {
        nodes,
        edges: edges.into_vec(),
    }
}

fn node_label(item: &MemoryItem) -> String {
    if let Some(text) = item.data.as_str().filter(|s| !s.is_empty()) {
        return text.to_string();
    }
    LABEL_KEYS
        .iter()
        .find_map(|key| {
            item.data
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} memory", item.memory_type))
}

fn explicit_links(data: &Value) -> Vec<(&str, &str)> {
    let Some(links) = data.get("links").and_then(Value::as_array) else {
        return Vec::new();
    };

    links
        .iter()
        .filter_map(|link| match link {
            Value::String(target) => Some((target.as_str(), RELATION_RELATED_TO)),
            Value::Object(obj) => {
                let target = obj.get("target")?.as_str()?;
                let relation = obj
                    .get("relation")
                    .and_then(Value::as_str)
                    .filter(|r| !r.is_empty())
                    .unwrap_or(RELATION_RELATED_TO);
                Some((target, relation))
            }
            _ => None,
        })
        .collect()
}

/// Insertion-ordered edge list without duplicates
#[derive(Default)]
struct EdgeSet {
    edges: Vec<GraphEdge>,
    seen: HashSet<(String, String, String)>,
}

impl EdgeSet {
    fn push(&mut self, edge: GraphEdge) {
        let key = (
            edge.source.clone(),
            edge.target.clone(),
            edge.relation.clone(),
        );
        if self.seen.insert(key) {
            self.edges.push(edge);
        }
    }

    fn into_vec(self) -> Vec<GraphEdge> {
        self.edges
    }
}
