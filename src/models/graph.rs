//! Walkable street graph held as flat node/edge tables.
//!
//! Edges reference nodes by id and the adjacency index references edges by
//! their slot in the edge table, so the structure has no pointer cycles and is
//! cheap to share read-only across generation workers.

use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub type NodeId = i64;
pub type EdgeId = i64;
pub type WayId = i64;

/// Free-form feature metadata copied from the source way (surface, lit, ...).
pub type Tags = HashMap<String, String>;

/// Edge ids considered to carry one requested feature tag.
pub type TagMatchSet = HashSet<EdgeId>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub node_id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

impl Node {
    pub fn new(node_id: NodeId, lat: f64, lon: f64) -> Self {
        Node { node_id, lat, lon }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// One directed segment between two consecutive nodes of a way.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    pub edge_id: EdgeId,
    pub start_node: NodeId,
    pub end_node: NodeId,
    pub distance_m: f64,
    pub way_id: WayId,
    #[serde(default)]
    pub tags: Tags,
}

impl Edge {
    pub fn new(
        edge_id: EdgeId,
        start_node: NodeId,
        end_node: NodeId,
        distance_m: f64,
        way_id: WayId,
    ) -> Self {
        Edge {
            edge_id,
            start_node,
            end_node,
            distance_m,
            way_id,
            tags: Tags::new(),
        }
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_string(), value.to_string());
        self
    }

    /// Value of tag `key`, if present.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Immutable node/edge tables plus the derived outgoing-edge index.
///
/// Referential integrity (edges pointing at known nodes) is the loader's
/// responsibility and is not checked here.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_slots: HashMap<NodeId, usize>,
    edge_slots: HashMap<EdgeId, usize>,
    adjacency: HashMap<NodeId, Vec<usize>>,
}

impl Graph {
    /// Build the graph and its adjacency index in one pass over the edges.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let node_slots = nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| (node.node_id, slot))
            .collect();

        let mut edge_slots = HashMap::with_capacity(edges.len());
        let mut adjacency: HashMap<NodeId, Vec<usize>> = HashMap::new();
        for (slot, edge) in edges.iter().enumerate() {
            edge_slots.insert(edge.edge_id, slot);
            adjacency.entry(edge.start_node).or_default().push(slot);
        }

        Graph {
            nodes,
            edges,
            node_slots,
            edge_slots,
            adjacency,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in table order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in table order; an edge's position is its slot.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.node_slots.get(&node_id).map(|&slot| &self.nodes[slot])
    }

    pub fn edge(&self, edge_id: EdgeId) -> Option<&Edge> {
        self.edge_slots.get(&edge_id).map(|&slot| &self.edges[slot])
    }

    #[inline]
    pub fn edge_at(&self, slot: usize) -> &Edge {
        &self.edges[slot]
    }

    /// Slots of the edges leaving `node_id`, in edge-table order.
    #[inline]
    pub fn out_edges(&self, node_id: NodeId) -> &[usize] {
        self.adjacency
            .get(&node_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Outgoing edge ids of `node_id`.
    pub fn out_edge_ids(&self, node_id: NodeId) -> Vec<EdgeId> {
        self.out_edges(node_id)
            .iter()
            .map(|&slot| self.edges[slot].edge_id)
            .collect()
    }

    /// Per-slot membership flags for a tag match set.
    pub fn tag_mask(&self, matches: &TagMatchSet) -> Vec<bool> {
        self.edges
            .iter()
            .map(|edge| matches.contains(&edge.edge_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branching_graph() -> Graph {
        let nodes = vec![
            Node::new(1, 0.0, 0.0),
            Node::new(2, 0.0, 0.001),
            Node::new(3, 0.0, 0.002),
        ];
        let edges = vec![
            Edge::new(10, 1, 2, 111.0, 100),
            Edge::new(11, 1, 3, 222.0, 100),
            Edge::new(12, 2, 3, 111.0, 101).with_tag("surface", "asphalt"),
        ];
        Graph::new(nodes, edges)
    }

    #[test]
    fn test_adjacency_keeps_edge_order() {
        let graph = branching_graph();
        assert_eq!(graph.out_edge_ids(1), vec![10, 11]);
        assert_eq!(graph.out_edge_ids(2), vec![12]);
    }

    #[test]
    fn test_node_without_outgoing_edges() {
        let graph = branching_graph();
        assert!(graph.out_edges(3).is_empty());
        assert!(graph.out_edges(999).is_empty());
    }

    #[test]
    fn test_lookup_by_id() {
        let graph = branching_graph();
        assert_eq!(graph.node(2).unwrap().lon, 0.001);
        assert_eq!(graph.edge(12).unwrap().tag("surface"), Some("asphalt"));
        assert!(graph.edge(99).is_none());
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_tag_mask_follows_edge_slots() {
        let graph = branching_graph();
        let matches: TagMatchSet = [12, 500].into_iter().collect();
        assert_eq!(graph.tag_mask(&matches), vec![false, false, true]);
    }
}
