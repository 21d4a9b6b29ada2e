use crate::models::{Coordinates, Graph, NodeId};

/// Ids of nodes within `max_start_distance_m` of `query`, in node-table order.
///
/// An empty result means no route can start near the query point.
pub fn candidate_start_nodes(
    graph: &Graph,
    query: &Coordinates,
    max_start_distance_m: f64,
) -> Vec<NodeId> {
    graph
        .nodes()
        .iter()
        .filter(|node| query.distance_m(&node.coordinates()) <= max_start_distance_m)
        .map(|node| node.node_id)
        .collect()
}
