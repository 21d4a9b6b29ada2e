use crate::models::{Graph, Route, TagMatchSet};

/// Fraction of the route's distance covered by edges in `matching_edge_ids`.
///
/// 0.0 for a route with no distance. Edges unknown to the graph contribute
/// nothing.
pub fn score_route_for_tag(route: &Route, graph: &Graph, matching_edge_ids: &TagMatchSet) -> f64 {
    if route.distance_m <= 0.0 {
        return 0.0;
    }

    let matched_distance_m: f64 = route
        .edge_ids
        .iter()
        .filter(|edge_id| matching_edge_ids.contains(edge_id))
        .filter_map(|edge_id| graph.edge(*edge_id))
        .map(|edge| edge.distance_m)
        .sum();

    matched_distance_m / route.distance_m
}

/// Score every route and order by score descending; ties keep input order.
pub fn score_routes_for_tag(
    routes: Vec<Route>,
    graph: &Graph,
    matching_edge_ids: &TagMatchSet,
) -> Vec<(Route, f64)> {
    let mut scored: Vec<(Route, f64)> = routes
        .into_iter()
        .map(|route| {
            let score = score_route_for_tag(&route, graph, matching_edge_ids);
            (route, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored
}
