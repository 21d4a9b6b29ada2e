use std::sync::Arc;
use walkroute::config::RouteBuilderConfig;
use walkroute::db::{InMemoryFeatureIndex, InMemoryGraphProvider, InMemoryUserProfileStore};
use walkroute::models::{Coordinates, Edge, Graph, Node, RouteParams, UserProfile};
use walkroute::services::route_generator::RouteGenerator;
use walkroute::AppState;

/// Three nodes in a line, ~111 m apart; only edge 1 is paved.
#[allow(dead_code)]
pub fn three_node_graph() -> Graph {
    Graph::new(
        vec![
            Node::new(1, 0.0, 0.0),
            Node::new(2, 0.0, 0.001),
            Node::new(3, 0.0, 0.002),
        ],
        vec![
            Edge::new(1, 1, 2, 111.0, 1).with_tag("paved", "yes"),
            Edge::new(2, 2, 3, 111.0, 1).with_tag("paved", "no"),
        ],
    )
}

/// Bidirectional `size` x `size` grid with 100 m edges.
///
/// Node ids are `row * size + col`. Horizontal edges are paved, lit and on
/// sidewalks; vertical edges are gravel paths.
#[allow(dead_code)]
pub fn grid_graph(size: i64) -> Graph {
    let id = |row: i64, col: i64| row * size + col;
    let mut nodes = Vec::new();
    for row in 0..size {
        for col in 0..size {
            nodes.push(Node::new(id(row, col), row as f64 * 0.0009, col as f64 * 0.0009));
        }
    }

    let mut edges = Vec::new();
    let mut next_edge = 0;
    let mut push = |from: i64, to: i64, horizontal: bool, edges: &mut Vec<Edge>| {
        let edge = Edge::new(next_edge, from, to, 100.0, if horizontal { 1 } else { 2 });
        let edge = if horizontal {
            edge.with_tag("surface", "asphalt")
                .with_tag("lit", "yes")
                .with_tag("sidewalk", "both")
                .with_tag("highway", "residential")
        } else {
            edge.with_tag("surface", "gravel").with_tag("highway", "path")
        };
        edges.push(edge);
        next_edge += 1;
    };

    for row in 0..size {
        for col in 0..size {
            if col + 1 < size {
                push(id(row, col), id(row, col + 1), true, &mut edges);
                push(id(row, col + 1), id(row, col), true, &mut edges);
            }
            if row + 1 < size {
                push(id(row, col), id(row + 1, col), false, &mut edges);
                push(id(row + 1, col), id(row, col), false, &mut edges);
            }
        }
    }

    Graph::new(nodes, edges)
}

/// Edge ids of the paved (horizontal) grid edges.
#[allow(dead_code)]
pub fn paved_edges(graph: &Graph) -> Vec<i64> {
    graph
        .edges()
        .iter()
        .filter(|e| e.tag("surface") == Some("asphalt"))
        .map(|e| e.edge_id)
        .collect()
}

#[allow(dead_code)]
pub fn test_params(lat: f64, lon: f64, min: f64, max: f64) -> RouteParams {
    let mut params = RouteParams::new(
        Coordinates::new(lat, lon).unwrap(),
        min,
        max,
        &RouteBuilderConfig::default(),
    );
    params.seed = Some(42);
    params
}

#[allow(dead_code)]
pub fn wheelchair_user() -> UserProfile {
    UserProfile {
        user_id: "wheels".to_string(),
        requires_wheelchair: true,
        accessibility_weight: 2.0,
        urban_weight: 1.0,
        relaxed_weight: 0.0,
    }
}

/// App state over an in-memory grid with a `paved` feature index.
#[allow(dead_code)]
pub fn test_state(graph: Graph) -> Arc<AppState> {
    let paved = paved_edges(&graph);
    let graph_provider = Arc::new(InMemoryGraphProvider::new(graph));
    let feature_index = Arc::new(InMemoryFeatureIndex::new().with_tag("paved", paved));

    Arc::new(AppState {
        route_generator: RouteGenerator::new(graph_provider.clone(), feature_index),
        graph_provider,
        user_store: Arc::new(InMemoryUserProfileStore::new([wheelchair_user()])),
        defaults: RouteBuilderConfig {
            seed: Some(7),
            max_attempts: 200,
            ..RouteBuilderConfig::default()
        },
    })
}
