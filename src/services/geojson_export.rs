use crate::models::{EdgeId, Graph, Route};
use geo::{Coord, LineString};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use std::collections::HashMap;

/// One `LineString` feature for `route`, coordinates as `[lon, lat]` per node.
///
/// Nodes missing from the graph are left out of the line.
pub fn route_to_feature(route: &Route, graph: &Graph) -> Feature {
    let line: LineString<f64> = route
        .node_ids
        .iter()
        .filter_map(|node_id| graph.node(*node_id))
        .map(|node| Coord {
            x: node.lon,
            y: node.lat,
        })
        .collect();

    let mut properties = JsonObject::new();
    properties.insert("distance_m".to_string(), JsonValue::from(route.distance_m));
    properties.insert("edge_ids".to_string(), JsonValue::from(route.edge_ids.clone()));
    properties.insert("node_ids".to_string(), JsonValue::from(route.node_ids.clone()));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::from(&line))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Feature collection with one feature per route, in order.
///
/// With `scores`, each feature gets a `tag_score` property looked up by edge
/// sequence (0.0 when absent).
pub fn routes_to_geojson(
    routes: &[Route],
    graph: &Graph,
    scores: Option<&HashMap<Vec<EdgeId>, f64>>,
) -> FeatureCollection {
    let features = routes
        .iter()
        .map(|route| {
            let mut feature = route_to_feature(route, graph);
            if let Some(scores) = scores {
                let score = scores.get(&route.edge_ids).copied().unwrap_or(0.0);
                feature.set_property("tag_score", score);
            }
            feature
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
