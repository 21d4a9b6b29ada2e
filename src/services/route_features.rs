//! Distance-weighted tag ratios of a route and profile-based ranking.

use crate::models::{Edge, Graph, Route, RouteFeatures, Tags, UserProfile};

fn tag<'a>(tags: &'a Tags, key: &str) -> Option<&'a str> {
    tags.get(key).map(String::as_str)
}

fn has_sidewalk(tags: &Tags) -> bool {
    matches!(tag(tags, "sidewalk"), Some(v) if !v.is_empty() && v != "no")
        || tag(tags, "footway") == Some("sidewalk")
}

fn is_lit(tags: &Tags) -> bool {
    tag(tags, "lit") == Some("yes")
}

fn is_residential(tags: &Tags) -> bool {
    tag(tags, "highway") == Some("residential")
}

fn is_trail(tags: &Tags) -> bool {
    matches!(tag(tags, "highway"), Some("footway" | "path"))
}

fn is_paved(tags: &Tags) -> bool {
    matches!(tag(tags, "surface"), Some("asphalt" | "concrete" | "paved"))
}

fn is_accessible(tags: &Tags) -> bool {
    tag(tags, "wheelchair") == Some("yes") || tag(tags, "smoothness") == Some("good")
}

fn is_steps(tags: &Tags) -> bool {
    tag(tags, "highway") == Some("steps")
}

/// Parse an `incline` tag such as `"5%"` or `"-2.5"` into a fraction.
///
/// Direction words (`up`, `down`) and other non-numeric values yield `None`.
pub fn parse_incline(raw: &str) -> Option<f64> {
    raw.trim()
        .trim_matches('%')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v / 100.0)
}

/// Feature ratios of `route` over the edges of `graph`.
///
/// Edges missing from the graph contribute nothing. A route with no distance
/// has every ratio at 0.0.
pub fn compute_route_features(route: &Route, graph: &Graph) -> RouteFeatures {
    let edges: Vec<&Edge> = route
        .edge_ids
        .iter()
        .filter_map(|edge_id| graph.edge(*edge_id))
        .collect();

    let total_m = route.distance_m;
    let ratio = |predicate: fn(&Tags) -> bool| -> f64 {
        if total_m <= 0.0 {
            return 0.0;
        }
        let matched_m: f64 = edges
            .iter()
            .filter(|edge| predicate(&edge.tags))
            .map(|edge| edge.distance_m)
            .sum();
        matched_m / total_m
    };

    let inclines: Vec<f64> = edges
        .iter()
        .filter_map(|edge| edge.tag("incline"))
        .filter_map(parse_incline)
        .collect();
    let avg_incline = if inclines.is_empty() {
        None
    } else {
        Some(inclines.iter().sum::<f64>() / inclines.len() as f64)
    };

    RouteFeatures {
        length_m: total_m,
        sidewalk_ratio: ratio(has_sidewalk),
        lit_ratio: ratio(is_lit),
        residential_ratio: ratio(is_residential),
        trail_ratio: ratio(is_trail),
        paved_ratio: ratio(is_paved),
        accessible_ratio: ratio(is_accessible),
        steps_ratio: ratio(is_steps),
        avg_incline,
    }
}

/// Drop routes `profile` does not allow and order the rest by preference
/// score, best first; ties keep input order.
pub fn rank_routes_for_profile(
    routes: Vec<Route>,
    graph: &Graph,
    profile: &UserProfile,
) -> Vec<(Route, RouteFeatures, f64)> {
    let mut ranked: Vec<(Route, RouteFeatures, f64)> = routes
        .into_iter()
        .filter_map(|route| {
            let features = compute_route_features(&route, graph);
            if !profile.allowed(&features) {
                return None;
            }
            let score = profile.score(&features);
            Some((route, features, score))
        })
        .collect();

    ranked.sort_by(|a, b| b.2.total_cmp(&a.2));
    ranked
}
