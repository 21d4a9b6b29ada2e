use crate::config::RouteBuilderConfig;
use crate::error::{AppError, Result};
use crate::models::graph::{EdgeId, Graph, NodeId};
use crate::models::{CompositeScores, Coordinates, RouteFeatures};
use serde::{Deserialize, Serialize};

/// An ordered walk over the graph.
///
/// `node_ids` has one more entry than `edge_ids`; edge `i` leads from
/// `node_ids[i]` to `node_ids[i + 1]` and `distance_m` is the sum of the edge
/// lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub node_ids: Vec<NodeId>,
    pub edge_ids: Vec<EdgeId>,
    pub distance_m: f64,
}

impl Route {
    /// Assemble a route from a contiguous chain of known edges.
    ///
    /// Returns `None` for an empty chain, an unknown edge id, or a chain whose
    /// edges do not connect end-to-start.
    pub fn from_edges(graph: &Graph, edge_ids: &[EdgeId]) -> Option<Route> {
        let first = graph.edge(*edge_ids.first()?)?;
        let mut node_ids = Vec::with_capacity(edge_ids.len() + 1);
        node_ids.push(first.start_node);
        let mut distance_m = 0.0;

        for &edge_id in edge_ids {
            let edge = graph.edge(edge_id)?;
            if node_ids.last() != Some(&edge.start_node) {
                return None;
            }
            node_ids.push(edge.end_node);
            distance_m += edge.distance_m;
        }

        Some(Route {
            node_ids,
            edge_ids: edge_ids.to_vec(),
            distance_m,
        })
    }

    /// Number of traversed edges.
    pub fn steps(&self) -> usize {
        self.edge_ids.len()
    }
}

/// Fully resolved generation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteParams {
    pub start: Coordinates,
    pub min_distance_m: f64,
    pub max_distance_m: f64,
    pub max_routes: usize,
    pub max_start_distance_m: f64,
    pub max_attempts: usize,
    pub max_steps: usize,
    pub time_budget_s: Option<f64>,
    pub score_tag: Option<String>,
    pub tag_bias: f64,
    pub distance_bias: f64,
    pub route_similarity_threshold: f64,
    pub workers: usize,
    pub seed: Option<u64>,
}

impl RouteParams {
    /// Parameters for a distance band around `start`, everything else from `defaults`.
    pub fn new(
        start: Coordinates,
        min_distance_m: f64,
        max_distance_m: f64,
        defaults: &RouteBuilderConfig,
    ) -> Self {
        RouteParams {
            start,
            min_distance_m,
            max_distance_m,
            max_routes: defaults.max_routes,
            max_start_distance_m: defaults.max_start_distance_m,
            max_attempts: defaults.max_attempts,
            max_steps: defaults.max_steps,
            time_budget_s: None,
            score_tag: None,
            tag_bias: defaults.tag_bias,
            distance_bias: defaults.distance_bias,
            route_similarity_threshold: defaults.route_similarity_threshold,
            workers: defaults.workers,
            seed: defaults.seed,
        }
    }

    /// Midpoint of the distance band; the walk steers toward it.
    pub fn target_distance_m(&self) -> f64 {
        (self.min_distance_m + self.max_distance_m) / 2.0
    }

    /// The tag to rank by, ignoring an empty string.
    pub fn ranking_tag(&self) -> Option<&str> {
        self.score_tag.as_deref().filter(|tag| !tag.is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_distance_m.is_nan() || self.min_distance_m <= 0.0 {
            return Err(AppError::InvalidRequest(
                "min_distance_m must be positive".to_string(),
            ));
        }
        if self.max_distance_m.is_nan() || self.max_distance_m <= 0.0 {
            return Err(AppError::InvalidRequest(
                "max_distance_m must be positive".to_string(),
            ));
        }
        if self.min_distance_m > self.max_distance_m {
            return Err(AppError::InvalidRequest(
                "min_distance_m cannot exceed max_distance_m".to_string(),
            ));
        }
        if let Some(budget) = self.time_budget_s {
            if budget.is_nan() || budget <= 0.0 {
                return Err(AppError::InvalidRequest(
                    "time_budget_s must be positive when provided".to_string(),
                ));
            }
        }
        if !(self.route_similarity_threshold > 0.0 && self.route_similarity_threshold <= 1.0) {
            return Err(AppError::InvalidRequest(
                "route_similarity_threshold must be in the range (0, 1]".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(AppError::InvalidRequest(
                "workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// Request/Response types for API endpoints

#[derive(Debug, Clone, Deserialize)]
pub struct RouteRequest {
    pub start_point: Coordinates,
    pub min_distance_m: f64,
    pub max_distance_m: f64,
    #[serde(default)]
    pub max_routes: Option<usize>,
    #[serde(default)]
    pub max_start_distance_m: Option<f64>,
    #[serde(default)]
    pub max_attempts: Option<usize>,
    #[serde(default)]
    pub max_steps: Option<usize>,
    #[serde(default)]
    pub time_budget_s: Option<f64>,
    #[serde(default)]
    pub score_tag: Option<String>,
    #[serde(default)]
    pub tag_bias: Option<f64>,
    #[serde(default)]
    pub distance_bias: Option<f64>,
    #[serde(default)]
    pub route_similarity_threshold: Option<f64>,
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Rank and filter the generated routes for this user's profile
    #[serde(default)]
    pub user_id: Option<String>,
}

impl RouteRequest {
    /// Fill unset knobs from `defaults`.
    pub fn to_params(&self, defaults: &RouteBuilderConfig) -> RouteParams {
        RouteParams {
            start: self.start_point,
            min_distance_m: self.min_distance_m,
            max_distance_m: self.max_distance_m,
            max_routes: self.max_routes.unwrap_or(defaults.max_routes),
            max_start_distance_m: self
                .max_start_distance_m
                .unwrap_or(defaults.max_start_distance_m),
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            max_steps: self.max_steps.unwrap_or(defaults.max_steps),
            time_budget_s: self.time_budget_s,
            score_tag: self.score_tag.clone(),
            tag_bias: self.tag_bias.unwrap_or(defaults.tag_bias),
            distance_bias: self.distance_bias.unwrap_or(defaults.distance_bias),
            route_similarity_threshold: self
                .route_similarity_threshold
                .unwrap_or(defaults.route_similarity_threshold),
            workers: self.workers.unwrap_or(defaults.workers),
            seed: self.seed.or(defaults.seed),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RouteFeaturesRequest {
    pub edge_ids: Vec<EdgeId>,
}

#[derive(Debug, Serialize)]
pub struct RouteFeaturesResponse {
    pub route: Route,
    pub features: RouteFeatures,
    pub scores: CompositeScores,
}
