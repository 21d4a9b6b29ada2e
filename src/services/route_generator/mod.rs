mod edge_selection;
mod generation;
mod route_scoring;
mod start_selection;
mod synthesizer;
mod top_k;

pub use edge_selection::{select_next_edge, SelectionBias};
pub use generation::{generate_routes, generate_routes_with_rng, GenerationStats, RouteBatch};
pub use route_scoring::{score_route_for_tag, score_routes_for_tag};
pub use start_selection::candidate_start_nodes;
pub use synthesizer::{RouteSynthesizer, Synthesis};
pub use top_k::{route_edge_overlap_ratio, Admission, RankedRoutes, Rejection};

use crate::db::{FeatureIndex, GraphProvider};
use crate::error::{AppError, Result};
use crate::models::{Graph, Route, RouteParams, TagMatchSet};
use std::sync::Arc;

/// Loads the graph and tag index, then runs generation off the async runtime.
pub struct RouteGenerator {
    graph_provider: Arc<dyn GraphProvider>,
    feature_index: Arc<dyn FeatureIndex>,
}

impl RouteGenerator {
    pub fn new(graph_provider: Arc<dyn GraphProvider>, feature_index: Arc<dyn FeatureIndex>) -> Self {
        RouteGenerator {
            graph_provider,
            feature_index,
        }
    }

    /// Generate routes, ranked by tag score when `params.score_tag` is set.
    pub async fn build_routes(&self, params: &RouteParams) -> Result<Vec<Route>> {
        let (_, batch) = self.build_route_batch(params).await?;
        Ok(batch.routes)
    }

    /// Like [`build_routes`](Self::build_routes) but also returns the graph the
    /// routes were built on, the tag scores and the run counters.
    pub async fn build_route_batch(&self, params: &RouteParams) -> Result<(Arc<Graph>, RouteBatch)> {
        params.validate()?;

        let graph = self.graph_provider.load_graph().await?;
        let matches = match params.ranking_tag() {
            Some(tag) => Some(self.feature_index.edges_with_tag(tag).await?),
            None => None,
        };

        let worker_graph = Arc::clone(&graph);
        let worker_params = params.clone();
        let batch = tokio::task::spawn_blocking(move || {
            generate_routes(&worker_graph, matches.as_deref(), &worker_params)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Route generation task failed: {}", e)))??;

        Ok((graph, batch))
    }

    /// Score `routes` by the share of their distance tagged with `tag`, best
    /// first. The match set is fetched from the index unless supplied.
    pub async fn score_routes_for_tag(
        &self,
        routes: Vec<Route>,
        tag: &str,
        matches: Option<Arc<TagMatchSet>>,
    ) -> Result<Vec<(Route, f64)>> {
        let matches = match matches {
            Some(matches) => matches,
            None => self.feature_index.edges_with_tag(tag).await?,
        };
        let graph = self.graph_provider.load_graph().await?;
        Ok(score_routes_for_tag(routes, &graph, &matches))
    }
}
