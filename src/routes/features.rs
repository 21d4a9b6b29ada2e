use crate::error::{AppError, Result};
use crate::models::{Route, RouteFeaturesRequest, RouteFeaturesResponse};
use crate::services::route_features::compute_route_features;
use crate::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

/// POST /routes/features
/// Feature ratios and composite scores of a route given by its edges
pub async fn route_features(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RouteFeaturesRequest>,
) -> Result<Json<RouteFeaturesResponse>> {
    if request.edge_ids.is_empty() {
        return Err(AppError::InvalidRequest(
            "edge_ids must not be empty".to_string(),
        ));
    }

    let graph = state.graph_provider.load_graph().await?;
    if let Some(missing) = request.edge_ids.iter().find(|id| graph.edge(**id).is_none()) {
        return Err(AppError::NotFound(format!("Edge {} not found", missing)));
    }

    let route = Route::from_edges(&graph, &request.edge_ids).ok_or_else(|| {
        AppError::InvalidRequest("edge_ids do not form a connected route".to_string())
    })?;
    let features = compute_route_features(&route, &graph);

    Ok(Json(RouteFeaturesResponse {
        scores: features.composite_scores(),
        features,
        route,
    }))
}
