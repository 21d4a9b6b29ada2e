use crate::error::{AppError, Result};
use crate::models::RouteRequest;
use crate::services::geojson_export::routes_to_geojson;
use crate::services::route_features::rank_routes_for_profile;
use crate::AppState;
use axum::{extract::State, Json};
use geojson::FeatureCollection;
use std::sync::Arc;

/// POST /routes/generate
/// Generate walking routes near a point as a GeoJSON feature collection
pub async fn generate_routes(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<FeatureCollection>> {
    let params = request.to_params(&state.defaults);
    params.validate()?;

    tracing::info!(
        lat = params.start.lat,
        lon = params.start.lon,
        min_distance_m = params.min_distance_m,
        max_distance_m = params.max_distance_m,
        score_tag = ?params.ranking_tag(),
        user_id = ?request.user_id,
        "Route generation request"
    );

    // Resolve the profile before generating so an unknown user fails fast
    let profile = match request.user_id.as_deref() {
        Some(user_id) => Some(
            state
                .user_store
                .load_profile(user_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", user_id)))?,
        ),
        None => None,
    };

    let (graph, batch) = state.route_generator.build_route_batch(&params).await?;
    let scores = batch.score_map();

    let Some(profile) = profile else {
        return Ok(Json(routes_to_geojson(&batch.routes, &graph, scores.as_ref())));
    };

    let ranked = rank_routes_for_profile(batch.routes, &graph, &profile);
    tracing::debug!(
        user_id = %profile.user_id,
        kept = ranked.len(),
        "Ranked routes for profile"
    );

    let routes: Vec<_> = ranked.iter().map(|(route, _, _)| route.clone()).collect();
    let mut collection = routes_to_geojson(&routes, &graph, scores.as_ref());
    for (feature, (_, features, preference_score)) in collection.features.iter_mut().zip(&ranked) {
        feature.set_property("preference_score", *preference_score);
        feature.set_property("features", serde_json::to_value(features)?);
        feature.set_property("scores", serde_json::to_value(features.composite_scores())?);
    }

    Ok(Json(collection))
}
