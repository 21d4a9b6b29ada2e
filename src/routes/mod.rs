pub mod debug;
pub mod features;
pub mod generate;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/routes/generate", post(generate::generate_routes))
        .route("/routes/features", post(features::route_features))
        .route("/debug/health", get(debug::health_check))
        .with_state(state)
}
