use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /debug/health - Check that the graph can be loaded
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut status = json!({
        "status": "ok",
        "checks": {}
    });

    match state.graph_provider.load_graph().await {
        Ok(graph) => {
            status["checks"]["graph"] = json!({
                "nodes": graph.node_count(),
                "edges": graph.edge_count(),
            });
            if graph.is_empty() {
                status["status"] = json!("degraded");
            }
        }
        Err(e) => {
            status["checks"]["graph"] = json!({"error": e.to_string()});
            status["status"] = json!("error");
        }
    }

    Json(status)
}
