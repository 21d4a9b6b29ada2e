use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walkroute::cache::CachedFeatureIndex;
use walkroute::config::Config;
use walkroute::constants::DEFAULT_TAG_CACHE_MAX_ENTRIES;
use walkroute::db::{
    self, FeatureIndex, GraphProvider, InMemoryGraphProvider, SqliteFeatureIndex,
    SqliteGraphProvider, SqliteUserProfileStore, UserProfileStore,
};
use walkroute::services::route_generator::RouteGenerator;
use walkroute::AppState;

async fn open_pool(path: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = db::create_pool(path).await?;
    db::create_schema(&pool).await?;
    Ok(pool)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "walkroute=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting walkroute API server");

    // Load the graph once; requests share the in-memory snapshot
    tracing::info!(path = %config.graph_db_path, "Loading graph...");
    let graph_pool = open_pool(&config.graph_db_path).await?;
    let sqlite_graph = SqliteGraphProvider::new(graph_pool.clone());
    let nodes = sqlite_graph.load_nodes().await?;
    let edges = sqlite_graph.load_edges().await?;
    tracing::info!(nodes = nodes.len(), edges = edges.len(), "Graph loaded");
    let graph_provider: Arc<dyn GraphProvider> = Arc::new(InMemoryGraphProvider::new(
        walkroute::models::Graph::new(nodes, edges),
    ));

    let feature_pool = if config.feature_index_db_path == config.graph_db_path {
        graph_pool.clone()
    } else {
        open_pool(&config.feature_index_db_path).await?
    };
    let feature_index: Arc<dyn FeatureIndex> = Arc::new(CachedFeatureIndex::new(
        Arc::new(SqliteFeatureIndex::new(feature_pool)),
        config.tag_cache_ttl,
        DEFAULT_TAG_CACHE_MAX_ENTRIES,
    ));

    let user_pool = if config.user_db_path == config.graph_db_path {
        graph_pool
    } else {
        open_pool(&config.user_db_path).await?
    };
    let user_store: Arc<dyn UserProfileStore> = Arc::new(SqliteUserProfileStore::new(user_pool));

    // Create application state
    let state = Arc::new(AppState {
        route_generator: RouteGenerator::new(graph_provider.clone(), feature_index),
        graph_provider,
        user_store,
        defaults: config.route_builder.clone(),
    });

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", walkroute::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
