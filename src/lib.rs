// Library exports for testing and reusability

pub mod cache;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result};

use config::RouteBuilderConfig;
use db::{GraphProvider, UserProfileStore};
use services::route_generator::RouteGenerator;
use std::sync::Arc;

// App state for sharing across the application
pub struct AppState {
    pub route_generator: RouteGenerator,
    pub graph_provider: Arc<dyn GraphProvider>,
    pub user_store: Arc<dyn UserProfileStore>,
    /// Fallbacks for knobs a request leaves unset
    pub defaults: RouteBuilderConfig,
}
