use crate::constants::*;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub graph_db_path: String,
    pub feature_index_db_path: String,
    pub user_db_path: String,
    pub tag_cache_ttl: u64,
    pub route_builder: RouteBuilderConfig,
}

/// Defaults applied to route generation requests that leave a knob unset.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteBuilderConfig {
    /// Number of routes returned (and the top-K capacity when ranking)
    pub max_routes: usize,

    /// How far a start node may be from the query point
    pub max_start_distance_m: f64,

    /// Upper bound on synthesis attempts per request
    pub max_attempts: usize,

    /// Max edges per synthesis attempt before giving up
    pub max_steps: usize,

    /// Weight bonus for candidate edges carrying the score tag
    pub tag_bias: f64,

    /// Weight bonus for edges whose length is close to the remaining target
    pub distance_bias: f64,

    /// Overlap ratio at or above which a candidate counts as a duplicate
    pub route_similarity_threshold: f64,

    /// Parallel synthesis workers
    pub workers: usize,

    /// Fixed RNG seed; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for RouteBuilderConfig {
    fn default() -> Self {
        Self {
            max_routes: DEFAULT_MAX_ROUTES,
            max_start_distance_m: DEFAULT_MAX_START_DISTANCE_M,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_steps: DEFAULT_MAX_STEPS,
            tag_bias: DEFAULT_TAG_BIAS,
            distance_bias: DEFAULT_DISTANCE_BIAS,
            route_similarity_threshold: DEFAULT_ROUTE_SIMILARITY_THRESHOLD,
            workers: DEFAULT_WORKERS,
            seed: None,
        }
    }
}

impl RouteBuilderConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        Ok(Self {
            max_routes: env::var("ROUTE_MAX_ROUTES")
                .unwrap_or_else(|_| defaults.max_routes.to_string())
                .parse()
                .map_err(|_| "Invalid ROUTE_MAX_ROUTES")?,

            max_start_distance_m: env::var("ROUTE_MAX_START_DISTANCE_M")
                .unwrap_or_else(|_| defaults.max_start_distance_m.to_string())
                .parse()
                .map_err(|_| "Invalid ROUTE_MAX_START_DISTANCE_M")?,

            max_attempts: env::var("ROUTE_MAX_ATTEMPTS")
                .unwrap_or_else(|_| defaults.max_attempts.to_string())
                .parse()
                .map_err(|_| "Invalid ROUTE_MAX_ATTEMPTS")?,

            max_steps: env::var("ROUTE_MAX_STEPS")
                .unwrap_or_else(|_| defaults.max_steps.to_string())
                .parse()
                .map_err(|_| "Invalid ROUTE_MAX_STEPS")?,

            tag_bias: env::var("ROUTE_TAG_BIAS")
                .unwrap_or_else(|_| defaults.tag_bias.to_string())
                .parse()
                .map_err(|_| "Invalid ROUTE_TAG_BIAS")?,

            distance_bias: env::var("ROUTE_DISTANCE_BIAS")
                .unwrap_or_else(|_| defaults.distance_bias.to_string())
                .parse()
                .map_err(|_| "Invalid ROUTE_DISTANCE_BIAS")?,

            route_similarity_threshold: env::var("ROUTE_SIMILARITY_THRESHOLD")
                .unwrap_or_else(|_| defaults.route_similarity_threshold.to_string())
                .parse()
                .map_err(|_| "Invalid ROUTE_SIMILARITY_THRESHOLD")?,

            workers: env::var("ROUTE_WORKERS")
                .unwrap_or_else(|_| defaults.workers.to_string())
                .parse()
                .map_err(|_| "Invalid ROUTE_WORKERS")?,

            seed: match env::var("ROUTE_SEED") {
                Ok(raw) => Some(raw.parse().map_err(|_| "Invalid ROUTE_SEED")?),
                Err(_) => None,
            },
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let graph_db_path = env::var("GRAPH_DB_PATH").map_err(|_| "GRAPH_DB_PATH must be set")?;

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            feature_index_db_path: env::var("FEATURE_INDEX_DB_PATH")
                .unwrap_or_else(|_| graph_db_path.clone()),
            user_db_path: env::var("USER_DB_PATH").unwrap_or_else(|_| graph_db_path.clone()),
            graph_db_path,
            tag_cache_ttl: env::var("TAG_CACHE_TTL")
                .unwrap_or_else(|_| DEFAULT_TAG_CACHE_TTL_SECONDS.to_string())
                .parse()
                .map_err(|_| "Invalid TAG_CACHE_TTL")?,
            route_builder: RouteBuilderConfig::from_env()?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
