use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

pub mod repository;
pub mod sqlite_repo;

pub use repository::{
    FeatureIndex, GraphProvider, InMemoryFeatureIndex, InMemoryGraphProvider,
    InMemoryUserProfileStore, UserProfileStore,
};
pub use sqlite_repo::{
    create_schema, SqliteFeatureIndex, SqliteGraphProvider, SqliteUserProfileStore,
};

/// Open (creating if missing) the SQLite database at `path`.
pub async fn create_pool(path: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(path)?.create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
}
