use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Edge, EdgeId, Node, TagMatchSet, Tags, UserProfile};

use super::repository::{FeatureIndex, GraphProvider, UserProfileStore};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(sqlx::FromRow)]
struct NodeRow {
    node_id: i64,
    lat: f64,
    lon: f64,
}

#[derive(sqlx::FromRow)]
struct EdgeRow {
    edge_id: i64,
    start_node: i64,
    end_node: i64,
    way_id: i64,
    tags: Option<String>,
    distance_m: f64,
}

impl EdgeRow {
    fn into_edge(self) -> Edge {
        let tags = match self.tags.as_deref() {
            None | Some("") => Tags::new(),
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
                tracing::warn!(
                    edge_id = self.edge_id,
                    error = %e,
                    "Malformed tags JSON, treating edge as untagged"
                );
                Tags::new()
            }),
        };

        Edge {
            edge_id: self.edge_id,
            start_node: self.start_node,
            end_node: self.end_node,
            distance_m: self.distance_m,
            way_id: self.way_id,
            tags,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: String,
    requires_wheelchair: bool,
    accessibility_weight: f64,
    urban_weight: f64,
    relaxed_weight: f64,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        UserProfile {
            user_id: row.user_id,
            requires_wheelchair: row.requires_wheelchair,
            accessibility_weight: row.accessibility_weight,
            urban_weight: row.urban_weight,
            relaxed_weight: row.relaxed_weight,
        }
    }
}

/// Create the graph, feature-index and user tables. Idempotent.
pub async fn create_schema(pool: &SqlitePool) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS nodes (
            node_id INTEGER PRIMARY KEY,
            lat REAL NOT NULL,
            lon REAL NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS edges (
            edge_id INTEGER PRIMARY KEY,
            start_node INTEGER NOT NULL,
            end_node INTEGER NOT NULL,
            way_id INTEGER NOT NULL,
            tags TEXT,
            distance_m REAL NOT NULL DEFAULT 0.0
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_edges_start_node ON edges(start_node)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS edge_features (
            feature TEXT NOT NULL,
            edge_id INTEGER NOT NULL,
            PRIMARY KEY (feature, edge_id)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            user_id TEXT PRIMARY KEY,
            requires_wheelchair INTEGER NOT NULL DEFAULT 0,
            accessibility_weight REAL NOT NULL DEFAULT 1.0,
            urban_weight REAL NOT NULL DEFAULT 1.0,
            relaxed_weight REAL NOT NULL DEFAULT 1.0
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

pub struct SqliteGraphProvider {
    pool: SqlitePool,
}

impl SqliteGraphProvider {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert (or replace) nodes and edges in one transaction.
    pub async fn insert_graph(&self, nodes: &[Node], edges: &[Edge]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for node in nodes {
            sqlx::query("INSERT OR REPLACE INTO nodes (node_id, lat, lon) VALUES (?, ?, ?)")
                .bind(node.node_id)
                .bind(node.lat)
                .bind(node.lon)
                .execute(&mut *tx)
                .await?;
        }

        for edge in edges {
            let tags = serde_json::to_string(&edge.tags)?;
            sqlx::query(
                "INSERT OR REPLACE INTO edges (edge_id, start_node, end_node, way_id, tags, distance_m)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(edge.edge_id)
            .bind(edge.start_node)
            .bind(edge.end_node)
            .bind(edge.way_id)
            .bind(tags)
            .bind(edge.distance_m)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl GraphProvider for SqliteGraphProvider {
    async fn load_nodes(&self) -> Result<Vec<Node>> {
        let rows = sqlx::query_as::<_, NodeRow>("SELECT node_id, lat, lon FROM nodes ORDER BY node_id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| Node::new(r.node_id, r.lat, r.lon))
            .collect())
    }

    async fn load_edges(&self) -> Result<Vec<Edge>> {
        let rows = sqlx::query_as::<_, EdgeRow>(
            "SELECT edge_id, start_node, end_node, way_id, tags, distance_m
             FROM edges ORDER BY edge_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(EdgeRow::into_edge).collect())
    }
}

// ---------------------------------------------------------------------------
// Feature index
// ---------------------------------------------------------------------------

pub struct SqliteFeatureIndex {
    pool: SqlitePool,
}

impl SqliteFeatureIndex {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record that every edge in `edge_ids` carries `feature`.
    pub async fn insert_feature(&self, feature: &str, edge_ids: &[EdgeId]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for edge_id in edge_ids {
            sqlx::query("INSERT OR IGNORE INTO edge_features (feature, edge_id) VALUES (?, ?)")
                .bind(feature)
                .bind(edge_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl FeatureIndex for SqliteFeatureIndex {
    async fn edges_with_tag(&self, tag: &str) -> Result<Arc<TagMatchSet>> {
        let edge_ids: Vec<i64> =
            sqlx::query_scalar("SELECT edge_id FROM edge_features WHERE feature = ?")
                .bind(tag)
                .fetch_all(&self.pool)
                .await?;

        Ok(Arc::new(edge_ids.into_iter().collect()))
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub struct SqliteUserProfileStore {
    pool: SqlitePool,
}

impl SqliteUserProfileStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, profile: &UserProfile) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO users
                (user_id, requires_wheelchair, accessibility_weight, urban_weight, relaxed_weight)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&profile.user_id)
        .bind(profile.requires_wheelchair)
        .bind(profile.accessibility_weight)
        .bind(profile.urban_weight)
        .bind(profile.relaxed_weight)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl UserProfileStore for SqliteUserProfileStore {
    async fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT user_id, requires_wheelchair, accessibility_weight, urban_weight, relaxed_weight
             FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserProfile::from))
    }
}

#[cfg(test)]
#[path = "sqlite_repo_tests.rs"]
mod sqlite_repo_tests;
