use super::*;
use sqlx::sqlite::SqlitePoolOptions;

async fn setup_pool() -> SqlitePool {
    // One connection: every new connection to :memory: is a fresh database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");
    create_schema(&pool).await.expect("Failed to create schema");
    pool
}

fn sample_graph() -> (Vec<Node>, Vec<Edge>) {
    (
        vec![
            Node::new(1, 0.0, 0.0),
            Node::new(2, 0.0, 0.001),
            Node::new(3, 0.0, 0.002),
        ],
        vec![
            Edge::new(1, 1, 2, 111.0, 10).with_tag("surface", "paved"),
            Edge::new(2, 2, 3, 111.0, 10)
                .with_tag("surface", "gravel")
                .with_tag("lit", "yes"),
        ],
    )
}

#[tokio::test]
async fn create_schema_idempotent() {
    let pool = setup_pool().await;
    create_schema(&pool).await.unwrap();
}

#[tokio::test]
async fn graph_round_trip() {
    let pool = setup_pool().await;
    let repo = SqliteGraphProvider::new(pool);
    let (nodes, edges) = sample_graph();
    repo.insert_graph(&nodes, &edges).await.unwrap();

    assert_eq!(repo.load_nodes().await.unwrap(), nodes);
    assert_eq!(repo.load_edges().await.unwrap(), edges);

    let graph = repo.load_graph().await.unwrap();
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.out_edge_ids(2), vec![2]);
}

#[tokio::test]
async fn insert_graph_replaces_existing_rows() {
    let pool = setup_pool().await;
    let repo = SqliteGraphProvider::new(pool);
    let (nodes, edges) = sample_graph();
    repo.insert_graph(&nodes, &edges).await.unwrap();
    repo.insert_graph(&[], &[Edge::new(1, 1, 3, 222.0, 11)])
        .await
        .unwrap();

    let loaded = repo.load_edges().await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].end_node, 3);
    assert!(loaded[0].tags.is_empty());
}

#[tokio::test]
async fn malformed_tags_load_as_empty() {
    let pool = setup_pool().await;
    sqlx::query(
        "INSERT INTO edges (edge_id, start_node, end_node, way_id, tags, distance_m)
         VALUES (7, 1, 2, 1, '{not json', 50.0)",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO edges (edge_id, start_node, end_node, way_id, tags, distance_m)
         VALUES (8, 2, 1, 1, NULL, 50.0)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let edges = SqliteGraphProvider::new(pool).load_edges().await.unwrap();
    assert_eq!(edges.len(), 2);
    assert!(edges.iter().all(|e| e.tags.is_empty()));
}

#[tokio::test]
async fn feature_index_lookup() {
    let pool = setup_pool().await;
    let index = SqliteFeatureIndex::new(pool);
    index.insert_feature("paved", &[1, 3]).await.unwrap();
    index.insert_feature("paved", &[3]).await.unwrap();
    index.insert_feature("lit", &[2]).await.unwrap();

    let paved = index.edges_with_tag("paved").await.unwrap();
    assert_eq!(paved.len(), 2);
    assert!(paved.contains(&1) && paved.contains(&3));

    assert!(index.edges_with_tag("grass").await.unwrap().is_empty());
}

#[tokio::test]
async fn user_profile_lookup() {
    let pool = setup_pool().await;
    let store = SqliteUserProfileStore::new(pool);
    let profile = UserProfile {
        user_id: "u1".to_string(),
        requires_wheelchair: true,
        accessibility_weight: 2.0,
        urban_weight: 0.5,
        relaxed_weight: 0.0,
    };
    store.upsert(&profile).await.unwrap();

    let loaded = store.load_profile("u1").await.unwrap().unwrap();
    assert!(loaded.requires_wheelchair);
    assert_eq!(loaded.accessibility_weight, 2.0);
    assert_eq!(loaded.relaxed_weight, 0.0);

    assert!(store.load_profile("missing").await.unwrap().is_none());
}
