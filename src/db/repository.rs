use crate::error::Result;
use crate::models::{Edge, EdgeId, Graph, Node, TagMatchSet, UserProfile};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Source of the walkable graph snapshot.
///
/// Implementations return a complete, internally consistent snapshot;
/// referential integrity is not re-checked by the route engine.
#[async_trait]
pub trait GraphProvider: Send + Sync {
    async fn load_nodes(&self) -> Result<Vec<Node>>;

    async fn load_edges(&self) -> Result<Vec<Edge>>;

    /// Load both tables and build the adjacency index.
    async fn load_graph(&self) -> Result<Arc<Graph>> {
        let nodes = self.load_nodes().await?;
        let edges = self.load_edges().await?;
        Ok(Arc::new(Graph::new(nodes, edges)))
    }
}

/// Inverted index from feature tag to the edges carrying it.
#[async_trait]
pub trait FeatureIndex: Send + Sync {
    /// Edges carrying `tag`; empty for an unknown tag.
    async fn edges_with_tag(&self, tag: &str) -> Result<Arc<TagMatchSet>>;
}

#[async_trait]
pub trait UserProfileStore: Send + Sync {
    async fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>>;
}

// ---------------------------------------------------------------------------
// In-memory implementations
// ---------------------------------------------------------------------------

/// Serves a graph that is already in memory.
pub struct InMemoryGraphProvider {
    graph: Arc<Graph>,
}

impl InMemoryGraphProvider {
    pub fn new(graph: Graph) -> Self {
        Self {
            graph: Arc::new(graph),
        }
    }
}

#[async_trait]
impl GraphProvider for InMemoryGraphProvider {
    async fn load_nodes(&self) -> Result<Vec<Node>> {
        Ok(self.graph.nodes().to_vec())
    }

    async fn load_edges(&self) -> Result<Vec<Edge>> {
        Ok(self.graph.edges().to_vec())
    }

    async fn load_graph(&self) -> Result<Arc<Graph>> {
        Ok(Arc::clone(&self.graph))
    }
}

#[derive(Default)]
pub struct InMemoryFeatureIndex {
    index: HashMap<String, Arc<TagMatchSet>>,
}

impl InMemoryFeatureIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: &str, edge_ids: impl IntoIterator<Item = EdgeId>) -> Self {
        self.index
            .insert(tag.to_string(), Arc::new(edge_ids.into_iter().collect()));
        self
    }
}

#[async_trait]
impl FeatureIndex for InMemoryFeatureIndex {
    async fn edges_with_tag(&self, tag: &str) -> Result<Arc<TagMatchSet>> {
        Ok(self.index.get(tag).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct InMemoryUserProfileStore {
    profiles: HashMap<String, UserProfile>,
}

impl InMemoryUserProfileStore {
    pub fn new(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|p| (p.user_id.clone(), p))
                .collect(),
        }
    }
}

#[async_trait]
impl UserProfileStore for InMemoryUserProfileStore {
    async fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(self.profiles.get(user_id).cloned())
    }
}
