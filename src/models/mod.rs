pub mod coordinates;
pub mod features;
pub mod graph;
pub mod profile;
pub mod route;

pub use coordinates::{haversine_distance_m, Coordinates};
pub use features::{CompositeScores, RouteFeatures};
pub use graph::{Edge, EdgeId, Graph, Node, NodeId, TagMatchSet, Tags, WayId};
pub use profile::UserProfile;
pub use route::{Route, RouteFeaturesRequest, RouteFeaturesResponse, RouteParams, RouteRequest};
