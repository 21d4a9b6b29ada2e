use crate::constants::WHEELCHAIR_MIN_ACCESSIBILITY;
use crate::models::RouteFeatures;
use serde::{Deserialize, Serialize};

/// A walker's hard constraints and soft preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,

    // hard constraints
    pub requires_wheelchair: bool,

    // preferences
    pub accessibility_weight: f64,
    pub urban_weight: f64,
    pub relaxed_weight: f64,
}

impl UserProfile {
    /// Whether a route with these features may be offered at all.
    pub fn allowed(&self, features: &RouteFeatures) -> bool {
        !(self.requires_wheelchair
            && features.accessibility_score() < WHEELCHAIR_MIN_ACCESSIBILITY)
    }

    /// Preference-weighted combination of the composite scores.
    pub fn score(&self, features: &RouteFeatures) -> f64 {
        self.accessibility_weight * features.accessibility_score()
            + self.urban_weight * features.urban_score()
            + self.relaxed_weight * features.relaxed_walk_score()
    }
}
