use crate::constants::*;
use serde::{Deserialize, Serialize};

/// Distance-weighted feature ratios of one route.
///
/// Each ratio is the fraction of the route's length covered by edges that
/// satisfy the corresponding tag predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteFeatures {
    pub length_m: f64,
    pub sidewalk_ratio: f64,
    pub lit_ratio: f64,
    pub residential_ratio: f64,
    pub trail_ratio: f64,
    pub paved_ratio: f64,
    pub accessible_ratio: f64,
    pub steps_ratio: f64,
    /// Mean incline over edges with a parseable `incline` tag (0.05 = 5%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_incline: Option<f64>,
}

impl RouteFeatures {
    /// How city-friendly the walk is; roughly [-0.2, 0.9].
    pub fn urban_score(&self) -> f64 {
        URBAN_SIDEWALK_WEIGHT * self.sidewalk_ratio
            + URBAN_LIT_WEIGHT * self.lit_ratio
            + URBAN_RESIDENTIAL_WEIGHT * self.residential_ratio
            - URBAN_STEPS_PENALTY * self.steps_ratio
    }

    /// Suitability for wheelchairs and strollers, clamped at 0.
    pub fn accessibility_score(&self) -> f64 {
        let score = ACCESSIBILITY_PAVED_WEIGHT * self.paved_ratio
            + ACCESSIBILITY_SIDEWALK_WEIGHT * self.sidewalk_ratio
            + ACCESSIBILITY_LIT_WEIGHT * self.lit_ratio
            - ACCESSIBILITY_STEPS_PENALTY * self.steps_ratio;
        score.max(0.0)
    }

    pub fn relaxed_walk_score(&self) -> f64 {
        RELAXED_TRAIL_WEIGHT * self.trail_ratio
            + RELAXED_RESIDENTIAL_WEIGHT * self.residential_ratio
            - RELAXED_STEPS_PENALTY * self.steps_ratio
    }

    pub fn composite_scores(&self) -> CompositeScores {
        CompositeScores {
            urban: self.urban_score(),
            accessibility: self.accessibility_score(),
            relaxed: self.relaxed_walk_score(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompositeScores {
    pub urban: f64,
    pub accessibility: f64,
    pub relaxed: f64,
}
