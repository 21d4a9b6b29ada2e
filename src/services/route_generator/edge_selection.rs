use crate::constants::{EDGE_WEIGHT_FLOOR, MIN_DISTANCE_SCALE_M};
use crate::models::Graph;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

/// Soft preferences applied when picking the next edge of a walk.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionBias<'a> {
    /// Per-slot flags marking edges that carry the requested tag
    pub tag_mask: Option<&'a [bool]>,
    pub tag_bias: f64,
    pub distance_bias: f64,
}

impl SelectionBias<'_> {
    fn is_inactive(&self, remaining_target_distance_m: Option<f64>) -> bool {
        (self.tag_mask.is_none() && remaining_target_distance_m.is_none())
            || (self.tag_bias <= 0.0 && self.distance_bias <= 0.0)
    }
}

/// Pick the next edge among `candidates` (edge slots leaving the current node).
///
/// Only edges no longer than `remaining_distance_m` are viable. Without any
/// active bias the choice is uniform; otherwise each viable edge starts at
/// weight 1.0, gains `tag_bias` when tagged and up to `distance_bias` when its
/// length is close to the remaining target, and never drops below
/// [`EDGE_WEIGHT_FLOOR`]. Returns `None` when nothing is viable.
pub fn select_next_edge<R: Rng + ?Sized>(
    candidates: &[usize],
    graph: &Graph,
    remaining_distance_m: f64,
    remaining_target_distance_m: Option<f64>,
    bias: &SelectionBias<'_>,
    rng: &mut R,
) -> Option<usize> {
    let viable: Vec<usize> = candidates
        .iter()
        .copied()
        .filter(|&slot| graph.edge_at(slot).distance_m <= remaining_distance_m)
        .collect();
    if viable.is_empty() {
        return None;
    }

    if bias.is_inactive(remaining_target_distance_m) {
        return viable.choose(rng).copied();
    }

    let weights = edge_weights(&viable, graph, remaining_target_distance_m, bias);
    match WeightedIndex::new(&weights) {
        Ok(dist) => Some(viable[dist.sample(rng)]),
        Err(e) => {
            // Only reachable with non-finite biases
            tracing::debug!(error = %e, "Invalid edge weights, choosing uniformly");
            viable.choose(rng).copied()
        }
    }
}

/// Selection weight of every viable edge, in the same order.
pub(crate) fn edge_weights(
    viable: &[usize],
    graph: &Graph,
    remaining_target_distance_m: Option<f64>,
    bias: &SelectionBias<'_>,
) -> Vec<f64> {
    let distance_scale_m = viable
        .iter()
        .map(|&slot| graph.edge_at(slot).distance_m)
        .fold(MIN_DISTANCE_SCALE_M, f64::max);

    viable
        .iter()
        .map(|&slot| {
            let mut weight = 1.0;

            if let Some(mask) = bias.tag_mask {
                if bias.tag_bias > 0.0 && mask.get(slot).copied().unwrap_or(false) {
                    weight += bias.tag_bias;
                }
            }

            if let Some(target) = remaining_target_distance_m {
                if bias.distance_bias > 0.0 {
                    let delta = (graph.edge_at(slot).distance_m - target.max(0.0)).abs();
                    let closeness = 1.0 - (delta / distance_scale_m).min(1.0);
                    weight += bias.distance_bias * closeness;
                }
            }

            f64::max(weight, EDGE_WEIGHT_FLOOR)
        })
        .collect()
}
