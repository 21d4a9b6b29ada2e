use crate::models::{EdgeId, Route};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Fraction of the candidate's edges that also appear in `existing`.
///
/// Relative to the candidate's edge count only, so a short route fully
/// contained in a long one overlaps 1.0 while the reverse may not.
pub fn route_edge_overlap_ratio(candidate_edge_ids: &[EdgeId], existing: &HashSet<EdgeId>) -> f64 {
    if candidate_edge_ids.is_empty() {
        return 0.0;
    }
    let overlap = candidate_edge_ids
        .iter()
        .filter(|edge_id| existing.contains(edge_id))
        .count();
    overlap as f64 / candidate_edge_ids.len() as f64
}

/// Why a candidate did not enter the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Same edge sequence as an accepted route.
    Duplicate,
    /// Overlaps an accepted route at or above the similarity threshold.
    TooSimilar,
    /// The set is full and the score does not beat the current minimum.
    ScoreTooLow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Inserted,
    /// Took the place of the lowest-scoring entry.
    Replaced,
    Rejected(Rejection),
}

#[derive(Debug)]
struct Entry {
    score: f64,
    seq: u64,
    route: Route,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Bounded best-K route set with near-duplicate suppression.
///
/// A min-heap keyed by (score, insertion order) holds the accepted routes; a
/// side table maps each accepted edge sequence to its edge set for the
/// duplicate and overlap checks. Evicting an entry drops its side-table row.
#[derive(Debug)]
pub struct RankedRoutes {
    capacity: usize,
    similarity_threshold: f64,
    heap: BinaryHeap<Reverse<Entry>>,
    edge_sets: HashMap<Vec<EdgeId>, HashSet<EdgeId>>,
    next_seq: u64,
}

impl RankedRoutes {
    pub fn new(capacity: usize, similarity_threshold: f64) -> Self {
        Self {
            capacity,
            similarity_threshold,
            heap: BinaryHeap::with_capacity(capacity),
            edge_sets: HashMap::with_capacity(capacity),
            next_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Lowest retained score, if any.
    pub fn min_score(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(entry)| entry.score)
    }

    /// Check a candidate against the accepted routes before it is scored.
    ///
    /// Overlap is only tested below a threshold of 1.0; at 1.0 only exact
    /// repeats are rejected.
    pub fn screen(&self, edge_ids: &[EdgeId]) -> Option<Rejection> {
        if self.edge_sets.contains_key(edge_ids) {
            return Some(Rejection::Duplicate);
        }
        if self.similarity_threshold < 1.0
            && self.edge_sets.values().any(|existing| {
                route_edge_overlap_ratio(edge_ids, existing) >= self.similarity_threshold
            })
        {
            return Some(Rejection::TooSimilar);
        }
        None
    }

    /// Insert a screened route with its score.
    pub fn offer(&mut self, route: Route, score: f64) -> Admission {
        if self.capacity == 0 {
            return Admission::Rejected(Rejection::ScoreTooLow);
        }

        if self.heap.len() < self.capacity {
            self.push(route, score);
            return Admission::Inserted;
        }

        match self.min_score() {
            Some(min) if score > min => {
                if let Some(Reverse(evicted)) = self.heap.pop() {
                    self.edge_sets.remove(&evicted.route.edge_ids);
                }
                self.push(route, score);
                Admission::Replaced
            }
            _ => Admission::Rejected(Rejection::ScoreTooLow),
        }
    }

    /// Screen, then offer.
    pub fn admit(&mut self, route: Route, score: f64) -> Admission {
        match self.screen(&route.edge_ids) {
            Some(rejection) => Admission::Rejected(rejection),
            None => self.offer(route, score),
        }
    }

    fn push(&mut self, route: Route, score: f64) {
        let edge_set = route.edge_ids.iter().copied().collect();
        self.edge_sets.insert(route.edge_ids.clone(), edge_set);
        self.heap.push(Reverse(Entry {
            score,
            seq: self.next_seq,
            route,
        }));
        self.next_seq += 1;
    }

    /// Accepted routes by score descending; earlier insertions win ties.
    pub fn into_sorted(self) -> Vec<(Route, f64)> {
        let mut entries: Vec<Entry> = self.heap.into_iter().map(|Reverse(e)| e).collect();
        entries.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.seq.cmp(&b.seq)));
        entries.into_iter().map(|e| (e.route, e.score)).collect()
    }
}
