use super::edge_selection::SelectionBias;
use super::route_scoring::score_route_for_tag;
use super::start_selection::candidate_start_nodes;
use super::synthesizer::{RouteSynthesizer, Synthesis};
use super::top_k::{Admission, RankedRoutes, Rejection};
use crate::error::Result;
use crate::models::{EdgeId, Graph, NodeId, Route, RouteParams, TagMatchSet};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Golden-ratio increment used to derive per-worker seeds.
const WORKER_SEED_MIXING: u64 = 0x9e37_79b9_7f4a_7c15;

/// Counters for one generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub attempts: usize,
    pub successes: usize,
    pub dead_ends: usize,
    pub step_limits: usize,
    pub duplicates: usize,
    pub too_similar: usize,
    pub low_score: usize,
    pub accepted: usize,
    pub evicted: usize,
}

/// Output of a generation run.
#[derive(Debug, Clone, Default)]
pub struct RouteBatch {
    /// Ranked by tag score when a score tag was set, otherwise in acceptance order
    pub routes: Vec<Route>,
    /// Tag score of each route, parallel to `routes`; `None` when not ranking
    pub tag_scores: Option<Vec<f64>>,
    pub stats: GenerationStats,
}

impl RouteBatch {
    /// Tag scores keyed by edge sequence, for presentation.
    pub fn score_map(&self) -> Option<HashMap<Vec<EdgeId>, f64>> {
        self.tag_scores.as_ref().map(|scores| {
            self.routes
                .iter()
                .zip(scores)
                .map(|(route, score)| (route.edge_ids.clone(), *score))
                .collect()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Generate routes with `params.workers` workers.
///
/// With a seed the result is reproducible for a fixed worker count; worker
/// `i` draws from a generator seeded with `seed ^ i * MIXING`, so a single
/// worker uses `seed` itself.
pub fn generate_routes(
    graph: &Graph,
    matches: Option<&TagMatchSet>,
    params: &RouteParams,
) -> Result<RouteBatch> {
    params.validate()?;
    let workers = params.workers.max(1);

    if workers == 1 {
        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        return generate_routes_with_rng(graph, matches, params, &mut rng);
    }

    let base_seed = params.seed.unwrap_or_else(rand::random);
    Ok(run_generation(graph, matches, params, |run| {
        std::thread::scope(|scope| {
            for worker in 0..workers {
                scope.spawn(move || {
                    let mut rng = StdRng::seed_from_u64(worker_seed(base_seed, worker));
                    run.work(&mut rng);
                });
            }
        });
    }))
}

/// Generate routes sequentially, drawing all randomness from `rng`.
pub fn generate_routes_with_rng<R: Rng + ?Sized>(
    graph: &Graph,
    matches: Option<&TagMatchSet>,
    params: &RouteParams,
    rng: &mut R,
) -> Result<RouteBatch> {
    params.validate()?;
    Ok(run_generation(graph, matches, params, |run| run.work(rng)))
}

fn worker_seed(base_seed: u64, worker: usize) -> u64 {
    base_seed ^ (worker as u64).wrapping_mul(WORKER_SEED_MIXING)
}

fn run_generation<F>(
    graph: &Graph,
    matches: Option<&TagMatchSet>,
    params: &RouteParams,
    drive: F,
) -> RouteBatch
where
    F: FnOnce(&GenerationRun<'_>),
{
    let started = Instant::now();
    tracing::info!(
        lat = params.start.lat,
        lon = params.start.lon,
        min_distance_m = params.min_distance_m,
        max_distance_m = params.max_distance_m,
        max_routes = params.max_routes,
        max_attempts = params.max_attempts,
        time_budget_s = ?params.time_budget_s,
        score_tag = ?params.ranking_tag(),
        workers = params.workers,
        "Generating routes"
    );

    let candidates = candidate_start_nodes(graph, &params.start, params.max_start_distance_m);
    if candidates.is_empty() {
        tracing::warn!(
            max_start_distance_m = params.max_start_distance_m,
            "No start nodes near query point"
        );
        return RouteBatch::default();
    }

    let empty = TagMatchSet::new();
    let ranking = params.ranking_tag().map(|_| matches.unwrap_or(&empty));
    if let Some(match_set) = ranking {
        tracing::debug!(matching_edges = match_set.len(), "Ranking by tag");
    }

    let tag_mask = matches.map(|m| graph.tag_mask(m));
    let bias = SelectionBias {
        tag_mask: tag_mask.as_deref(),
        tag_bias: params.tag_bias,
        distance_bias: params.distance_bias,
    };

    let run = GenerationRun {
        graph,
        max_routes: params.max_routes,
        max_attempts: params.max_attempts,
        time_budget: params
            .time_budget_s
            .map(|s| Duration::try_from_secs_f64(s).unwrap_or(Duration::MAX)),
        started,
        candidates,
        synthesizer: RouteSynthesizer::new(
            graph,
            bias,
            params.min_distance_m,
            params.max_distance_m,
            params.max_steps,
        ),
        ranking,
        attempts: AtomicUsize::new(0),
        collector: Mutex::new(Collector::new(
            ranking.is_some(),
            params.max_routes,
            params.route_similarity_threshold,
        )),
    };

    drive(&run);
    run.finish()
}

/// Shared state of one generation run. Workers read everything but the
/// collector, which is the single serialization point.
struct GenerationRun<'a> {
    graph: &'a Graph,
    max_routes: usize,
    max_attempts: usize,
    time_budget: Option<Duration>,
    started: Instant,
    candidates: Vec<NodeId>,
    synthesizer: RouteSynthesizer<'a>,
    ranking: Option<&'a TagMatchSet>,
    attempts: AtomicUsize,
    collector: Mutex<Collector>,
}

impl GenerationRun<'_> {
    fn work<R: Rng + ?Sized>(&self, rng: &mut R) {
        loop {
            // With a time budget keep searching for better routes until it
            // runs out; without one stop once enough plain routes exist.
            match self.time_budget {
                Some(budget) if self.started.elapsed() >= budget => break,
                Some(_) => {}
                None if self.collector().plain_len() >= self.max_routes => break,
                None => {}
            }

            if self.attempts.fetch_add(1, Ordering::Relaxed) >= self.max_attempts {
                break;
            }

            let Some(&start_node_id) = self.candidates.choose(rng) else {
                break;
            };
            let outcome = self.synthesizer.synthesize(start_node_id, rng);
            self.collector().record(outcome, self.graph, self.ranking);
        }
    }

    fn collector(&self) -> MutexGuard<'_, Collector> {
        self.collector.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn finish(self) -> RouteBatch {
        let collector = self
            .collector
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let mut stats = collector.stats;
        stats.attempts = self.attempts.into_inner().min(self.max_attempts);

        let (routes, tag_scores) = match collector.accepted {
            Accepted::Plain(routes) => (routes, None),
            Accepted::Ranked(top) => {
                let (routes, scores): (Vec<Route>, Vec<f64>) = top.into_sorted().into_iter().unzip();
                (routes, Some(scores))
            }
        };

        tracing::info!(
            attempts = stats.attempts,
            successes = stats.successes,
            dead_ends = stats.dead_ends,
            step_limits = stats.step_limits,
            duplicates = stats.duplicates,
            too_similar = stats.too_similar,
            evicted = stats.evicted,
            routes = routes.len(),
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "Route generation finished"
        );

        RouteBatch {
            routes,
            tag_scores,
            stats,
        }
    }
}

enum Accepted {
    Plain(Vec<Route>),
    Ranked(RankedRoutes),
}

struct Collector {
    accepted: Accepted,
    max_routes: usize,
    stats: GenerationStats,
}

impl Collector {
    fn new(ranking: bool, max_routes: usize, similarity_threshold: f64) -> Self {
        let accepted = if ranking {
            Accepted::Ranked(RankedRoutes::new(max_routes, similarity_threshold))
        } else {
            Accepted::Plain(Vec::new())
        };
        Collector {
            accepted,
            max_routes,
            stats: GenerationStats::default(),
        }
    }

    /// Size of the plain list; always 0 when ranking.
    fn plain_len(&self) -> usize {
        match &self.accepted {
            Accepted::Plain(routes) => routes.len(),
            Accepted::Ranked(_) => 0,
        }
    }

    fn record(&mut self, outcome: Synthesis, graph: &Graph, ranking: Option<&TagMatchSet>) {
        let route = match outcome {
            Synthesis::Success(route) => route,
            Synthesis::DeadEnd => {
                self.stats.dead_ends += 1;
                return;
            }
            Synthesis::StepLimit => {
                self.stats.step_limits += 1;
                return;
            }
        };
        self.stats.successes += 1;

        match &mut self.accepted {
            Accepted::Plain(routes) => {
                // Several workers may pass the stop check together; the list
                // still never grows past max_routes.
                if routes.len() < self.max_routes {
                    routes.push(route);
                    self.stats.accepted += 1;
                }
            }
            Accepted::Ranked(top) => {
                if let Some(rejection) = top.screen(&route.edge_ids) {
                    self.count_rejection(rejection);
                    return;
                }
                let score = ranking.map_or(0.0, |m| score_route_for_tag(&route, graph, m));
                match top.offer(route, score) {
                    Admission::Inserted => self.stats.accepted += 1,
                    Admission::Replaced => {
                        self.stats.accepted += 1;
                        self.stats.evicted += 1;
                    }
                    Admission::Rejected(rejection) => self.count_rejection(rejection),
                }
            }
        }
    }

    fn count_rejection(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::Duplicate => self.stats.duplicates += 1,
            Rejection::TooSimilar => self.stats.too_similar += 1,
            Rejection::ScoreTooLow => self.stats.low_score += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteBuilderConfig;
    use crate::models::{Coordinates, Edge, Node};
    use std::collections::HashSet;

    /// Bidirectional ring of `n` nodes with 100 m edges; even edge ids run
    /// clockwise and are tagged.
    fn ring(n: i64) -> (Graph, TagMatchSet) {
        let nodes = (0..n).map(|i| Node::new(i, 0.0, i as f64 * 0.0009)).collect();
        let mut edges = Vec::new();
        for i in 0..n {
            let j = (i + 1) % n;
            edges.push(Edge::new(2 * i, i, j, 100.0, 1));
            edges.push(Edge::new(2 * i + 1, j, i, 100.0, 1));
        }
        let tagged = (0..n).map(|i| 2 * i).collect();
        (Graph::new(nodes, edges), tagged)
    }

    fn params(min: f64, max: f64) -> RouteParams {
        let mut params = RouteParams::new(
            Coordinates::new(0.0, 0.0).unwrap(),
            min,
            max,
            &RouteBuilderConfig::default(),
        );
        params.max_start_distance_m = 50_000.0;
        params
    }

    fn seeded(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn test_plain_generation_stops_at_max_routes() {
        let (graph, _) = ring(8);
        let mut p = params(300.0, 400.0);
        p.max_routes = 5;

        let batch = generate_routes_with_rng(&graph, None, &p, &mut seeded(1)).unwrap();
        assert_eq!(batch.routes.len(), 5);
        assert!(batch.tag_scores.is_none());
        assert_eq!(batch.stats.attempts, 5);
        for route in &batch.routes {
            assert!(route.distance_m >= 300.0 && route.distance_m <= 400.0);
        }
    }

    #[test]
    fn test_plain_generation_bounded_by_attempts() {
        let (graph, _) = ring(8);
        let mut p = params(300.0, 400.0);
        p.max_routes = 50;
        p.max_attempts = 7;

        let batch = generate_routes_with_rng(&graph, None, &p, &mut seeded(2)).unwrap();
        assert_eq!(batch.routes.len(), 7);
        assert_eq!(batch.stats.attempts, 7);
    }

    #[test]
    fn test_plain_generation_with_time_budget_is_truncated() {
        let (graph, _) = ring(8);
        let mut p = params(300.0, 400.0);
        p.max_routes = 3;
        p.max_attempts = 40;
        p.time_budget_s = Some(60.0);

        let batch = generate_routes_with_rng(&graph, None, &p, &mut seeded(3)).unwrap();
        assert_eq!(batch.routes.len(), 3);
        // the budget keeps the loop going after the list is full
        assert_eq!(batch.stats.attempts, 40);
    }

    #[test]
    fn test_ranked_output_is_sorted_and_unique() {
        let (graph, tagged) = ring(10);
        let mut p = params(300.0, 500.0);
        p.score_tag = Some("paved".to_string());
        p.max_routes = 10;
        p.max_attempts = 300;

        let batch = generate_routes_with_rng(&graph, Some(&tagged), &p, &mut seeded(4)).unwrap();
        let scores = batch.tag_scores.clone().unwrap();
        assert_eq!(scores.len(), batch.routes.len());
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));

        let unique: HashSet<_> = batch.routes.iter().map(|r| r.edge_ids.clone()).collect();
        assert_eq!(unique.len(), batch.routes.len());
        assert!(batch.stats.duplicates > 0);

        let score_map = batch.score_map().unwrap();
        for (route, score) in batch.routes.iter().zip(&scores) {
            assert_eq!(score_map[&route.edge_ids], *score);
        }
    }

    #[test]
    fn test_similarity_threshold_limits_overlap() {
        let (graph, tagged) = ring(10);
        let mut p = params(300.0, 500.0);
        p.score_tag = Some("paved".to_string());
        p.route_similarity_threshold = 0.5;
        p.max_attempts = 300;

        let batch = generate_routes_with_rng(&graph, Some(&tagged), &p, &mut seeded(5)).unwrap();
        assert!(!batch.routes.is_empty());
        for (i, a) in batch.routes.iter().enumerate() {
            for b in batch.routes.iter().skip(i + 1) {
                let a_set: HashSet<_> = a.edge_ids.iter().copied().collect();
                let b_set: HashSet<_> = b.edge_ids.iter().copied().collect();
                // whichever was accepted later overlaps the other below 0.5
                let ab = super::super::top_k::route_edge_overlap_ratio(&a.edge_ids, &b_set);
                let ba = super::super::top_k::route_edge_overlap_ratio(&b.edge_ids, &a_set);
                assert!(ab < 0.5 || ba < 0.5);
            }
        }
    }

    #[test]
    fn test_unknown_tag_scores_zero() {
        let (graph, _) = ring(6);
        let mut p = params(200.0, 300.0);
        p.score_tag = Some("grass".to_string());
        p.max_attempts = 50;

        let batch = generate_routes_with_rng(&graph, None, &p, &mut seeded(6)).unwrap();
        assert!(!batch.routes.is_empty());
        assert!(batch.tag_scores.unwrap().iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_no_start_candidates_is_empty() {
        let (graph, _) = ring(6);
        let mut p = params(200.0, 300.0);
        p.start = Coordinates::new(45.0, 45.0).unwrap();
        p.max_start_distance_m = 1_000.0;

        let batch = generate_routes_with_rng(&graph, None, &p, &mut seeded(7)).unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.stats.attempts, 0);
    }

    #[test]
    fn test_invalid_params_rejected_before_work() {
        let (graph, _) = ring(6);
        let mut p = params(300.0, 200.0);
        assert!(generate_routes_with_rng(&graph, None, &p, &mut seeded(8)).is_err());
        p = params(200.0, 300.0);
        p.route_similarity_threshold = 0.0;
        assert!(generate_routes(&graph, None, &p).is_err());
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let (graph, tagged) = ring(12);
        let mut p = params(300.0, 600.0);
        p.score_tag = Some("paved".to_string());
        p.max_attempts = 100;
        p.seed = Some(99);

        let a = generate_routes(&graph, Some(&tagged), &p).unwrap();
        let b = generate_routes(&graph, Some(&tagged), &p).unwrap();
        assert_eq!(a.routes, b.routes);
        assert_eq!(a.tag_scores, b.tag_scores);
    }

    #[test]
    fn test_parallel_workers_respect_budgets() {
        let (graph, tagged) = ring(12);
        let mut p = params(300.0, 600.0);
        p.score_tag = Some("paved".to_string());
        p.max_routes = 4;
        p.max_attempts = 200;
        p.workers = 4;
        p.seed = Some(3);

        let batch = generate_routes(&graph, Some(&tagged), &p).unwrap();
        assert_eq!(batch.stats.attempts, 200);
        assert!(batch.routes.len() <= 4);
        let scores = batch.tag_scores.unwrap();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));

        p.score_tag = None;
        p.max_routes = 6;
        let plain = generate_routes(&graph, None, &p).unwrap();
        assert_eq!(plain.routes.len(), 6);
    }

    #[test]
    fn test_worker_seeds_differ() {
        assert_eq!(worker_seed(42, 0), 42);
        assert_ne!(worker_seed(42, 1), worker_seed(42, 2));
    }
}
