use super::edge_selection::{select_next_edge, SelectionBias};
use crate::models::{Graph, NodeId, Route};
use rand::Rng;

/// Result of a single random walk.
#[derive(Debug, Clone, PartialEq)]
pub enum Synthesis {
    /// The walk reached the minimum distance.
    Success(Route),
    /// No outgoing edge fit the remaining distance budget.
    DeadEnd,
    /// `max_steps` edges were taken without reaching the minimum distance.
    StepLimit,
}

impl Synthesis {
    pub fn into_route(self) -> Option<Route> {
        match self {
            Synthesis::Success(route) => Some(route),
            Synthesis::DeadEnd | Synthesis::StepLimit => None,
        }
    }
}

/// Builds one candidate route by a biased random walk from a start node.
///
/// Shares nothing mutable between attempts; the graph and tag mask are
/// read-only, so one synthesizer can serve many workers.
pub struct RouteSynthesizer<'a> {
    graph: &'a Graph,
    bias: SelectionBias<'a>,
    min_distance_m: f64,
    max_distance_m: f64,
    max_steps: usize,
}

impl<'a> RouteSynthesizer<'a> {
    pub fn new(
        graph: &'a Graph,
        bias: SelectionBias<'a>,
        min_distance_m: f64,
        max_distance_m: f64,
        max_steps: usize,
    ) -> Self {
        Self {
            graph,
            bias,
            min_distance_m,
            max_distance_m,
            max_steps,
        }
    }

    pub fn target_distance_m(&self) -> f64 {
        (self.min_distance_m + self.max_distance_m) / 2.0
    }

    /// Walk from `start_node_id` until the minimum distance is reached.
    pub fn synthesize<R: Rng + ?Sized>(&self, start_node_id: NodeId, rng: &mut R) -> Synthesis {
        let target_distance_m = self.target_distance_m();
        let mut node_ids = vec![start_node_id];
        let mut edge_ids = Vec::new();
        let mut distance_m = 0.0;
        let mut current_node_id = start_node_id;

        for _ in 0..self.max_steps {
            let Some(slot) = select_next_edge(
                self.graph.out_edges(current_node_id),
                self.graph,
                self.max_distance_m - distance_m,
                Some(target_distance_m - distance_m),
                &self.bias,
                rng,
            ) else {
                return Synthesis::DeadEnd;
            };

            let edge = self.graph.edge_at(slot);
            edge_ids.push(edge.edge_id);
            distance_m += edge.distance_m;
            current_node_id = edge.end_node;
            node_ids.push(current_node_id);

            if distance_m >= self.min_distance_m {
                return Synthesis::Success(Route {
                    node_ids,
                    edge_ids,
                    distance_m,
                });
            }
        }

        Synthesis::StepLimit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Edge, Node};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Bidirectional ring of `n` nodes with 100 m edges.
    fn ring(n: i64) -> Graph {
        let nodes = (0..n).map(|i| Node::new(i, 0.0, i as f64 * 0.0009)).collect();
        let mut edges = Vec::new();
        for i in 0..n {
            let j = (i + 1) % n;
            edges.push(Edge::new(2 * i, i, j, 100.0, 1));
            edges.push(Edge::new(2 * i + 1, j, i, 100.0, 1));
        }
        Graph::new(nodes, edges)
    }

    fn assert_contiguous(graph: &Graph, route: &Route) {
        assert_eq!(route.node_ids.len(), route.edge_ids.len() + 1);
        let mut total = 0.0;
        for (i, edge_id) in route.edge_ids.iter().enumerate() {
            let edge = graph.edge(*edge_id).unwrap();
            assert_eq!(edge.start_node, route.node_ids[i]);
            assert_eq!(edge.end_node, route.node_ids[i + 1]);
            total += edge.distance_m;
        }
        assert!((total - route.distance_m).abs() < 1e-9);
    }

    #[test]
    fn test_walk_reaches_distance_band() {
        let graph = ring(10);
        let synth = RouteSynthesizer::new(&graph, SelectionBias::default(), 450.0, 600.0, 50);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..20 {
            let route = synth.synthesize(0, &mut rng).into_route().unwrap();
            assert_contiguous(&graph, &route);
            assert_eq!(route.node_ids[0], 0);
            // 100 m steps: first total >= 450 is exactly 500
            assert_eq!(route.distance_m, 500.0);
            assert_eq!(route.steps(), 5);
        }
    }

    #[test]
    fn test_dead_end_fails() {
        let graph = Graph::new(
            vec![Node::new(1, 0.0, 0.0), Node::new(2, 0.0, 0.001)],
            vec![Edge::new(1, 1, 2, 111.0, 1)],
        );
        let synth = RouteSynthesizer::new(&graph, SelectionBias::default(), 150.0, 300.0, 10);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(synth.synthesize(1, &mut rng), Synthesis::DeadEnd);
    }

    #[test]
    fn test_edge_longer_than_budget_is_dead_end() {
        let graph = Graph::new(
            vec![Node::new(1, 0.0, 0.0), Node::new(2, 0.0, 0.01)],
            vec![Edge::new(1, 1, 2, 1_111.0, 1)],
        );
        let synth = RouteSynthesizer::new(&graph, SelectionBias::default(), 150.0, 300.0, 10);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(synth.synthesize(1, &mut rng), Synthesis::DeadEnd);
    }

    #[test]
    fn test_step_limit_fails() {
        let graph = ring(4);
        let synth = RouteSynthesizer::new(&graph, SelectionBias::default(), 1_000.0, 2_000.0, 3);
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(synth.synthesize(0, &mut rng), Synthesis::StepLimit);
    }

    #[test]
    fn test_zero_steps_never_succeeds() {
        let graph = ring(4);
        let synth = RouteSynthesizer::new(&graph, SelectionBias::default(), 50.0, 200.0, 0);
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(synth.synthesize(0, &mut rng), Synthesis::StepLimit);
    }

    #[test]
    fn test_unknown_start_node_is_dead_end() {
        let graph = ring(4);
        let synth = RouteSynthesizer::new(&graph, SelectionBias::default(), 50.0, 200.0, 5);
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(synth.synthesize(99, &mut rng), Synthesis::DeadEnd);
    }

    #[test]
    fn test_distance_never_exceeds_max() {
        let graph = ring(12);
        let synth = RouteSynthesizer::new(
            &graph,
            SelectionBias {
                tag_mask: None,
                tag_bias: 0.0,
                distance_bias: 1.0,
            },
            250.0,
            300.0,
            100,
        );
        let mut rng = StdRng::seed_from_u64(5);
        for start in 0..12 {
            if let Some(route) = synth.synthesize(start, &mut rng).into_route() {
                assert!(route.distance_m >= 250.0 && route.distance_m <= 300.0);
            }
        }
    }
}
