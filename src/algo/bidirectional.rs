use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::StepTrace;
use crate::graph::{SparseGraph, SparseGraphView};

pub struct BidirectionalResult {
    pub path: Vec<usize>,
    /// Union of the nodes settled by either frontier, in settle order,
    /// limited to the replay window.
    pub checked: Vec<usize>,
    pub distance: i64,
}

pub(crate) fn bidirectional_dijkstra(
    graph: &SparseGraph,
    from: usize,
    to: usize,
    trace: &mut StepTrace,
) -> BidirectionalResult {
    search(graph, from, to, &|_, _| 0.0, trace)
}

/// A* variant: each frontier orders its heap by distance plus the Euclidean
/// distance to that search's goal. Missing coordinates make the heuristic
/// zero, degrading to plain bidirectional Dijkstra.
pub(crate) fn bidirectional_astar(
    view: &SparseGraphView,
    from: usize,
    to: usize,
    trace: &mut StepTrace,
) -> BidirectionalResult {
    search(
        &view.graph,
        from,
        to,
        &|node, goal| view.distance(node, goal),
        trace,
    )
}

#[derive(Clone, Copy)]
struct QueueEntry {
    priority: f64,
    dist: i64,
    node: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then(self.node.cmp(&other.node))
    }
}

struct Frontier {
    goal: usize,
    dist: Vec<i64>,
    prev: Vec<usize>,
    settled: Vec<bool>,
    heap: BinaryHeap<Reverse<QueueEntry>>,
}

impl Frontier {
    fn new(n: usize, start: usize, goal: usize, heuristic: &dyn Fn(usize, usize) -> f32) -> Self {
        let mut frontier = Self {
            goal,
            dist: vec![i64::MAX; n],
            prev: vec![usize::MAX; n],
            settled: vec![false; n],
            heap: BinaryHeap::new(),
        };
        frontier.dist[start] = 0;
        frontier.heap.push(Reverse(QueueEntry {
            priority: heuristic(start, goal) as f64,
            dist: 0,
            node: start,
        }));
        frontier
    }

    fn min_dist(&self) -> Option<i64> {
        self.heap.peek().map(|Reverse(entry)| entry.dist)
    }

    /// Settles one node and relaxes its neighbors. Returns the settled node.
    fn expand(
        &mut self,
        adjacency: &[Vec<(usize, i32)>],
        heuristic: &dyn Fn(usize, usize) -> f32,
    ) -> Option<usize> {
        let node = loop {
            let Reverse(entry) = self.heap.pop()?;
            if !self.settled[entry.node] {
                break entry.node;
            }
        };
        self.settled[node] = true;

        for &(next, cost) in &adjacency[node] {
            if self.settled[next] {
                continue;
            }
            let candidate = self.dist[node] + cost as i64;
            if candidate < self.dist[next] {
                self.dist[next] = candidate;
                self.prev[next] = node;
                self.heap.push(Reverse(QueueEntry {
                    priority: candidate as f64 + heuristic(next, self.goal) as f64,
                    dist: candidate,
                    node: next,
                }));
            }
        }
        Some(node)
    }
}

/// Two alternating frontier expansions, forward from `from` and backward
/// from `to`. The best meeting node is tracked whenever a node carries a
/// finite distance from both sides; the search stops once the frontier
/// minima together can no longer beat it.
fn search(
    graph: &SparseGraph,
    from: usize,
    to: usize,
    heuristic: &dyn Fn(usize, usize) -> f32,
    trace: &mut StepTrace,
) -> BidirectionalResult {
    let n = graph.node_count();
    let adjacency = graph.adjacency();

    let mut forward = Frontier::new(n, from, to, heuristic);
    let mut backward = Frontier::new(n, to, from, heuristic);
    let mut checked = Vec::new();
    let mut best: Option<(i64, usize)> = None;

    while let (Some(min_f), Some(min_b)) = (forward.min_dist(), backward.min_dist()) {
        if let Some((best_sum, _)) = best
            && min_f + min_b >= best_sum
        {
            break;
        }

        let (this, other) = if min_f <= min_b {
            (&mut forward, &mut backward)
        } else {
            (&mut backward, &mut forward)
        };
        let Some(node) = this.expand(&adjacency, heuristic) else {
            break;
        };
        if trace.record() {
            checked.push(node);
        }

        if other.dist[node] != i64::MAX {
            let sum = this.dist[node] + other.dist[node];
            if best.is_none_or(|(best_sum, _)| sum < best_sum) {
                best = Some((sum, node));
            }
        }
    }

    let Some((distance, meet)) = best else {
        return BidirectionalResult {
            path: Vec::new(),
            checked,
            distance: 0,
        };
    };

    let path = if trace.truncated() {
        Vec::new()
    } else {
        let mut path = chain_to_start(&forward.prev, from, meet);
        path.reverse();
        path.extend(chain_to_start(&backward.prev, to, meet).into_iter().skip(1));
        path
    };
    BidirectionalResult {
        path,
        checked,
        distance,
    }
}

fn chain_to_start(prev: &[usize], start: usize, node: usize) -> Vec<usize> {
    let mut chain = vec![node];
    let mut node = node;
    while node != start {
        node = prev[node];
        chain.push(node);
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(text: &str) -> SparseGraph {
        SparseGraph::from_edge_list_text(text).expect("valid edge list")
    }

    #[test]
    fn finds_the_cheap_detour() {
        let graph = graph("0 1 1\n1 2 1\n0 2 5\n");
        let result =
            bidirectional_dijkstra(&graph, 0, 2, &mut StepTrace::unlimited());
        assert_eq!(result.path, vec![0, 1, 2]);
        assert_eq!(result.distance, 2);
    }

    #[test]
    fn agrees_with_itself_in_both_directions() {
        let graph = graph("0 1 2\n1 2 2\n2 3 2\n0 4 3\n4 3 3\n");
        let there = bidirectional_dijkstra(&graph, 0, 3, &mut StepTrace::unlimited());
        let back = bidirectional_dijkstra(&graph, 3, 0, &mut StepTrace::unlimited());

        assert_eq!(there.distance, 6);
        assert_eq!(back.distance, there.distance);
        let mut reversed = back.path.clone();
        reversed.reverse();
        assert_eq!(there.path, reversed);
    }

    #[test]
    fn unreachable_target_returns_an_empty_path() {
        let graph = graph("0 1 1\n2 3 1\n");
        let result = bidirectional_dijkstra(&graph, 0, 3, &mut StepTrace::unlimited());
        assert!(result.path.is_empty());
        assert_eq!(result.distance, 0);
    }

    #[test]
    fn astar_with_coordinates_matches_dijkstra() {
        let text = "4 4\n0 0\n100 0\n100 100\n0 100\n1 2 1\n2 3 1\n3 4 1\n1 4 5\n";
        let mut view = SparseGraphView::default();
        view.load(text, 1).expect("valid coordinate graph");

        let plain = bidirectional_dijkstra(&view.graph, 1, 3, &mut StepTrace::unlimited());
        let guided = bidirectional_astar(&view, 1, 3, &mut StepTrace::unlimited());

        assert_eq!(guided.distance, plain.distance);
        assert_eq!(guided.path, plain.path);
    }

    #[test]
    fn truncation_empties_the_path_but_keeps_checked_nodes() {
        let graph = graph("0 1 1\n1 2 1\n2 3 1\n");
        let mut trace = StepTrace::limited(1);
        let result = bidirectional_dijkstra(&graph, 0, 3, &mut trace);

        assert!(result.path.is_empty());
        assert_eq!(result.checked.len(), 1);
    }
}
